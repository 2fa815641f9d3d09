pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use app::{router, AppState};
