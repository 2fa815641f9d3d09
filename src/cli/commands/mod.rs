pub mod db;
pub mod keys;
pub mod tokens;
