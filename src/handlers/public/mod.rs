// handlers/public - endpoints reachable without a token

pub mod auth;
