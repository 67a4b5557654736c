//! Domain models shared by the core services and the HTTP layer.

pub mod account;
pub mod auth;
