//! # warden_core
//!
//! Core identity and session logic for Warden: password policy, hashing,
//! token signing, login, account lifecycle and the collaborator traits
//! (account store, event bus) they run against.

pub mod accounts;
pub mod auth;
pub mod bus;
pub mod health;
pub mod migrate;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
