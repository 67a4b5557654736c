//! Password hashing via bcrypt.

use super::AuthError;

/// bcrypt cost factor.
pub const BCRYPT_COST: u32 = 10;

/// Salted one-way password hasher with a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Hasher using [`BCRYPT_COST`].
    pub fn new() -> Self {
        Self { cost: BCRYPT_COST }
    }

    /// Hasher with an explicit cost. Tests use the bcrypt minimum of 4.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password with a fresh salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AuthError::Hashing(format!("bcrypt hash: {e}")))
    }

    /// Verify a password against a bcrypt hash.
    ///
    /// The cost and salt are read from `hash`. Malformed or empty hashes
    /// never match.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

/// Lowest cost bcrypt accepts; keeps hashing fast in tests.
#[cfg(test)]
pub(crate) const TEST_COST: u32 = 4;

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
