//! Password strength policy.
//!
//! Checks run in a fixed order and stop at the first failure:
//! denylist, then length, then character complexity.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;
use unicode_properties::{GeneralCategory, GeneralCategoryGroup, UnicodeGeneralCategory};

/// Shortest accepted password, in bytes.
pub const MIN_PASSWORD_LENGTH: usize = 13;

/// Code reported with every policy violation.
const POLICY_ERROR_CODE: u16 = 400;

/// Why a candidate password was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error(
        "The password belongs to the list of most common passwords, thus it is not sufficiently secure. [Error code: 400]"
    )]
    CommonPassword,

    #[error("The password must be at least 13 characters long. [Error code: 400]")]
    InsufficientLength,

    #[error(
        "The password must contain an uppercase letter, a lowercase letter, a number and a special character. [Error code: 400]"
    )]
    InsufficientComplexity,
}

impl PolicyViolation {
    pub fn code(self) -> u16 {
        POLICY_ERROR_CODE
    }
}

/// Failure to load the common-password denylist.
#[derive(Debug, Error)]
#[error("failed to read common passwords file {}: {source}", path.display())]
pub struct DenylistError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Password policy backed by a denylist of known-weak passwords.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct PasswordPolicy {
    common_passwords: HashSet<String>,
}

impl PasswordPolicy {
    /// Load the denylist from a newline-delimited file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DenylistError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| DenylistError {
            path: path.to_path_buf(),
            source,
        })?;
        let policy = Self::from_passwords(contents.lines());
        info!(
            path = %path.display(),
            entries = policy.denylist_len(),
            "loaded common passwords"
        );
        Ok(policy)
    }

    /// Build a policy from an in-memory denylist.
    pub fn from_passwords<I, S>(passwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            common_passwords: passwords.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of denylisted passwords.
    pub fn denylist_len(&self) -> usize {
        self.common_passwords.len()
    }

    /// Validate a candidate password.
    pub fn validate(&self, candidate: &str) -> Result<(), PolicyViolation> {
        if self.is_common(candidate) {
            return Err(PolicyViolation::CommonPassword);
        }
        if !meets_length(candidate) {
            return Err(PolicyViolation::InsufficientLength);
        }
        if !meets_complexity(candidate) {
            return Err(PolicyViolation::InsufficientComplexity);
        }
        Ok(())
    }

    fn is_common(&self, candidate: &str) -> bool {
        self.common_passwords.contains(candidate)
    }
}

fn meets_length(candidate: &str) -> bool {
    candidate.len() >= MIN_PASSWORD_LENGTH
}

fn meets_complexity(candidate: &str) -> bool {
    let (mut upper, mut lower, mut digit, mut special) = (false, false, false, false);
    for c in candidate.chars() {
        match (c.general_category(), c.general_category_group()) {
            (GeneralCategory::UppercaseLetter, _) => upper = true,
            (GeneralCategory::LowercaseLetter, _) => lower = true,
            (_, GeneralCategoryGroup::Number) => digit = true,
            (_, GeneralCategoryGroup::Punctuation | GeneralCategoryGroup::Symbol) => {
                special = true;
            }
            _ => {}
        }
    }
    upper && lower && digit && special
}
