//! JWT token generation and verification.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use thiserror::Error;

use super::AuthError;
use crate::models::auth::{ClaimMap, SessionClaims};

/// The only algorithm tokens may be signed with.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token claims are malformed")]
    MalformedClaims,

    #[error("token uses an unexpected signing algorithm")]
    UnexpectedAlgorithm,
}

/// Signs and verifies HS256 session tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &SIGNING_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign arbitrary claims into a compact token.
    pub fn sign<C: Serialize>(&self, claims: &C) -> Result<String, AuthError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding)
            .map_err(|e| AuthError::Signing(format!("jwt encode: {e}")))
    }

    /// Verify a token, returning its claims unchanged.
    ///
    /// The header algorithm is checked before anything else, so `none` and
    /// asymmetric algorithms fail as `UnexpectedAlgorithm` rather than as a
    /// signature mismatch. Expiry is checked without leeway.
    pub fn verify(&self, token: &str) -> Result<ClaimMap, VerificationError> {
        check_algorithm(token)?;

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        decode::<ClaimMap>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))
    }

    /// Verify a token and read it as [`SessionClaims`].
    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, VerificationError> {
        let claims = self.verify(token)?;
        serde_json::from_value(serde_json::Value::Object(claims))
            .map_err(|_| VerificationError::MalformedClaims)
    }
}

/// Read the `alg` field of the token header.
fn check_algorithm(token: &str) -> Result<(), VerificationError> {
    let header = token.split('.').next().unwrap_or_default();
    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| VerificationError::MalformedClaims)?;
    let header: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|_| VerificationError::MalformedClaims)?;

    match header.get("alg").and_then(serde_json::Value::as_str) {
        Some("HS256") => Ok(()),
        _ => Err(VerificationError::UnexpectedAlgorithm),
    }
}

fn classify(kind: &ErrorKind) -> VerificationError {
    match kind {
        ErrorKind::InvalidSignature => VerificationError::BadSignature,
        ErrorKind::ExpiredSignature => VerificationError::Expired,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            VerificationError::UnexpectedAlgorithm
        }
        _ => VerificationError::MalformedClaims,
    }
}
