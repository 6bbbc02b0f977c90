//! Signed handle a client presents to renew its grant.
//!
//! The handle names the lease and nothing else; every other grant field is
//! read back from the server-side lease record.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Shortest signing secret accepted (HS256 key length).
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// Claims carried by a grant token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantClaims {
    /// Lease id.
    pub lid: Uuid,
    /// Alias of the authenticated repository (`owner/repo`).
    pub sub: String,
    pub iat: i64,
    /// Absolute ceiling of the lease (issued_at + max_ttl).
    pub exp: i64,
}

impl GrantClaims {
    pub fn new(lease_id: Uuid, alias: &str, issued_at: DateTime<Utc>, ceiling: DateTime<Utc>) -> Self {
        Self {
            lid: lease_id,
            sub: alias.to_string(),
            iat: issued_at.timestamp(),
            exp: ceiling.timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrantTokenError {
    #[error("signing key must be at least {MIN_SIGNING_KEY_LEN} bytes")]
    WeakKey,

    #[error("failed to sign grant token: {0}")]
    Signing(String),

    #[error("grant token rejected: {0}")]
    Invalid(String),
}

/// HS256 signer/verifier for grant tokens.
#[derive(Clone)]
pub struct GrantSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl GrantSigner {
    pub fn new(secret: &[u8]) -> Result<Self, GrantTokenError> {
        if secret.len() < MIN_SIGNING_KEY_LEN {
            return Err(GrantTokenError::WeakKey);
        }

        // Lease expiry is enforced against the stored record with the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }

    pub fn sign(&self, claims: &GrantClaims) -> Result<String, GrantTokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| GrantTokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<GrantClaims, GrantTokenError> {
        jsonwebtoken::decode::<GrantClaims>(token.trim(), &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| GrantTokenError::Invalid(e.to_string()))
    }
}

impl core::fmt::Debug for GrantSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GrantSigner").field("key", &"<redacted>").finish()
    }
}
