//! Lease window arithmetic for issued grants.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Initial lease, and the increment granted by every renewal.
pub const GRANT_TTL: Duration = Duration::from_secs(30);

/// Absolute ceiling across all renewals, counted from issuance.
pub const GRANT_MAX_TTL: Duration = Duration::from_secs(60 * 60);

/// Lease options attached to a grant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseOptions {
    #[serde(with = "duration_secs")]
    pub ttl: Duration,

    #[serde(with = "duration_secs")]
    pub max_ttl: Duration,

    pub renewable: bool,
}

impl LeaseOptions {
    /// The `(30s, 60min, renewable)` window used by both login and renewal.
    pub fn standard() -> Self {
        Self {
            ttl: GRANT_TTL,
            max_ttl: GRANT_MAX_TTL,
            renewable: true,
        }
    }

    /// Expiry of a lease first issued at `issued_at`, evaluated at `now`.
    ///
    /// The result never exceeds `issued_at + max_ttl`.
    pub fn expiry(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>, LeaseError> {
        let ttl = to_chrono(self.ttl)?;
        let max_ttl = to_chrono(self.max_ttl)?;
        if ttl > max_ttl {
            return Err(LeaseError::InvalidWindow);
        }
        if now < issued_at {
            return Err(LeaseError::NotYetValid);
        }

        let ceiling = self.ceiling(issued_at)?;
        if now >= ceiling {
            return Err(LeaseError::Expired);
        }

        Ok(core::cmp::min(now + ttl, ceiling))
    }

    /// Latest instant a lease issued at `issued_at` can be valid.
    pub fn ceiling(&self, issued_at: DateTime<Utc>) -> Result<DateTime<Utc>, LeaseError> {
        Ok(issued_at + to_chrono(self.max_ttl)?)
    }

    /// Expiry after a renewal at `now`.
    pub fn extend(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>, LeaseError> {
        if !self.renewable {
            return Err(LeaseError::NotRenewable);
        }
        self.expiry(issued_at, now)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeaseError {
    #[error("lease has reached its max ttl")]
    Expired,

    #[error("lease is not renewable")]
    NotRenewable,

    #[error("lease not yet valid (issued in the future)")]
    NotYetValid,

    #[error("invalid lease window (ttl exceeds max ttl)")]
    InvalidWindow,
}

fn to_chrono(d: Duration) -> Result<chrono::Duration, LeaseError> {
    chrono::Duration::from_std(d).map_err(|_| LeaseError::InvalidWindow)
}

/// Serialize a `Duration` as whole seconds.
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
