//! Session grants handed to the host session manager.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use runauth_core::{RunId, ValueObject};

use thiserror::Error;

use crate::{GrantClaims, GrantSigner, GrantTokenError, IdentityClaim, LeaseError, LeaseOptions, Policy};

/// Lifecycle of a grant.
///
/// `Issued` and `Renewed` are live; `Expired` and `RenewalRejected` are final
/// and the caller has to log in again.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantState {
    Issued,
    Renewed,
    Expired,
    RenewalRejected,
}

impl GrantState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GrantState::Expired | GrantState::RenewalRejected)
    }
}

impl core::fmt::Display for GrantState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GrantState::Issued => write!(f, "issued"),
            GrantState::Renewed => write!(f, "renewed"),
            GrantState::Expired => write!(f, "expired"),
            GrantState::RenewalRejected => write!(f, "renewal_rejected"),
        }
    }
}

/// Data captured at login and replayed on every renewal.
///
/// Kept server-side next to the grant; never part of a response body. Never
/// contains policies; those are only computed at issuance.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalData {
    token: String,
    owner: String,
    repository: String,
    run_id: RunId,
    run_number: i64,
}

impl ValueObject for RenewalData {}

impl RenewalData {
    pub fn from_claim(claim: &IdentityClaim) -> Self {
        Self {
            token: claim.token.clone(),
            owner: claim.repository.owner().to_string(),
            repository: claim.repository.name().to_string(),
            run_id: claim.run_id,
            run_number: claim.run_number,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn run_number(&self) -> i64 {
        self.run_number
    }
}

impl core::fmt::Debug for RenewalData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenewalData")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .field("run_id", &self.run_id)
            .field("run_number", &self.run_number)
            .finish()
    }
}

/// Stable identity downstream consumers key group/alias mappings on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrantError {
    #[error(transparent)]
    Lease(#[from] LeaseError),

    #[error(transparent)]
    Token(#[from] GrantTokenError),
}

/// The credential-bearing result of a successful login.
///
/// `client_token` is the only field renewal reads back from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
    pub lease_id: Uuid,
    pub policies: Vec<Policy>,
    pub lease: LeaseOptions,
    pub alias: Alias,
    pub metadata: BTreeMap<String, String>,
    pub display_name: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub last_renewed_at: Option<DateTime<Utc>>,
    pub state: GrantState,
    pub client_token: String,
}

impl SessionGrant {
    /// Issue a fresh grant for a verified claim, with a token signed by `signer`.
    pub fn issue(
        claim: &IdentityClaim,
        policies: Vec<Policy>,
        lease: LeaseOptions,
        now: DateTime<Utc>,
        signer: &GrantSigner,
    ) -> Result<Self, GrantError> {
        let expires_at = lease.expiry(now, now)?;
        let identity = claim.repository.full_name();
        let lease_id = Uuid::now_v7();
        let client_token =
            signer.sign(&GrantClaims::new(lease_id, &identity, now, lease.ceiling(now)?))?;

        let mut metadata = BTreeMap::new();
        metadata.insert("owner".to_string(), claim.repository.owner().to_string());
        metadata.insert("repository".to_string(), claim.repository.name().to_string());

        Ok(Self {
            lease_id,
            policies,
            lease,
            alias: Alias {
                name: identity.clone(),
                metadata: metadata.clone(),
            },
            metadata,
            display_name: identity,
            issued_at: now,
            expires_at,
            last_renewed_at: None,
            state: GrantState::Issued,
            client_token,
        })
    }

    /// The same grant with its validity extended to `expires_at`.
    pub fn renewed(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            expires_at,
            last_renewed_at: Some(now),
            state: GrantState::Renewed,
            ..self.clone()
        }
    }

    /// The same grant in a final state.
    pub fn finished(&self, state: GrantState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}
