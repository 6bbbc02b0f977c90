use serde::{Deserialize, Serialize};

use runauth_auth::{IdentityClaim, Policy, SessionGrant, normalize_policies, parse_policies};
use runauth_core::DomainResult;

// -------------------------
// Request DTOs
// -------------------------

/// A list field accepted either as a comma-separated string or a JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    Csv(String),
    Items(Vec<String>),
}

impl StringList {
    pub fn into_items(self) -> Vec<String> {
        match self {
            StringList::Csv(raw) => raw.split(',').map(str::to_string).collect(),
            StringList::Items(items) => items,
        }
    }

    pub fn into_policies(self) -> Vec<Policy> {
        match self {
            StringList::Csv(raw) => parse_policies(&raw),
            StringList::Items(items) => normalize_policies(items),
        }
    }
}

/// Login fields as submitted by the CI job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repository: String,
    /// Decimal string; GitHub run ids overflow some JSON number parsers.
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub run_number: i64,
}

impl LoginRequest {
    pub fn claim(&self) -> DomainResult<IdentityClaim> {
        IdentityClaim::parse(
            &self.token,
            &self.owner,
            &self.repository,
            &self.run_id,
            self.run_number,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct WritePolicyRequest {
    #[serde(default)]
    pub policies: Option<StringList>,
}

impl WritePolicyRequest {
    pub fn into_policies(self) -> Vec<Policy> {
        self.policies.map(StringList::into_policies).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct WriteConfigRequest {
    #[serde(default)]
    pub bound_cidrs: Option<StringList>,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Body of `POST /renew`: the grant previously returned by `/login` or `/renew`.
///
/// Only `client_token` is read; other grant fields are ignored.
#[derive(Debug, Deserialize)]
pub struct RenewRequest {
    #[serde(default)]
    pub auth: Option<RenewAuth>,
}

#[derive(Debug, Deserialize)]
pub struct RenewAuth {
    #[serde(default)]
    pub client_token: String,
}

impl RenewRequest {
    pub fn client_token(&self) -> Option<&str> {
        self.auth.as_ref().map(|auth| auth.client_token.as_str())
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub auth: SessionGrant,
}

#[derive(Debug, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}
