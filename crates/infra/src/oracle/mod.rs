//! Workflow-run status oracle.
//!
//! The oracle is the only source of truth for whether a CI run is live. It is
//! queried on every login and every renewal; results are never cached.

pub mod github;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use runauth_core::{DomainError, RunId};

pub use github::GitHubRunOracle;

/// Live state of a workflow run as reported by the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatus {
    pub status: String,
    pub run_number: i64,
}

/// Which run to fetch, and where.
#[derive(Debug, Clone, Copy)]
pub struct RunQuery<'a> {
    pub owner: &'a str,
    pub repository: &'a str,
    pub run_id: RunId,
    /// Overrides the oracle's default API base when set.
    pub base_url: Option<&'a Url>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("oracle returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed oracle response: {0}")]
    Decode(String),

    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(String),

    #[error("no answer within {0:?}")]
    Timeout(Duration),
}

impl From<OracleError> for DomainError {
    fn from(err: OracleError) -> Self {
        DomainError::run_lookup_failed(err.to_string())
    }
}

/// Contract for fetching a run with the caller's own credential.
#[async_trait]
pub trait RunOracle: Send + Sync {
    async fn get_workflow_run(
        &self,
        query: &RunQuery<'_>,
        credential: &str,
    ) -> Result<RunStatus, OracleError>;
}
