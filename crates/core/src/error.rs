//! Error taxonomy shared by the login and renewal protocols.

use thiserror::Error;

/// Result type used across the authentication layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// Coarse classification of a [`DomainError`].
///
/// Callers (HTTP mapping, logging) branch on this rather than on individual
/// variants. None of these are retried inside the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input. Surfaced verbatim.
    ClientInput,
    /// Authorization failure (origin not allowed, run not eligible, lease over).
    PermissionDenied,
    /// The run-status oracle could not answer. The whole request may be retried.
    Transient,
    /// Storage I/O or decode failure.
    Internal,
    /// The renewal request itself is unusable and must never be replayed.
    Fatal,
}

/// Authentication-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-numeric run id, empty owner).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The caller is not allowed to authenticate from here.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The oracle answered, but the run is neither in progress nor the expected run.
    #[error("run is {status}, expected 'in_progress'")]
    RunNotEligible { status: String },

    /// The oracle could not be reached or returned an error.
    #[error("workflow run lookup failed: {0}")]
    RunLookupFailed(String),

    /// Storage failure (I/O or malformed stored data).
    #[error("storage error: {0}")]
    Storage(String),

    /// Renewal was requested without a usable grant.
    #[error("invalid renewal request: {0}")]
    InvalidRenewalRequest(String),

    /// The grant has reached its maximum lifetime.
    #[error("lease expired")]
    LeaseExpired,

    /// A failure inside the backend that is neither storage nor input.
    #[error("internal error: {0}")]
    Internal(String),

    /// A requested entry does not exist.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn run_lookup_failed(msg: impl Into<String>) -> Self {
        Self::RunLookupFailed(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn invalid_renewal(msg: impl Into<String>) -> Self {
        Self::InvalidRenewalRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) | DomainError::NotFound => ErrorKind::ClientInput,
            DomainError::PermissionDenied(_)
            | DomainError::RunNotEligible { .. }
            | DomainError::LeaseExpired => ErrorKind::PermissionDenied,
            DomainError::RunLookupFailed(_) => ErrorKind::Transient,
            DomainError::Storage(_) | DomainError::Internal(_) => ErrorKind::Internal,
            DomainError::InvalidRenewalRequest(_) => ErrorKind::Fatal,
        }
    }
}
