//! The authentication backend context.
//!
//! One `Backend` is built at startup with its storage and oracle injected, and
//! passed to every operation. It holds no mutable state of its own.

mod login;
mod renew;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use url::Url;

use runauth_auth::{BoundCidrs, GrantSigner, Policy};
use runauth_core::{DomainError, DomainResult};

use crate::config_store::{BackendConfig, ConfigStore};
use crate::lease_store::LeaseStore;
use crate::oracle::RunOracle;
use crate::policy_store::{Lookup, PolicyEntry, PolicyKind, PolicyStore};
use crate::storage::{Storage, StorageError};
use crate::verifier::RunVerifier;

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        DomainError::storage(err.to_string())
    }
}

#[derive(Clone)]
pub struct Backend {
    policies: PolicyStore,
    config: ConfigStore,
    leases: LeaseStore,
    verifier: RunVerifier,
    signer: GrantSigner,
}

impl Backend {
    pub fn new(
        storage: Arc<dyn Storage>,
        oracle: Arc<dyn RunOracle>,
        oracle_timeout: Duration,
        signer: GrantSigner,
    ) -> Self {
        Self {
            policies: PolicyStore::new(storage.clone()),
            config: ConfigStore::new(storage.clone()),
            leases: LeaseStore::new(storage),
            verifier: RunVerifier::new(oracle, oracle_timeout),
            signer,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Policy administration
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn write_policy(
        &self,
        kind: PolicyKind,
        name: &str,
        policies: Vec<Policy>,
    ) -> DomainResult<PolicyEntry> {
        let name = validate_entry_name(kind, name)?;
        let entry = self.policies.put(kind, name, policies).await?;
        info!(%kind, name, policies = entry.policies.len(), "policy entry written");
        Ok(entry)
    }

    /// Read one entry; absent entries are `DomainError::NotFound`.
    pub async fn read_policy(&self, kind: PolicyKind, name: &str) -> DomainResult<PolicyEntry> {
        let name = validate_entry_name(kind, name)?;
        match self.policies.get(kind, name).await? {
            Lookup::Found(entry) => Ok(entry),
            Lookup::NotFound => Err(DomainError::not_found()),
        }
    }

    pub async fn delete_policy(&self, kind: PolicyKind, name: &str) -> DomainResult<()> {
        let name = validate_entry_name(kind, name)?;
        self.policies.delete(kind, name).await?;
        info!(%kind, name, "policy entry deleted");
        Ok(())
    }

    pub async fn list_policies(&self, kind: PolicyKind) -> DomainResult<Vec<String>> {
        Ok(self.policies.list(kind).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Backend configuration
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn read_config(&self) -> DomainResult<BackendConfig> {
        Ok(self.config.load().await?)
    }

    /// Replace the backend configuration.
    ///
    /// Every CIDR must parse, and `base_url` must be an absolute http(s) URL.
    pub async fn write_config(
        &self,
        bound_cidrs: &[String],
        base_url: Option<&str>,
    ) -> DomainResult<BackendConfig> {
        let bound_cidrs =
            BoundCidrs::parse(bound_cidrs).map_err(|e| DomainError::validation(e.to_string()))?;

        let base_url = match base_url.map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => {
                let url = Url::parse(raw)
                    .map_err(|e| DomainError::validation(format!("base_url '{raw}': {e}")))?;
                if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
                    return Err(DomainError::validation(format!(
                        "base_url '{raw}' must be an http(s) URL"
                    )));
                }
                Some(url)
            }
        };

        let config = BackendConfig {
            bound_cidrs,
            base_url,
        };
        self.config.save(&config).await?;
        info!(
            bound_cidrs = config.bound_cidrs.networks().len(),
            base_url = config.base_url.as_ref().map(Url::as_str),
            "backend config written"
        );
        Ok(config)
    }
}

/// Organization names are a single segment; repository names are `owner/repo`.
fn validate_entry_name(kind: PolicyKind, name: &str) -> DomainResult<&str> {
    let name = name.trim().trim_matches('/');
    if name.is_empty() {
        return Err(DomainError::validation(format!("{kind} name is required")));
    }
    let segments = name.split('/').collect::<Vec<_>>();
    let valid = match kind {
        PolicyKind::Organization => segments.len() == 1,
        PolicyKind::Repository => segments.len() == 2 && segments.iter().all(|s| !s.is_empty()),
    };
    if !valid {
        let expected = match kind {
            PolicyKind::Organization => "<organization>",
            PolicyKind::Repository => "<owner>/<repository>",
        };
        return Err(DomainError::validation(format!(
            "{kind} name '{name}' must look like {expected}"
        )));
    }
    Ok(name)
}
