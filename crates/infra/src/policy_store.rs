//! Organization and repository policy entries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use runauth_auth::Policy;

use crate::storage::{Storage, StorageError, get_json, put_json};

/// Which identity level a policy entry is attached to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Organization,
    Repository,
}

impl PolicyKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            PolicyKind::Organization => "organization/",
            PolicyKind::Repository => "repository/",
        }
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix(), name)
    }
}

impl core::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PolicyKind::Organization => write!(f, "organization"),
            PolicyKind::Repository => write!(f, "repository"),
        }
    }
}

/// Policies attached to one organization or repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub policies: Vec<Policy>,
}

/// Outcome of a lookup that reached storage.
///
/// Storage failures are reported separately through `Err`, so callers can
/// tell "absent" from "failed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
        }
    }
}

/// CRUD over policy entries.
#[derive(Clone)]
pub struct PolicyStore {
    storage: Arc<dyn Storage>,
}

impl PolicyStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn get(&self, kind: PolicyKind, name: &str) -> Result<Lookup<PolicyEntry>, StorageError> {
        let entry = get_json::<PolicyEntry, _>(&*self.storage, &kind.key(name)).await?;
        Ok(match entry {
            Some(entry) => Lookup::Found(entry),
            None => Lookup::NotFound,
        })
    }

    /// Replace the policy set for `name` (no merge with the previous value).
    pub async fn put(
        &self,
        kind: PolicyKind,
        name: &str,
        policies: Vec<Policy>,
    ) -> Result<PolicyEntry, StorageError> {
        let entry = PolicyEntry { policies };
        put_json(&*self.storage, &kind.key(name), &entry).await?;
        Ok(entry)
    }

    pub async fn delete(&self, kind: PolicyKind, name: &str) -> Result<(), StorageError> {
        self.storage.delete(&kind.key(name)).await
    }

    pub async fn list(&self, kind: PolicyKind) -> Result<Vec<String>, StorageError> {
        self.storage.list(kind.prefix()).await
    }
}
