//! Strongly-typed identifiers for workflow runs and repositories.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Identifier of a single workflow run (GitHub's numeric run id).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(i64);

impl RunId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for RunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for RunId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<RunId> for i64 {
    fn from(value: RunId) -> Self {
        value.0
    }
}

impl FromStr for RunId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::validation(format!("run_id '{s}': {e}")))?;
        Ok(Self(id))
    }
}

/// An `owner/name` repository reference with the bare repository name.
///
/// `name` never carries the owner prefix; the oracle is queried with the bare
/// name and policies are stored under `repository/<owner>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Build a reference from a caller-supplied repository that may be given
    /// either bare (`widgets`) or qualified (`acme/widgets`).
    pub fn normalize(owner: &str, repository: &str) -> Result<Self, DomainError> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(DomainError::validation("owner is required"));
        }
        if owner.contains('/') {
            return Err(DomainError::validation("owner must not contain '/'"));
        }

        let repository = repository.trim();
        let name = repository
            .strip_prefix(owner)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(repository);

        if name.is_empty() {
            return Err(DomainError::validation("repository is required"));
        }
        if name.contains('/') {
            return Err(DomainError::validation(format!(
                "repository '{repository}' does not belong to owner '{owner}'"
            )));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `owner/name`, used as the alias and as the repository policy key.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl ValueObject for RepositoryRef {}

impl core::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
