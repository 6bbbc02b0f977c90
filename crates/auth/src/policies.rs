use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Policy identifier.
///
/// Policies are opaque, non-empty labels (e.g. "ci-deploy"). Their meaning is
/// owned by the host that consumes the grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Policy(Cow<'static, str>);

impl Policy {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Policy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a comma-separated policy list (`"deploy, read-only"`).
pub fn parse_policies(raw: &str) -> Vec<Policy> {
    normalize_policies(raw.split(','))
}

/// Trim and lowercase names, drop empties, and remove repeats while keeping
/// first-seen order. `Deploy` and `deploy` are the same policy.
pub fn normalize_policies<I, S>(names: I) -> Vec<Policy>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref().trim().to_lowercase();
            if name.is_empty() || !seen.insert(name.clone()) {
                None
            } else {
                Some(Policy::new(name))
            }
        })
        .collect()
}

/// Organization policies followed by repository policies.
///
/// A policy granted at both levels appears once, at its organization position.
pub fn merge_policies(organization: &[Policy], repository: &[Policy]) -> Vec<Policy> {
    normalize_policies(
        organization
            .iter()
            .chain(repository.iter())
            .map(Policy::as_str),
    )
}
