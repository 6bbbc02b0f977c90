use runauth_core::{DomainError, DomainResult, RepositoryRef, RunId};

/// Identity asserted by a CI job at login (transport-agnostic).
///
/// Built from raw request fields by [`IdentityClaim::parse`]; once built, the
/// repository is normalized and the run id is numeric.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    /// Ephemeral bearer credential issued to the job.
    pub token: String,

    /// Owner plus bare repository name.
    pub repository: RepositoryRef,

    /// Workflow run the job claims to belong to.
    pub run_id: RunId,

    /// Run number the job expects the oracle to report.
    pub run_number: i64,
}

impl IdentityClaim {
    pub fn parse(
        token: &str,
        owner: &str,
        repository: &str,
        run_id: &str,
        run_number: i64,
    ) -> DomainResult<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::validation("token is required"));
        }
        if run_id.trim().is_empty() {
            return Err(DomainError::validation("run_id is required"));
        }

        let repository = RepositoryRef::normalize(owner, repository)?;
        let run_id = run_id.parse::<RunId>()?;

        Ok(Self {
            token: token.to_string(),
            repository,
            run_id,
            run_number,
        })
    }
}

impl core::fmt::Debug for IdentityClaim {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdentityClaim")
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .field("run_id", &self.run_id)
            .field("run_number", &self.run_number)
            .finish()
    }
}
