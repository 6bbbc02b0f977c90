use std::net::IpAddr;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use runauth_auth::{IdentityClaim, LeaseOptions, Policy, RenewalData, SessionGrant, merge_policies};
use runauth_core::{DomainError, DomainResult};

use crate::lease_store::LeaseRecord;
use crate::oracle::RunQuery;
use crate::policy_store::{Lookup, PolicyKind};

use super::Backend;

impl Backend {
    pub async fn login(
        &self,
        claim: DomainResult<IdentityClaim>,
        origin: Option<IpAddr>,
    ) -> DomainResult<SessionGrant> {
        self.login_at(claim, origin, Utc::now()).await
    }

    /// Authenticate a CI job and issue a grant.
    ///
    /// `claim` is the caller's parsed input. A parse failure is only reported
    /// once the origin check has passed, and a refused origin never reaches
    /// the oracle.
    pub async fn login_at(
        &self,
        claim: DomainResult<IdentityClaim>,
        origin: Option<IpAddr>,
        now: DateTime<Utc>,
    ) -> DomainResult<SessionGrant> {
        let config = self.read_config().await?;

        if !config.bound_cidrs.permits(origin) {
            match origin {
                None => warn!(
                    "token bound CIDRs found but no connection information available for validation"
                ),
                Some(addr) => warn!(origin = %addr, "login origin outside bound CIDRs"),
            }
            return Err(DomainError::permission_denied("origin not permitted"));
        }

        let claim = claim?;

        let query = RunQuery {
            owner: claim.repository.owner(),
            repository: claim.repository.name(),
            run_id: claim.run_id,
            base_url: config.base_url.as_ref(),
        };
        self.verifier
            .verify(&claim.token, &query, claim.run_number)
            .await?;

        let organization = self
            .resolve_policies(PolicyKind::Organization, claim.repository.owner())
            .await?;
        let repository = self
            .resolve_policies(PolicyKind::Repository, &claim.repository.full_name())
            .await?;
        let policies = merge_policies(&organization, &repository);

        let grant = SessionGrant::issue(&claim, policies, LeaseOptions::standard(), now, &self.signer)
            .map_err(|e| DomainError::internal(format!("failed to issue grant: {e}")))?;
        self.leases
            .put(&LeaseRecord {
                grant: grant.clone(),
                renewal: RenewalData::from_claim(&claim),
            })
            .await?;

        info!(
            alias = %grant.alias.name,
            run_id = %claim.run_id,
            lease_id = %grant.lease_id,
            policies = ?grant.policies.iter().map(Policy::as_str).collect::<Vec<_>>(),
            "login succeeded"
        );
        Ok(grant)
    }

    /// Policies of one entry; an absent entry contributes nothing.
    async fn resolve_policies(&self, kind: PolicyKind, name: &str) -> DomainResult<Vec<Policy>> {
        match self.policies.get(kind, name).await {
            Ok(Lookup::Found(entry)) => Ok(entry.policies),
            Ok(Lookup::NotFound) => {
                debug!(%kind, name, "unable to find policy entry, does not currently exist");
                Ok(Vec::new())
            }
            Err(e) => {
                warn!(%kind, name, error = %e, "unable to retrieve policy entry");
                Err(e.into())
            }
        }
    }
}
