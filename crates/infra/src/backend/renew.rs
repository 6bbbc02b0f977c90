use chrono::{DateTime, Utc};
use tracing::{info, warn};

use runauth_auth::{GrantState, LeaseError, SessionGrant};
use runauth_core::{DomainError, DomainResult};

use crate::lease_store::LeaseRecord;
use crate::oracle::RunQuery;

use super::Backend;

impl Backend {
    pub async fn renew(&self, client_token: Option<&str>) -> DomainResult<SessionGrant> {
        self.renew_at(client_token, Utc::now()).await
    }

    /// Extend a grant after re-checking its run against the oracle.
    ///
    /// Only the signed `client_token` comes from the caller; the grant, its
    /// lease window and renewal data are read from the stored lease record.
    /// The run is fetched again on every call.
    pub async fn renew_at(
        &self,
        client_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<SessionGrant> {
        let token = client_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::invalid_renewal("request auth was nil"))?;

        let claims = self.signer.verify(token).map_err(|e| {
            warn!(error = %e, "renewal refused, grant token rejected");
            DomainError::invalid_renewal(e.to_string())
        })?;

        let record = self
            .leases
            .get(claims.lid)
            .await?
            .found()
            .ok_or_else(|| DomainError::invalid_renewal(format!("unknown lease {}", claims.lid)))?;
        let grant = &record.grant;

        if grant.state.is_terminal() {
            return Err(DomainError::invalid_renewal(format!(
                "grant is {}",
                grant.state
            )));
        }

        let expires_at = match grant.lease.extend(grant.issued_at, now) {
            Ok(at) => at,
            Err(LeaseError::Expired) => {
                warn!(
                    lease_id = %grant.lease_id,
                    state = %GrantState::Expired,
                    "renewal refused, max ttl reached"
                );
                self.finish(&record, GrantState::Expired).await?;
                return Err(DomainError::LeaseExpired);
            }
            Err(e) => return Err(DomainError::invalid_renewal(e.to_string())),
        };

        let data = &record.renewal;
        let config = self.read_config().await?;
        let query = RunQuery {
            owner: data.owner(),
            repository: data.repository(),
            run_id: data.run_id(),
            base_url: config.base_url.as_ref(),
        };

        if let Err(e) = self
            .verifier
            .verify(data.token(), &query, data.run_number())
            .await
        {
            // A lookup failure may be retried; an ineligible run ends the lease.
            if matches!(e, DomainError::RunNotEligible { .. }) {
                warn!(
                    lease_id = %grant.lease_id,
                    state = %GrantState::RenewalRejected,
                    error = %e,
                    "renewal refused"
                );
                self.finish(&record, GrantState::RenewalRejected).await?;
            } else {
                warn!(lease_id = %grant.lease_id, error = %e, "renewal lookup failed");
            }
            return Err(e);
        }

        let renewed = grant.renewed(expires_at, now);
        self.leases
            .put(&LeaseRecord {
                grant: renewed.clone(),
                renewal: record.renewal.clone(),
            })
            .await?;

        info!(
            lease_id = %renewed.lease_id,
            alias = %renewed.alias.name,
            expires_at = %renewed.expires_at,
            "grant renewed"
        );
        Ok(renewed)
    }

    async fn finish(&self, record: &LeaseRecord, state: GrantState) -> DomainResult<()> {
        self.leases
            .put(&LeaseRecord {
                grant: record.grant.finished(state),
                renewal: record.renewal.clone(),
            })
            .await?;
        Ok(())
    }
}
