//! Run verification: is the claimed workflow run live (or the expected run)?

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use runauth_core::{DomainError, DomainResult};

use crate::oracle::{OracleError, RunOracle, RunQuery, RunStatus};

/// Status the oracle reports for a run that is currently executing.
pub const RUN_IN_PROGRESS: &str = "in_progress";

/// Default bound on a single oracle round trip.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Acceptance rule shared by login and renewal.
///
/// Inclusive OR: a run that has left `in_progress` is still accepted when its
/// run number equals the expected one.
pub fn is_run_eligible(run: &RunStatus, expected_run_number: i64) -> bool {
    run.status == RUN_IN_PROGRESS || run.run_number == expected_run_number
}

#[derive(Clone)]
pub struct RunVerifier {
    oracle: Arc<dyn RunOracle>,
    timeout: Duration,
}

impl RunVerifier {
    pub fn new(oracle: Arc<dyn RunOracle>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    /// Fetch the run live and apply [`is_run_eligible`].
    ///
    /// Lookup failures (including a timeout) are `RunLookupFailed`; an
    /// ineligible run is `RunNotEligible`.
    pub async fn verify(
        &self,
        credential: &str,
        query: &RunQuery<'_>,
        expected_run_number: i64,
    ) -> DomainResult<RunStatus> {
        let lookup = self.oracle.get_workflow_run(query, credential);
        let run = match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(run)) => run,
            Ok(Err(e)) => {
                warn!(
                    owner = query.owner,
                    repository = query.repository,
                    run_id = %query.run_id,
                    error = %e,
                    "workflow run lookup failed"
                );
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    owner = query.owner,
                    repository = query.repository,
                    run_id = %query.run_id,
                    timeout = ?self.timeout,
                    "workflow run lookup timed out"
                );
                return Err(OracleError::Timeout(self.timeout).into());
            }
        };

        if !is_run_eligible(&run, expected_run_number) {
            warn!(
                owner = query.owner,
                repository = query.repository,
                run_id = %query.run_id,
                status = %run.status,
                observed_run_number = run.run_number,
                expected_run_number,
                "workflow run not eligible"
            );
            return Err(DomainError::RunNotEligible { status: run.status });
        }

        debug!(run_id = %query.run_id, status = %run.status, "workflow run verified");
        Ok(run)
    }
}
