//! GitHub / GitHub Enterprise Actions API backend.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use super::{OracleError, RunOracle, RunQuery, RunStatus};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Subset of the `GET /repos/{owner}/{repo}/actions/runs/{run_id}` body we read.
#[derive(Debug, Deserialize)]
struct WorkflowRunBody {
    status: Option<String>,
    run_number: i64,
}

pub struct GitHubRunOracle {
    http: reqwest::Client,
    api_url: Url,
}

impl GitHubRunOracle {
    pub fn new(api_url: Url) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("runauth/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(Self::with_client(http, api_url))
    }

    pub fn with_client(http: reqwest::Client, api_url: Url) -> Self {
        Self { http, api_url }
    }

    fn run_url(&self, query: &RunQuery<'_>) -> Result<Url, OracleError> {
        let mut url = query.base_url.unwrap_or(&self.api_url).clone();
        if url.cannot_be_a_base() {
            return Err(OracleError::InvalidBaseUrl(url.to_string()));
        }
        let run_id = query.run_id.to_string();
        url.path_segments_mut()
            .map_err(|_| OracleError::InvalidBaseUrl("url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "repos",
                query.owner,
                query.repository,
                "actions",
                "runs",
                run_id.as_str(),
            ]);
        Ok(url)
    }
}

#[async_trait]
impl RunOracle for GitHubRunOracle {
    async fn get_workflow_run(
        &self,
        query: &RunQuery<'_>,
        credential: &str,
    ) -> Result<RunStatus, OracleError> {
        let url = self.run_url(query)?;

        let resp = self
            .http
            .get(url)
            .bearer_auth(credential)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error"))
                .to_string();
            warn!(
                owner = query.owner,
                repository = query.repository,
                run_id = %query.run_id,
                %status,
                "workflow run lookup returned non-success"
            );
            return Err(OracleError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: WorkflowRunBody = resp
            .json()
            .await
            .map_err(|e| OracleError::Decode(e.to_string()))?;

        let status = body
            .status
            .ok_or_else(|| OracleError::Decode("workflow run has no status".to_string()))?;

        Ok(RunStatus {
            status,
            run_number: body.run_number,
        })
    }
}
