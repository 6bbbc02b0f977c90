//! Process configuration read from the environment at startup.
//!
//! Backend configuration (bound CIDRs, oracle base URL) is not here; it lives
//! in storage and is managed through `/config`.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use url::Url;

use runauth_auth::MIN_SIGNING_KEY_LEN;
use runauth_infra::DEFAULT_ORACLE_TIMEOUT;
use runauth_observability::LogFormat;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8200";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub github_api_url: Url,
    pub oracle_timeout: Duration,
    pub log_format: LogFormat,
    /// Bearer token for `/config`, `/organizations` and `/repositories`.
    pub admin_token: String,
    /// HS256 secret for grant tokens.
    pub grant_signing_key: String,
}

impl core::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("listen_addr", &self.listen_addr)
            .field("github_api_url", &self.github_api_url)
            .field("oracle_timeout", &self.oracle_timeout)
            .field("log_format", &self.log_format)
            .field("admin_token", &"<redacted>")
            .field("grant_signing_key", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the process environment in prod).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr = var("RUNAUTH_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("RUNAUTH_LISTEN_ADDR must be host:port")?;

        let github_api_url = Url::parse(
            &var("RUNAUTH_GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
        )
        .context("RUNAUTH_GITHUB_API_URL must be a URL")?;

        let oracle_timeout = match var("RUNAUTH_ORACLE_TIMEOUT_SECS") {
            None => DEFAULT_ORACLE_TIMEOUT,
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .context("RUNAUTH_ORACLE_TIMEOUT_SECS must be a whole number")?;
                if secs == 0 {
                    return Err(anyhow!("RUNAUTH_ORACLE_TIMEOUT_SECS must be positive"));
                }
                Duration::from_secs(secs)
            }
        };

        let log_format = match var("RUNAUTH_LOG_FORMAT") {
            None => LogFormat::default(),
            Some(raw) => LogFormat::parse(&raw)
                .ok_or_else(|| anyhow!("RUNAUTH_LOG_FORMAT must be 'json' or 'pretty', got '{raw}'"))?,
        };

        let admin_token = var("RUNAUTH_ADMIN_TOKEN")
            .map(|t| t.trim().to_string())
            .ok_or_else(|| anyhow!("RUNAUTH_ADMIN_TOKEN must be set"))?;

        let grant_signing_key = var("RUNAUTH_GRANT_SIGNING_KEY")
            .ok_or_else(|| anyhow!("RUNAUTH_GRANT_SIGNING_KEY must be set"))?;
        if grant_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(anyhow!(
                "RUNAUTH_GRANT_SIGNING_KEY must be at least {MIN_SIGNING_KEY_LEN} bytes"
            ));
        }

        Ok(Self {
            listen_addr,
            github_api_url,
            oracle_timeout,
            log_format,
            admin_token,
            grant_signing_key,
        })
    }
}
