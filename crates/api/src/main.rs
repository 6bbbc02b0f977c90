use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use runauth_api::config::ServerConfig;
use runauth_api::middleware::AdminAuth;
use runauth_auth::GrantSigner;
use runauth_infra::{Backend, GitHubRunOracle, InMemoryStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    runauth_observability::init(config.log_format);

    let oracle = GitHubRunOracle::new(config.github_api_url.clone())
        .context("failed to build GitHub client")?;
    let signer = GrantSigner::new(config.grant_signing_key.as_bytes())
        .context("invalid grant signing key")?;

    tracing::warn!("using in-memory storage; policy, config and lease entries are lost on restart");
    let storage = Arc::new(InMemoryStorage::new());

    let backend = Arc::new(Backend::new(
        storage,
        Arc::new(oracle),
        config.oracle_timeout,
        signer,
    ));
    let app = runauth_api::app::build_app(backend, AdminAuth::new(config.admin_token.clone()));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!(
        github_api_url = %config.github_api_url,
        oracle_timeout = ?config.oracle_timeout,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
