use axum::{Router, routing::{get, post}};

pub mod config;
pub mod login;
pub mod organizations;
pub mod policies;
pub mod repositories;
pub mod system;

/// Router for the login/renew protocol (no admin credential).
pub fn router() -> Router {
    Router::new()
        .route("/login", post(login::login))
        .route("/renew", post(login::renew))
}

/// Router for configuration and policy administration.
pub fn admin_router() -> Router {
    Router::new()
        .route("/config", get(config::read_config).post(config::write_config))
        .nest("/organizations", organizations::router())
        .nest("/repositories", repositories::router())
}
