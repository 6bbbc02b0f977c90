//! HTTP API application wiring (Axum router).
//!
//! - `routes/`: handlers, one file per surface (login/renew, policies, config)
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use runauth_infra::Backend;

use crate::middleware::{self, AdminAuth};

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `/login` reads the caller address from `ConnectInfo<SocketAddr>`; serve the
/// router with `into_make_service_with_connect_info` or bound CIDRs cannot match.
pub fn build_app(backend: Arc<Backend>, admin: AdminAuth) -> Router {
    // Administrative routes: require the operator bearer token.
    let admin_routes = routes::admin_router().layer(axum::middleware::from_fn_with_state(
        admin,
        middleware::admin_auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .merge(admin_routes)
        .layer(ServiceBuilder::new().layer(Extension(backend)))
}
