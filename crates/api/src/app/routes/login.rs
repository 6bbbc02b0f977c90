use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use runauth_infra::Backend;

use crate::app::{dto, errors};

pub async fn login(
    Extension(backend): Extension<Arc<Backend>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let origin = connect_info.map(|ConnectInfo(addr)| addr.ip());

    match backend.login(request.claim(), origin).await {
        Ok(auth) => (StatusCode::OK, Json(dto::AuthResponse { auth })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn renew(
    Extension(backend): Extension<Arc<Backend>>,
    body: Result<Json<dto::RenewRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match backend.renew(request.client_token()).await {
        Ok(auth) => (StatusCode::OK, Json(dto::AuthResponse { auth })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
