//! Handlers shared by the organization and repository policy endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};

use runauth_infra::{Backend, PolicyKind};

use crate::app::{dto, errors};

pub async fn list(backend: Arc<Backend>, kind: PolicyKind) -> axum::response::Response {
    match backend.list_policies(kind).await {
        Ok(keys) => (StatusCode::OK, Json(dto::KeysResponse { keys })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn read(backend: Arc<Backend>, kind: PolicyKind, name: String) -> axum::response::Response {
    match backend.read_policy(kind, &name).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn write(
    backend: Arc<Backend>,
    kind: PolicyKind,
    name: String,
    body: Result<Json<dto::WritePolicyRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match backend.write_policy(kind, &name, request.into_policies()).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete(backend: Arc<Backend>, kind: PolicyKind, name: String) -> axum::response::Response {
    match backend.delete_policy(kind, &name).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
