use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use runauth_infra::Backend;

use crate::app::{dto, errors};

pub async fn read_config(Extension(backend): Extension<Arc<Backend>>) -> axum::response::Response {
    match backend.read_config().await {
        Ok(config) => (StatusCode::OK, Json(config)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn write_config(
    Extension(backend): Extension<Arc<Backend>>,
    body: Result<Json<dto::WriteConfigRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let bound_cidrs = request
        .bound_cidrs
        .map(dto::StringList::into_items)
        .unwrap_or_default();

    match backend
        .write_config(&bound_cidrs, request.base_url.as_deref())
        .await
    {
        Ok(config) => (StatusCode::OK, Json(config)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
