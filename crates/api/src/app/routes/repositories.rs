use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    routing::get,
};

use runauth_infra::{Backend, PolicyKind};

use crate::app::dto;
use crate::app::routes::policies;

/// Repository entries are keyed `owner/repo`, so the name is a wildcard capture.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_repositories))
        .route(
            "/*name",
            get(read_repository)
                .post(write_repository)
                .delete(delete_repository),
        )
}

pub async fn list_repositories(
    Extension(backend): Extension<Arc<Backend>>,
) -> axum::response::Response {
    policies::list(backend, PolicyKind::Repository).await
}

pub async fn read_repository(
    Extension(backend): Extension<Arc<Backend>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    policies::read(backend, PolicyKind::Repository, name).await
}

pub async fn write_repository(
    Extension(backend): Extension<Arc<Backend>>,
    Path(name): Path<String>,
    body: Result<Json<dto::WritePolicyRequest>, JsonRejection>,
) -> axum::response::Response {
    policies::write(backend, PolicyKind::Repository, name, body).await
}

pub async fn delete_repository(
    Extension(backend): Extension<Arc<Backend>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    policies::delete(backend, PolicyKind::Repository, name).await
}
