use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    routing::get,
};

use runauth_infra::{Backend, PolicyKind};

use crate::app::dto;
use crate::app::routes::policies;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_organizations))
        .route(
            "/:name",
            get(read_organization)
                .post(write_organization)
                .delete(delete_organization),
        )
}

pub async fn list_organizations(
    Extension(backend): Extension<Arc<Backend>>,
) -> axum::response::Response {
    policies::list(backend, PolicyKind::Organization).await
}

pub async fn read_organization(
    Extension(backend): Extension<Arc<Backend>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    policies::read(backend, PolicyKind::Organization, name).await
}

pub async fn write_organization(
    Extension(backend): Extension<Arc<Backend>>,
    Path(name): Path<String>,
    body: Result<Json<dto::WritePolicyRequest>, JsonRejection>,
) -> axum::response::Response {
    policies::write(backend, PolicyKind::Organization, name, body).await
}

pub async fn delete_organization(
    Extension(backend): Extension<Arc<Backend>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    policies::delete(backend, PolicyKind::Organization, name).await
}
