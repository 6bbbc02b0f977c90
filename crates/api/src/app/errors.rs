use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use runauth_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidRenewalRequest(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_renewal_request", message)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::PermissionDenied(_) => {
            json_error(StatusCode::FORBIDDEN, "permission_denied", message)
        }
        DomainError::RunNotEligible { .. } => {
            json_error(StatusCode::FORBIDDEN, "run_not_eligible", message)
        }
        DomainError::LeaseExpired => json_error(StatusCode::FORBIDDEN, "lease_expired", message),
        DomainError::RunLookupFailed(_) => {
            json_error(StatusCode::BAD_GATEWAY, "run_lookup_failed", message)
        }
        DomainError::Storage(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message)
        }
        DomainError::Internal(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
        }
    }
}

/// Malformed or missing JSON bodies get the same error shape as domain failures.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
