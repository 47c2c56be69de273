use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use inkwell_core::{DomainError, ValidationErrors};

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Internal { context, detail } => {
            error!(%detail, "{context}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", context)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(errors) => validation_error(errors),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg),
    }
}

/// 411 with the full issue list.
pub fn validation_error(errors: ValidationErrors) -> axum::response::Response {
    (
        StatusCode::LENGTH_REQUIRED,
        axum::Json(json!({
            "error": "validation_error",
            "message": "Invalid inputs",
            "issues": errors,
        })),
    )
        .into_response()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_their_statuses() {
        let cases = [
            (DomainError::from(ValidationErrors::single("name", "required", "name is required")), 411),
            (DomainError::invalid_id("abc"), 400),
            (DomainError::not_found("post not found"), 404),
            (DomainError::conflict("email already registered"), 409),
            (DomainError::unauthorized("Invalid credentials"), 401),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status().as_u16(), status);
        }
    }

    #[test]
    fn internal_errors_are_500() {
        let res = service_error_to_response(ServiceError::Internal {
            context: "Error creating post",
            detail: "connection refused".to_string(),
        });
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
