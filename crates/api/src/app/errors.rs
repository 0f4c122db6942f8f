//! Consistent JSON error responses.
//!
//! Every failure renders as `{"error": <code>, "message": <text>}`; validation
//! failures add the per-field `errors` list.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use bridgecms_auth::AuthError;
use bridgecms_core::{DomainError, ValidationErrors};

use crate::app::services::ServiceError;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(AuthError),

    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("rate limited")]
    RateLimited,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Detail of a 500 response, carried as a response extension so development
/// builds can surface it; see `middleware::expose_error_detail`.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Domain(DomainError::Validation(errors)) => Self::Validation(errors),
            ServiceError::Domain(DomainError::InvalidId(msg)) => Self::InvalidId(msg),
            ServiceError::Domain(DomainError::NotFound(what)) => Self::NotFound(what.to_string()),
            ServiceError::Domain(DomainError::Conflict(msg)) => Self::Conflict(msg),
            ServiceError::Auth(e) => Self::Unauthorized(e),
            ServiceError::Forbidden(_) => Self::Forbidden,
            ServiceError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        Self::Unauthorized(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "validation_error",
                    "message": "Validation failed",
                    "errors": errors,
                })),
            )
                .into_response(),
            Self::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
            Self::Conflict(msg) => json_error(StatusCode::BAD_REQUEST, "conflict", capitalize(&msg)),
            Self::Unauthorized(e) => {
                let message = match e {
                    AuthError::InvalidCredentials => "Invalid credentials",
                    AuthError::MissingToken => "Access token required",
                    AuthError::InvalidToken(_) => "Invalid or expired token",
                };
                json_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
            }
            Self::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "Insufficient permissions"),
            Self::NotFound(what) => {
                json_error(StatusCode::NOT_FOUND, "not_found", format!("{} not found", capitalize(&what)))
            }
            Self::RateLimited => json_error(
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests from this IP, please try again later.",
            ),
            Self::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                let mut response = json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", INTERNAL_MESSAGE);
                response.extensions_mut().insert(InternalErrorDetail(detail));
                response
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// The development-mode 500 body.
pub fn internal_error_with_detail(detail: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({
            "error": "internal_error",
            "message": INTERNAL_MESSAGE,
            "detail": detail,
        })),
    )
        .into_response()
}

/// Rendered by the catch-panic layer.
pub fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::Internal(format!("panic: {detail}")).into_response()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_lists_fields() {
        let response = ApiError::Validation(ValidationErrors::single("email", "is required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["errors"][0]["field"], "email");
    }

    #[tokio::test]
    async fn internal_errors_are_sanitized() {
        let response = ApiError::Internal("connection reset by peer".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<InternalErrorDetail>().is_some());

        let body = body(response).await;
        assert_eq!(body["message"], INTERNAL_MESSAGE);
        assert!(body.get("detail").is_none());
    }

    #[tokio::test]
    async fn service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::Domain(DomainError::conflict("slug already exists")), StatusCode::BAD_REQUEST),
            (ServiceError::Domain(DomainError::not_found("blog post")), StatusCode::NOT_FOUND),
            (ServiceError::Domain(DomainError::invalid_id("nope")), StatusCode::BAD_REQUEST),
            (ServiceError::Auth(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (ServiceError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn not_found_message_names_the_resource() {
        let body = body(ApiError::NotFound("blog post".into()).into_response()).await;
        assert_eq!(body["message"], "Blog post not found");
    }
}
