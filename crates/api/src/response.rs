//! Uniform responses: every handler outcome is either JSON data (200) or one
//! of a small, closed set of [`ApiError`]s.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use rfapi_acl::Denial;

/// Result type returned by endpoint handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Unhandled failure; logged.
    #[error("Server Error: {0}")]
    Internal(String),

    /// Missing or malformed parameters.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not authenticated for the route.
    #[error("Authorization required! {0}")]
    AuthorizationRequired(String),

    /// Authenticated, but not allowed.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already Exists: {0}")]
    AlreadyExists(String),

    /// The resource existed once but was removed meanwhile.
    #[error("{0}")]
    Gone(String),
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn authorization_required(msg: impl Into<String>) -> Self {
        Self::AuthorizationRequired(msg.into())
    }

    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn gone(msg: impl Into<String>) -> Self {
        Self::Gone(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthorizationRequired(_) => StatusCode::UNAUTHORIZED,
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Gone(_) => StatusCode::GONE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Internal(_) => "server_error",
            Self::BadRequest(_) => "bad_request",
            Self::AuthorizationRequired(_) => "authorization_required",
            Self::AccessDenied(_) => "access_denied",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Gone(_) => "gone",
        }
    }

    pub fn message(&self) -> String {
        self.to_string().trim_end().to_string()
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        if denial.is_authentication() {
            Self::AuthorizationRequired(denial.to_string())
        } else {
            Self::AccessDenied(denial.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(_) = &self {
            tracing::error!("{self}");
        }
        json_error(self.status(), self.code(), self.message())
    }
}

/// Response for a request the access check refused.
///
/// Same body as [`ApiError`], plus the denial's machine-readable `reason`.
pub fn denial_response(denial: Denial) -> Response {
    let error = ApiError::from(denial);
    (
        error.status(),
        Json(json!({
            "error": error.code(),
            "reason": denial.code(),
            "message": error.message(),
        })),
    )
        .into_response()
}

/// Turn a handler outcome into the final response.
pub fn respond<T: Serialize>(result: ApiResult<T>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
