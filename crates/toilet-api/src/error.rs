use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use toilet_db::StoreError;
use toilet_types::api::ErrorResponse;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Every failure a request can end in. Each variant maps to one status code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("username already exists")]
    Conflict,

    /// Deliberately the same for unknown users and wrong passwords.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("missing, invalid or expired token")]
    Unauthorized,

    /// Deliberately the same for foreign and missing toilets.
    #[error("not authorized or toilet not found")]
    NotAuthorizedOrMissing,

    #[error("storage failure: {0}")]
    Storage(anyhow::Error),

    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict => StatusCode::CONFLICT,
            ServiceError::InvalidCredentials | ServiceError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::NotAuthorizedOrMissing => StatusCode::FORBIDDEN,
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::Conflict => "conflict",
            ServiceError::InvalidCredentials => "invalid_credentials",
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::NotAuthorizedOrMissing => "not_authorized_or_missing",
            ServiceError::Storage(_) => "storage_error",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => ServiceError::Conflict,
            StoreError::NotFound | StoreError::NotAuthorizedOrMissing => {
                ServiceError::NotAuthorizedOrMissing
            }
            StoreError::MissingReference => {
                ServiceError::validation("referenced record does not exist")
            }
            StoreError::Storage(e) => ServiceError::Storage(e),
        }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("rejected request body: {}", rejection.body_text());
        let message = match rejection {
            JsonRejection::JsonDataError(_) => "request body has missing or invalid fields",
            JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
            JsonRejection::MissingJsonContentType(_) => "expected an application/json body",
            _ => "request body could not be read",
        };
        ServiceError::validation(message)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ServiceError::Storage(e) => {
                error!("Storage error: {:?}", e);
                "a storage error occurred".to_string()
            }
            ServiceError::Internal(e) => {
                error!("Internal error: {:?}", e);
                "an internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: self.error_code().to_string(),
            message,
        });

        (status, body).into_response()
    }
}
