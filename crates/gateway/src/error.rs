//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use carebridge_identity::{FieldError, IdentityError};

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid request")]
    InvalidInput(Vec<FieldError>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid or expired code")]
    InvalidToken { new_code_sent: bool },

    #[error("{0}")]
    BadGateway(String),

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Request timed out")]
    GatewayTimeout,

    #[error("Internal server error")]
    InternalError(String),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldErrorResponse {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldErrorResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_code_sent: Option<bool>,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::InvalidToken { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            GatewayError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorResponse {
        let status = self.status_code();
        let message = self.to_string();
        let (fields, new_code_sent) = match self {
            GatewayError::InvalidInput(fields) => (
                fields
                    .into_iter()
                    .map(|f| FieldErrorResponse {
                        field: f.field,
                        message: f.message,
                    })
                    .collect(),
                None,
            ),
            GatewayError::InvalidToken { new_code_sent } => (Vec::new(), Some(new_code_sent)),
            _ => (Vec::new(), None),
        };

        ErrorResponse {
            error: status.as_str().to_string(),
            message,
            fields,
            new_code_sent,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let GatewayError::InternalError(detail) = &self {
            error!(detail = %detail, "request failed");
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<IdentityError> for GatewayError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::InvalidInput(fields) => GatewayError::InvalidInput(fields),
            IdentityError::InvalidCredentials => {
                GatewayError::Unauthorized("Invalid email or password".to_string())
            }
            IdentityError::Unauthorized => {
                GatewayError::Unauthorized("Authentication required".to_string())
            }
            IdentityError::PendingApproval | IdentityError::AccountSuspended => {
                GatewayError::Forbidden(error.to_string())
            }
            IdentityError::NotFound => GatewayError::NotFound("Account not found".to_string()),
            IdentityError::TenantUnavailable(_) => {
                GatewayError::NotFound("Clinic not found".to_string())
            }
            IdentityError::DuplicateIdentity | IdentityError::EmailAlreadyVerified => {
                GatewayError::Conflict(error.to_string())
            }
            IdentityError::InvalidOrExpiredToken { new_code_sent } => {
                GatewayError::InvalidToken { new_code_sent }
            }
            IdentityError::RegistrationFailed(_) => GatewayError::BadGateway(
                "Registration could not be completed, please try again".to_string(),
            ),
            IdentityError::ConnectionFailed(detail) => {
                error!(detail = %detail, "store connection failed");
                GatewayError::ServiceUnavailable
            }
            IdentityError::Timeout(detail) => {
                error!(detail = %detail, "store operation timed out");
                GatewayError::GatewayTimeout
            }
            IdentityError::Internal(detail) => GatewayError::InternalError(detail),
        }
    }
}

impl From<tokio::task::JoinError> for GatewayError {
    fn from(error: tokio::task::JoinError) -> Self {
        GatewayError::InternalError(format!("identity task failed: {error}"))
    }
}
