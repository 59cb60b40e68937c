use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::{notify::GatewayError, otp::OtpError, users::StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("User with this phone number already exists")]
    AlreadyExists,
    #[error("Phone number is already verified")]
    AlreadyVerified,
    #[error("{0}")]
    NotFound(String),
    #[error("OTP has expired")]
    OtpExpired,
    #[error("Invalid OTP")]
    OtpMismatch,
    #[error("Failed to deliver message: {0}")]
    Delivery(#[from] GatewayError),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user_not_found() -> Self {
        AppError::NotFound("User not found".into())
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::AlreadyExists => (StatusCode::BAD_REQUEST, "ALREADY_EXISTS"),
            AppError::AlreadyVerified => (StatusCode::BAD_REQUEST, "ALREADY_VERIFIED"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::OtpExpired => (StatusCode::BAD_REQUEST, "OTP_EXPIRED"),
            AppError::OtpMismatch => (StatusCode::BAD_REQUEST, "OTP_MISMATCH"),
            AppError::Delivery(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DELIVERY_FAILURE"),
            AppError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::Delivery(_) => "Failed to deliver message".to_string(),
            AppError::Persistence(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            error!(error = %self, code, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<OtpError> for AppError {
    fn from(e: OtpError) -> Self {
        match e {
            OtpError::NotFound => AppError::NotFound("No OTP pending for this phone number".into()),
            OtpError::Expired => AppError::OtpExpired,
            OtpError::Mismatch => AppError::OtpMismatch,
            OtpError::Hash(msg) => AppError::Internal(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => AppError::AlreadyExists,
            StoreError::Database(e) => AppError::Persistence(e.to_string()),
        }
    }
}
