// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;
use crate::billing::models::Plan;

/// API error types
///
/// Closed taxonomy matched exhaustively at the response boundary. Route
/// handlers map service-level errors into these variants; anything that
/// carries internal detail (database, provider payloads) is logged server-side
/// and replaced with a generic message.
#[derive(Debug)]
pub enum ApiError {
    AuthRequired,
    InvalidToken,
    TokenExpired,
    UserNotFound,
    Forbidden(String),
    PlanRequired(Plan),
    DuplicateEmail,
    NoPasswordSet,
    InvalidCredentials,
    PaymentProviderError,
    PaymentNotCompleted,
    ValidationError(String),
    BadRequest(String),
    NotFound(String),
    TooManyRequests(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::AuthRequired => write!(f, "Authentication required"),
            ApiError::InvalidToken => write!(f, "Invalid token"),
            ApiError::TokenExpired => write!(f, "Token expired"),
            ApiError::UserNotFound => write!(f, "User not found"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::PlanRequired(plan) => {
                write!(f, "{} plan or higher required", plan.as_str())
            }
            ApiError::DuplicateEmail => write!(f, "Email already registered"),
            ApiError::NoPasswordSet => write!(f, "No password set for this account"),
            ApiError::InvalidCredentials => write!(f, "Invalid email or password"),
            ApiError::PaymentProviderError => write!(f, "Payment provider error"),
            ApiError::PaymentNotCompleted => write!(f, "Payment not completed"),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::TooManyRequests(msg) => write!(f, "Too Many Requests: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::AuthRequired => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
                "AUTH_REQUIRED",
            ),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid token".to_string(),
                "INVALID_TOKEN",
            ),
            ApiError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "Token expired".to_string(),
                "TOKEN_EXPIRED",
            ),
            ApiError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "User not found".to_string(),
                "USER_NOT_FOUND",
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            ApiError::PlanRequired(plan) => (
                StatusCode::FORBIDDEN,
                format!("{} plan or higher required", plan.as_str()),
                "PLAN_REQUIRED",
            ),
            ApiError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "Email already registered".to_string(),
                "DUPLICATE_EMAIL",
            ),
            ApiError::NoPasswordSet => (
                StatusCode::UNAUTHORIZED,
                "Please use social login".to_string(),
                "NO_PASSWORD_SET",
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
                "INVALID_CREDENTIALS",
            ),
            ApiError::PaymentProviderError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Payment provider request failed".to_string(),
                "PAYMENT_PROVIDER_ERROR",
            ),
            ApiError::PaymentNotCompleted => (
                StatusCode::BAD_REQUEST,
                "Payment not completed".to_string(),
                "PAYMENT_NOT_COMPLETED",
            ),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::TooManyRequests(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, msg, "RATE_LIMIT_EXCEEDED")
            }
            ApiError::InternalServer(msg) => {
                error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR",
                )
            }
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}
