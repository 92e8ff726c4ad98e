//!
//! # Custom Error Handling
//!
//! This module defines the `AppError` type returned by every handler, guard and
//! store helper in the crate. Each variant maps to exactly one HTTP status, and
//! every error is rendered as a JSON object carrying a single `message` field.
//!
//! `From` implementations cover the error types of the crates we sit on
//! (`sqlx`, `validator`, `jsonwebtoken`, `bcrypt`) so handlers can use `?`.
//! Storage-level constraint violations are mapped to `Conflict` so that a
//! check-then-insert race that slips past the guard still surfaces as a 409.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed or expired credential (HTTP 401).
    Unauthorized(String),
    /// Valid credential whose role does not satisfy the operation (HTTP 403).
    Forbidden(String),
    /// Malformed request: missing fields, bad date format, invalid enum (HTTP 400).
    BadRequest(String),
    /// Field-level validation failure reported by `validator` (HTTP 400).
    ValidationError(String),
    /// A requested or referenced row does not exist (HTTP 404).
    NotFound(String),
    /// Uniqueness violation, duplicate profile, or delete blocked by dependents (HTTP 409).
    Conflict(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Unexpected storage failure (HTTP 500). The detail is logged, not returned.
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl AppError {
    /// The message placed in the JSON body.
    fn client_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InternalServerError(msg) => msg,
            AppError::DatabaseError(_) => "Database error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.client_message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`. Unique and foreign-key violations raised by
/// the storage engine become `Conflict`; everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                log::warn!("Unique constraint rejected write: {}", db_err);
                AppError::Conflict("Record already exists".into())
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                log::warn!("Foreign key constraint rejected write: {}", db_err);
                AppError::Conflict("Record is referenced by or references a missing row".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
///
/// Only token verification relies on this; encoding failures are mapped to a
/// 500 by `TokenService` itself.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing error: {}", error))
    }
}
