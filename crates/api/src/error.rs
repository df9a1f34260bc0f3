//! HTTP error mapping.
//!
//! Handlers return [`AppResult`]; anything that escapes as an error is
//! rendered as `{"error": <message>, "code": <CODE>}`. Database errors are
//! classified against this schema's constraint names so clients see a 4xx
//! where the violation was caused by their input.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kite_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `kite_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal_error()
                }
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// `RowNotFound` maps to 404; constraint violations that trace back to
/// client input map to 4xx via [`classify_constraint`]; everything else is a
/// sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                if let Some(mapped) = classify_constraint(&code, db_err.constraint()) {
                    return mapped;
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal_error()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal_error()
        }
    }
}

/// Map a PostgreSQL constraint violation to a client-facing response.
///
/// Unique constraints in the schema are all named `uq_*` and indicate a
/// duplicate the client can resolve (409). Foreign keys fail when a request
/// references a row that does not exist (400), and the CHECK constraints on
/// `issues` fire when a raw SQL write bypasses the handler-level
/// status/priority validation (400). Returns `None` for anything that is not
/// the client's fault.
fn classify_constraint(
    code: &str,
    constraint: Option<&str>,
) -> Option<(StatusCode, &'static str, String)> {
    match code {
        // unique_violation
        "23505" => {
            let constraint = constraint.unwrap_or("unknown");
            constraint.starts_with("uq_").then(|| {
                (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                )
            })
        }
        // foreign_key_violation
        "23503" => Some((
            StatusCode::BAD_REQUEST,
            "INVALID_REFERENCE",
            match constraint {
                Some(name) => format!("Referenced row does not exist: {name}"),
                None => "Referenced row does not exist".to_string(),
            },
        )),
        // check_violation: the issues table constrains status and priority
        "23514" => match constraint {
            Some("issues_status_check") => Some((
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Invalid issue status".to_string(),
            )),
            Some("issues_priority_check") => Some((
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Invalid issue priority".to_string(),
            )),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_unique_violation_is_a_conflict() {
        let (status, code, message) =
            classify_constraint("23505", Some("uq_users_email")).unwrap();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "CONFLICT");
        assert!(message.contains("uq_users_email"));
    }

    #[test]
    fn unrecognized_unique_violation_stays_internal() {
        assert!(classify_constraint("23505", Some("users_pkey")).is_none());
        assert!(classify_constraint("23505", None).is_none());
    }

    #[test]
    fn foreign_key_violation_names_the_constraint() {
        let (status, code, message) =
            classify_constraint("23503", Some("comments_user_id_fkey")).unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INVALID_REFERENCE");
        assert!(message.contains("comments_user_id_fkey"));
    }

    #[test]
    fn issue_check_violations_read_as_validation_errors() {
        let (status, code, message) =
            classify_constraint("23514", Some("issues_status_check")).unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "Invalid issue status");

        let (_, _, message) =
            classify_constraint("23514", Some("issues_priority_check")).unwrap();
        assert_eq!(message, "Invalid issue priority");
    }

    #[test]
    fn unknown_check_or_code_is_not_classified() {
        assert!(classify_constraint("23514", Some("some_other_check")).is_none());
        assert!(classify_constraint("42P01", None).is_none());
    }
}
