use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::tokens::TokenError;

#[derive(Debug)]
pub enum AppError {
    Sqlx(sqlx::Error),
    PasswordHash(argon2::password_hash::Error),
    Jwt(jsonwebtoken::errors::Error),
    DuplicateIdentity,
    LoginFail,
    Unauthenticated,
    NotFound,
    MethodNotAllowed,
    Validation(String),
    Internal(&'static str),
}

impl From<sqlx::Error> for AppError {
    fn from(inner: sqlx::Error) -> Self {
        match inner.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => AppError::DuplicateIdentity,
            _ => AppError::Sqlx(inner),
        }
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(inner: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(inner)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(inner: jsonwebtoken::errors::Error) -> Self {
        AppError::Jwt(inner)
    }
}

impl From<TokenError> for AppError {
    fn from(inner: TokenError) -> Self {
        tracing::warn!("Rejected token: {}", inner);
        AppError::Unauthenticated
    }
}

impl From<JsonRejection> for AppError {
    fn from(inner: JsonRejection) -> Self {
        AppError::Validation(inner.body_text())
    }
}

// Path parameters are typed integers; anything else names no resource.
impl From<PathRejection> for AppError {
    fn from(inner: PathRejection) -> Self {
        tracing::debug!("Unmatched path parameter: {}", inner.body_text());
        AppError::NotFound
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Sqlx(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::PasswordHash(e) => {
                tracing::error!("Password hashing error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Password hashing error".to_string(),
                )
            }
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Token error".to_string())
            }
            AppError::DuplicateIdentity => (
                StatusCode::CONFLICT,
                "Username or email already exists".to_string(),
            ),
            AppError::LoginFail => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid authorization token".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::DuplicateIdentity, StatusCode::CONFLICT),
            (AppError::LoginFail, StatusCode::UNAUTHORIZED),
            (AppError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (AppError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (
                AppError::Internal("token expiry out of range"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Validation("quantity must be at least 1".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Sqlx(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn token_failures_collapse_to_unauthenticated() {
        for err in [
            TokenError::Invalid,
            TokenError::Expired,
            TokenError::WrongKind,
        ] {
            assert!(matches!(AppError::from(err), AppError::Unauthenticated));
        }
    }
}
