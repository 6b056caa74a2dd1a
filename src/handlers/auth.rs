use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};

use crate::{
    error::AppError,
    middleware::Identity,
    models::user::{AuthResponse, LoginPayload, RefreshResponse, SignupPayload, UserResponse},
    AppState,
};

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(payload) = payload?;
    let user = state.credentials.register(payload.validate()?).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload?;
    let credentials = payload.validate()?;

    let user = state
        .credentials
        .verify(&credentials.email, &credentials.password)
        .await?
        .ok_or_else(|| {
            tracing::info!("Failed login attempt");
            AppError::LoginFail
        })?;

    Ok(Json(AuthResponse {
        access_token: state.tokens.issue_access_token(&user.username)?,
        refresh_token: state.tokens.issue_refresh_token(&user.username)?,
    }))
}

/// Runs behind `require_refresh_token`, so the identity is already verified.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(Identity(username)): Extension<Identity>,
) -> Result<Json<RefreshResponse>, AppError> {
    Ok(Json(RefreshResponse {
        access_token: state.tokens.issue_access_token(&username)?,
    }))
}
