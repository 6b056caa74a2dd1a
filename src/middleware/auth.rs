//! Bearer-token guards for protected routes.
//!
//! On success the verified username is stored in the request extensions as an
//! [`Identity`] for handlers to pick up with `Extension<Identity>`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, AppState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

pub async fn require_access_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, request, next, false).await
}

pub async fn require_refresh_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, request, next, true).await
}

async fn authorize(
    state: &AppState,
    mut request: Request,
    next: Next,
    require_refresh: bool,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::warn!("Missing or malformed Authorization header");
        AppError::Unauthenticated
    })?;

    let identity = state.tokens.verify(token, require_refresh)?;

    request.extensions_mut().insert(Identity(identity));
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}
