// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{ApiError, MSG_INVALID_BODY};
use crate::types::{LoginRequest, TokenResponse};
use crate::AppState;

/// POST /auth/login - Authenticate with email and password
///
/// Returns `{ "token": "..." }` on success. A malformed email, an unknown
/// email and a wrong password all yield the same 400 `[{ "message": "Invalid Credentials" }]`.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected login body: {}", e);
        ApiError::bad_request(MSG_INVALID_BODY)
    })?;

    let response = state.auth.login(request).await?;
    Ok(Json(response))
}
