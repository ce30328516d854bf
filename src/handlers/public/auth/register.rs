// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{ApiError, MSG_INVALID_BODY};
use crate::types::{RegisterRequest, TokenResponse};
use crate::AppState;

/// POST /auth/register - Create an account and receive a JWT token
///
/// Expected Input:
/// ```json
/// { "name": "Ann", "email": "ann@x.com", "password": "secret123" }
/// ```
///
/// Expected Output (Success, 200):
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiI..." }
/// ```
///
/// Validation problems come back together as a 400 list:
/// ```json
/// [{ "message": "Name is Empty." }, { "message": "Invalid Email." }]
/// ```
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected registration body: {}", e);
        ApiError::bad_request(MSG_INVALID_BODY)
    })?;

    let response = state.auth.register(request).await?;
    Ok(Json(response))
}
