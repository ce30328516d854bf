use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::{ApiError, MSG_MISSING_TOKEN};
use crate::AppState;

/// Header carrying the bearer token
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: String,
    pub token_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        let expires_at = claims.expires_at();
        Self {
            email: claims.sub,
            token_id: claims.jti,
            expires_at,
        }
    }
}

/// JWT authentication middleware. Rejects the request with 401 unless the
/// token verifies; on success the `AuthUser` is available as an extension.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_headers(&headers)
        .ok_or_else(|| ApiError::unauthorized(MSG_MISSING_TOKEN))?;

    let claims = state.auth.authenticate(&token)?;
    tracing::debug!("Authenticated {} (token {})", claims.sub, claims.jti);

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Token from `X-Auth-Token`, falling back to `Authorization: Bearer <token>`
fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTH_TOKEN_HEADER) {
        let token = value.to_str().ok()?.trim();
        return (!token.is_empty()).then(|| token.to_string());
    }

    let auth_str = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
