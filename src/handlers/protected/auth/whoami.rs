use axum::{
    extract::{Extension, State},
    Json,
};

use crate::database::UserProfile;
use crate::error::{ApiError, MSG_INVALID_TOKEN};
use crate::middleware::AuthUser;
use crate::AppState;

/// GET /api/auth/whoami - Profile of the user the token was issued to
///
/// Expected Output:
/// ```json
/// { "email": "ann@x.com", "name": "Ann", "created_at": "2025-01-01T00:00:00Z" }
/// ```
pub async fn whoami_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, ApiError> {
    match state.auth.find_user(&user.email).await? {
        Some(record) => Ok(Json(record.profile())),
        None => {
            tracing::warn!("Token {} names unknown user {}", user.token_id, user.email);
            Err(ApiError::unauthorized(MSG_INVALID_TOKEN))
        }
    }
}
