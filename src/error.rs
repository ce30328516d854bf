// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{PasswordError, TokenError};
use crate::database::StoreError;

pub const MSG_INVALID_CREDENTIALS: &str = "Invalid Credentials";
pub const MSG_USER_EXISTS: &str = "User already exists.";
pub const MSG_INVALID_BODY: &str = "Invalid request body.";
pub const MSG_MISSING_TOKEN: &str = "Missing authentication token";
pub const MSG_INVALID_TOKEN: &str = "Invalid or expired token";
pub const MSG_INTERNAL: &str = "Internal Server Error";

/// One entry of an error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

/// HTTP API error with appropriate status codes and client-safe messages.
///
/// Every variant renders as a JSON list of `{"message": ...}` objects.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(Vec<String>),
    InvalidCredentials,
    Conflict,
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 500 Internal Server Error, the detail is for logs only
    Internal(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidCredentials
            | ApiError::Conflict
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe messages
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiError::Validation(messages) => messages.clone(),
            ApiError::InvalidCredentials => vec![MSG_INVALID_CREDENTIALS.to_string()],
            ApiError::Conflict => vec![MSG_USER_EXISTS.to_string()],
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) | ApiError::ServiceUnavailable(msg) => {
                vec![msg.clone()]
            }
            ApiError::Internal(_) => vec![MSG_INTERNAL.to_string()],
        }
    }

    pub fn body(&self) -> Vec<ErrorMessage> {
        self.messages()
            .into_iter()
            .map(|message| ErrorMessage { message })
            .collect()
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        ApiError::Internal(detail.into())
    }
}

// Convert component errors to ApiError, logging what the client never sees
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Credential store error: {}", err);
        ApiError::internal(err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hasher error: {}", err);
        ApiError::internal(err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => ApiError::unauthorized(MSG_MISSING_TOKEN),
            TokenError::Generation(_) | TokenError::InvalidSecret => {
                tracing::error!("Token issuer error: {}", err);
                ApiError::internal(err.to_string())
            }
            other => {
                tracing::debug!("Rejected token: {}", other);
                ApiError::unauthorized(MSG_INVALID_TOKEN)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Internal(detail) => write!(f, "internal error: {}", detail),
            other => write!(f, "{}", other.messages().join("; ")),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_renders_every_message() {
        let (status, body) = render(ApiError::Validation(vec![
            "Name is Empty.".to_string(),
            "Invalid Email.".to_string(),
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!([{ "message": "Name is Empty." }, { "message": "Invalid Email." }])
        );
    }

    #[tokio::test]
    async fn test_internal_hides_detail() {
        let (status, body) = render(ApiError::internal("connection refused to 10.0.0.5")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!([{ "message": MSG_INTERNAL }]));
    }

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        assert_eq!(
            ApiError::from(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(TokenError::InvalidAlgorithm).messages(),
            vec![MSG_INVALID_TOKEN]
        );
        assert_eq!(
            ApiError::from(TokenError::Missing).messages(),
            vec![MSG_MISSING_TOKEN]
        );
        assert_eq!(
            ApiError::from(TokenError::Generation("boom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_and_credentials_are_bad_request() {
        assert_eq!(ApiError::Conflict.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Conflict.messages(), vec![MSG_USER_EXISTS]);
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::BAD_REQUEST);
    }
}
