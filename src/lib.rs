pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod types;
pub mod validators;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::config::AppConfig;
use crate::database::CredentialStore;
use crate::services::AuthService;
use crate::validators::NamePolicy;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the auth service from configuration and an opened store
    pub fn new(config: AppConfig, store: Arc<dyn CredentialStore>) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(
            config.security.bcrypt_cost,
            Duration::from_secs(config.security.hash_timeout_secs),
        )
        .context("invalid password hasher settings")?;
        let tokens = TokenIssuer::from_config(&config.security).context("invalid token settings")?;

        let auth = AuthService::new(
            store,
            hasher,
            tokens,
            NamePolicy::from_config(&config.validation),
            Duration::from_secs(config.database.query_timeout_secs),
        );

        Ok(Self {
            auth: Arc::new(auth),
            config: Arc::new(config),
        })
    }
}

/// Build the full router with global middleware
pub fn app(state: AppState) -> Router {
    let api = &state.config.api;
    let body_limit = api.max_request_size_bytes;
    let request_timeout = Duration::from_secs(api.request_timeout_secs);
    let cors = cors_layer(api.enable_cors, &api.cors_origins);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(auth_public_routes())
        // Protected API
        .merge(auth_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn auth_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::jwt_auth_middleware,
        ))
}

fn cors_layer(enabled: bool, origins: &[String]) -> CorsLayer {
    if !enabled {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(middleware::AUTH_TOKEN_HEADER),
        ])
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Social API",
            "version": version,
            "endpoints": {
                "register": "POST /auth/register (public)",
                "login": "POST /auth/login (public)",
                "whoami": "GET /api/auth/whoami (requires X-Auth-Token)",
                "health": "GET /health (public)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.auth.ping_store().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
