pub mod auth;

pub use auth::{jwt_auth_middleware, AuthUser, AUTH_TOKEN_HEADER};
