//! Credential primitives: password hashing and bearer token issuance.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, TokenError, TokenIssuer};
pub use password::{PasswordError, PasswordHasher, MAX_PASSWORD_BYTES};
