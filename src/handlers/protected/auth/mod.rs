// handlers/protected/auth/mod.rs - Endpoints for the authenticated user

pub mod whoami; // GET /api/auth/whoami

pub use whoami::whoami_get;
