// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (JWT auth)
pub mod public;    // No authentication required (/auth/*)
pub mod protected; // JWT authentication required (/api/*)
