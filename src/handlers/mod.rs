// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth via `jwt_auth_middleware`)
pub mod protected; // Tier 2: caller identity required
pub mod public; // Tier 1: anonymous access
pub mod utils;
