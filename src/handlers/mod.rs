// handlers/mod.rs - Two-tier handler layout
//
// Public (no token) → Protected (bearer token verified by `middleware::auth_gate`)

pub mod protected; // Tier 2: token required, caller passed as `AuthUser`
pub mod public;    // Tier 1: liveness and token acquisition
