// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (JWT auth, registered per route group)
pub mod protected; // Tier 2: bearer token required (/profile, /projects/*)
pub mod public; // Tier 1: no authentication (/users, /sessions/*, /password/*)
