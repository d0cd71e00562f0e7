//! Floki: project management HTTP API.
//!
//! Handlers receive their persistence through [`state::AppState`], so the
//! same router runs over PostgreSQL ([`database::PgStore`]) or the in-memory
//! store used by tests ([`database::MemoryStore`]).

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

#[cfg(test)]
pub mod testing;
