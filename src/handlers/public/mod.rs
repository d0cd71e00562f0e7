// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation and token acquisition. Nothing here has a user context,
// so every input is validated by its extractor before the handler runs.
pub mod auth;
