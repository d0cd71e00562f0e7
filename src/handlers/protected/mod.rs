// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route in this tier sits behind `jwt_auth_middleware`; handlers read
// the caller through the `AuthUser` extractor.
pub mod auth; // GET /profile
pub mod project; // /projects CRUD
