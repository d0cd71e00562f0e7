// handlers/public/auth/mod.rs - Account and token acquisition endpoints

pub mod authenticate; // POST /sessions/password
pub mod create_account; // POST /users
pub mod password; // POST /password/recover, POST /password/reset

pub use authenticate::authenticate_with_password;
pub use create_account::create_account;
pub use password::{request_password_recover, reset_password};
