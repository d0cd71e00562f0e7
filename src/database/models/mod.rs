pub mod project;
pub mod token;
pub mod user;

pub use project::{NewProject, Project, ProjectChanges, StatusProject};
pub use token::{Token, TokenKind};
pub use user::{NewUser, User};
