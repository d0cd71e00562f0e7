pub mod create;
pub mod delete;
pub mod get;
pub mod update;

pub use create::create_project;
pub use delete::delete_project;
pub use get::get_project;
pub use update::update_project;
