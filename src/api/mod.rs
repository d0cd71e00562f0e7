pub mod extract;
pub mod schemas;

pub use extract::{ValidJson, ValidPath, Validate};
