pub mod profile;

pub use profile::get_profile;
