pub mod adapters;
pub mod application;
pub mod infra;

pub use application::app_error;
pub use application::use_cases;
