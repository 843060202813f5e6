pub mod error;
pub mod measurement;
pub mod types;
