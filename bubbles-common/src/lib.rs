pub mod lyon;
pub mod shape;
pub mod types;
