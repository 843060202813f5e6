pub mod axis;
pub mod color;
pub mod config;
pub mod crosshair;
pub mod data;
pub mod error;
pub mod join;
pub mod margin;
pub mod marker;
pub mod point;
pub mod render;
pub mod size;
