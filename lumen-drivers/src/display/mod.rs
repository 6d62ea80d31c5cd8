//! Display drivers

pub mod graphics;

pub use graphics::{to_rgb565, GraphicsDisplay, Orientable};
