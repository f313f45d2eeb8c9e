//! Dominant-color extraction and synthetic reference construction.

pub mod kmeans;
pub mod synthetic;

pub use kmeans::{dominant_colors, dominant_colors_fast};
pub use synthetic::synthetic_reference;
