//! Retint Core — domain layer for texture palette matching.
//!
//! This crate contains all color science, statistical transfer math,
//! dominant-color clustering, and mesh-UV usage analysis. No GPU, asset
//! I/O, or editor dependencies.

pub mod balance;
pub mod color;
pub mod error;
pub mod image;
pub mod palette;
pub mod transfer;
pub mod uv;

// Re-exports for convenience.
pub use balance::{BalanceCache, BalanceConfig, BalanceMode, CacheDecision, apply_difference};
pub use color::space::{Hsv, Lab};
pub use color::stats::ChannelStats;
pub use error::Error;
pub use image::{Pixel, PixelBuffer};
pub use palette::{dominant_colors, dominant_colors_fast, synthetic_reference};
pub use transfer::{
    ALPHA_THRESHOLD, TransferMode, TransferOptions, transfer, transfer_anchored, transfer_masked,
};
pub use uv::{
    MeshUv, SampleQuality, UvBounds, UvTriangle, UvUsageMask, analyze_mesh_usage, analyze_usage,
    composite_masked,
};
