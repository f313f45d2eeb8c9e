//! Mesh-UV usage analysis — which texels does a mesh actually sample?

pub mod mask;
pub mod raster;

pub use mask::{UvBounds, UvUsageMask, composite_masked};
pub use raster::{
    MAX_UV_CHANNELS, MeshUv, SampleQuality, UvTriangle, analyze_mesh_usage, analyze_usage,
};
