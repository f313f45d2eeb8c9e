//! Triangle rasterization from UV space into the texel grid.
//!
//! One rasterizer serves both fidelity levels: [`SampleQuality`] selects
//! a single center sample per texel or five samples (center plus four
//! quadrant offsets). Coverage is a barycentric containment test with a
//! small epsilon so edge texels are not dropped to rounding.

use glam::Vec2;

use crate::error::Error;
use crate::uv::mask::{UvBounds, UvUsageMask};

/// UV triangles with an area below this are treated as degenerate and
/// skipped. Meshes routinely contain them; skipping is not an error.
const DEGENERATE_AREA: f32 = 1e-7;

/// Barycentric tolerance so texels touching a triangle edge count as
/// covered.
const BARY_EPSILON: f32 = 1e-4;

/// Sub-texel sample positions, relative to the texel's lower corner.
const CENTER_SAMPLE: [[f32; 2]; 1] = [[0.5, 0.5]];
const MULTI_SAMPLES: [[f32; 2]; 5] = [
    [0.5, 0.5],
    [0.25, 0.25],
    [0.75, 0.25],
    [0.25, 0.75],
    [0.75, 0.75],
];

/// Up to four UV sets a mesh may carry.
pub const MAX_UV_CHANNELS: usize = 4;

/// How many coverage samples to test per texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleQuality {
    /// One sample at the texel center. Fast path.
    Center,
    /// Center plus four quadrant offsets. Catches texels a triangle
    /// clips without covering the center.
    Multi,
}

/// One mesh triangle as three UV vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvTriangle {
    /// First vertex.
    pub a: Vec2,
    /// Second vertex.
    pub b: Vec2,
    /// Third vertex.
    pub c: Vec2,
}

impl UvTriangle {
    /// Construct from three UV vertices.
    pub const fn new(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self { a, b, c }
    }

    /// Unsigned area in UV space.
    pub fn area(&self) -> f32 {
        (self.b - self.a).perp_dot(self.c - self.a).abs() * 0.5
    }
}

/// Triangle lists per UV channel, one inner list per submesh. Submeshes
/// that share a material contribute to the same unioned mask.
#[derive(Debug, Clone, Default)]
pub struct MeshUv {
    channels: [Vec<Vec<UvTriangle>>; MAX_UV_CHANNELS],
}

impl MeshUv {
    /// An empty mesh description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one submesh's triangles under a UV channel (0–3).
    pub fn add_submesh(
        &mut self,
        channel: usize,
        triangles: Vec<UvTriangle>,
    ) -> Result<(), Error> {
        if channel >= MAX_UV_CHANNELS {
            return Err(Error::InvalidInput);
        }
        self.channels[channel].push(triangles);
        Ok(())
    }

    /// Submeshes registered under a channel. Out-of-range channels read
    /// as empty.
    pub fn submeshes(&self, channel: usize) -> &[Vec<UvTriangle>] {
        self.channels.get(channel).map_or(&[], Vec::as_slice)
    }
}

/// Rasterize a triangle list into a texel-usage mask.
///
/// UV coordinates outside `[0, 1]` wrap via modulo. The vertical axis is
/// flipped from the bottom-left UV origin into top-left pixel rows while
/// rasterizing, and flags are stored back in the buffer's bottom-origin
/// convention, so UV `(0, 0)` marks the texture's bottom-left texel.
pub fn analyze_usage(
    triangles: &[UvTriangle],
    width: u32,
    height: u32,
    quality: SampleQuality,
) -> Result<UvUsageMask, Error> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidInput);
    }

    let mut mask = UvUsageMask::empty(width, height);
    let mut bounds = UvBounds::inverted();

    for triangle in triangles {
        if triangle.area() < DEGENERATE_AREA {
            continue;
        }

        let a = wrap_uv(triangle.a);
        let b = wrap_uv(triangle.b);
        let c = wrap_uv(triangle.c);
        for uv in [a, b, c] {
            bounds.absorb(uv);
            mask.uv_coords.push(uv);
        }

        rasterize(&mut mask.used, width, height, a, b, c, quality);
    }

    if !bounds.is_degenerate() {
        mask.uv_bounds = bounds;
    }

    tracing::debug!(
        "analyzed {} triangles into {}x{} mask: {:.1}% used",
        triangles.len(),
        width,
        height,
        mask.usage_percentage()
    );
    Ok(mask)
}

/// Rasterize every submesh of one UV channel and union the results.
pub fn analyze_mesh_usage(
    mesh: &MeshUv,
    channel: usize,
    width: u32,
    height: u32,
    quality: SampleQuality,
) -> Result<UvUsageMask, Error> {
    if channel >= MAX_UV_CHANNELS || width == 0 || height == 0 {
        return Err(Error::InvalidInput);
    }

    let mut mask = UvUsageMask::empty(width, height);
    for submesh in mesh.submeshes(channel) {
        let submesh_mask = analyze_usage(submesh, width, height, quality)?;
        mask.union(&submesh_mask)?;
    }
    Ok(mask)
}

/// Wrap one UV coordinate into the unit square. Values already in
/// `[0, 1]` are kept, so a seam vertex at exactly 1.0 does not collapse
/// onto 0.0.
fn wrap_uv(uv: Vec2) -> Vec2 {
    Vec2::new(wrap_component(uv.x), wrap_component(uv.y))
}

fn wrap_component(c: f32) -> f32 {
    if (0.0..=1.0).contains(&c) {
        c
    } else {
        c.rem_euclid(1.0)
    }
}

/// Mark every texel any sample of which falls inside the triangle.
/// Operates in top-origin texel space, storing flags bottom-origin.
fn rasterize(
    used: &mut [bool],
    width: u32,
    height: u32,
    a: Vec2,
    b: Vec2,
    c: Vec2,
    quality: SampleQuality,
) {
    let w = width as f32;
    let h = height as f32;
    // Texel space with the v axis flipped to pixel rows
    let pa = Vec2::new(a.x * w, (1.0 - a.y) * h);
    let pb = Vec2::new(b.x * w, (1.0 - b.y) * h);
    let pc = Vec2::new(c.x * w, (1.0 - c.y) * h);

    // Integer bounding box, padded by one texel
    let min_x = (pa.x.min(pb.x).min(pc.x).floor() as i64 - 1).clamp(0, width as i64 - 1);
    let max_x = (pa.x.max(pb.x).max(pc.x).ceil() as i64 + 1).clamp(0, width as i64 - 1);
    let min_y = (pa.y.min(pb.y).min(pc.y).floor() as i64 - 1).clamp(0, height as i64 - 1);
    let max_y = (pa.y.max(pb.y).max(pc.y).ceil() as i64 + 1).clamp(0, height as i64 - 1);

    let samples: &[[f32; 2]] = match quality {
        SampleQuality::Center => &CENTER_SAMPLE,
        SampleQuality::Multi => &MULTI_SAMPLES,
    };

    for ty in min_y..=max_y {
        for tx in min_x..=max_x {
            let covered = samples.iter().any(|offset| {
                let point = Vec2::new(tx as f32 + offset[0], ty as f32 + offset[1]);
                point_in_triangle(point, pa, pb, pc)
            });
            if covered {
                // Flip the row back into the bottom-origin flag grid
                let flag_y = height as i64 - 1 - ty;
                used[(flag_y * width as i64 + tx) as usize] = true;
            }
        }
    }
}

/// Barycentric containment with tolerance. A near-zero denominator means
/// the texel-space triangle collapsed; nothing is inside it.
fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let denom = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if denom.abs() < 1e-12 {
        return false;
    }
    let w1 = ((b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y)) / denom;
    let w2 = ((c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y)) / denom;
    let w3 = 1.0 - w1 - w2;
    w1 >= -BARY_EPSILON && w2 >= -BARY_EPSILON && w3 >= -BARY_EPSILON
}
