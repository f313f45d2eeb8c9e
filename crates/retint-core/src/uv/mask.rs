//! Texel-usage mask and mask-aware buffer helpers.

use glam::Vec2;

use crate::error::Error;
use crate::image::{Pixel, PixelBuffer};

/// Axis-aligned bounding box in UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvBounds {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl UvBounds {
    /// An inverted box that expands to the first point it absorbs.
    pub(crate) fn inverted() -> Self {
        Self {
            min: Vec2::splat(f32::INFINITY),
            max: Vec2::splat(f32::NEG_INFINITY),
        }
    }

    /// Grow to include `point`.
    pub(crate) fn absorb(&mut self, point: Vec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Whether any point was ever absorbed.
    pub(crate) fn is_degenerate(&self) -> bool {
        self.min.x > self.max.x
    }
}

/// Which texels of a texture a mesh's UV mapping actually touches.
///
/// The flag grid shares the [`PixelBuffer`] index convention
/// (`index = y × width + x`, `y` from the bottom row), so UV `(0, 0)`
/// lands on flag 0 — the texture's bottom-left texel.
#[derive(Debug, Clone, PartialEq)]
pub struct UvUsageMask {
    /// Texture width in texels.
    pub width: u32,
    /// Texture height in texels.
    pub height: u32,
    /// One flag per texel, `len == width × height`.
    pub used: Vec<bool>,
    /// Every wrapped vertex UV encountered during analysis.
    pub uv_coords: Vec<Vec2>,
    /// Bounding box of `uv_coords`. Zero-sized at the origin when no
    /// triangle survived the degeneracy filter.
    pub uv_bounds: UvBounds,
}

impl UvUsageMask {
    /// An all-unused mask for a texture of the given size.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            used: vec![false; width as usize * height as usize],
            uv_coords: Vec::new(),
            uv_bounds: UvBounds {
                min: Vec2::ZERO,
                max: Vec2::ZERO,
            },
        }
    }

    /// Whether the flag count matches the declared dimensions.
    pub fn is_valid(&self) -> bool {
        self.used.len() == self.width as usize * self.height as usize
    }

    /// Whether texel `(x, y)` is used, `y` measured from the bottom row.
    /// Out-of-bounds coordinates read as unused.
    pub fn is_used(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.used[(y * self.width + x) as usize]
    }

    /// Number of used texels.
    pub fn used_count(&self) -> usize {
        self.used.iter().filter(|&&u| u).count()
    }

    /// Used texels as a percentage of the whole grid, `0.0`–`100.0`.
    pub fn usage_percentage(&self) -> f32 {
        if self.used.is_empty() {
            return 0.0;
        }
        self.used_count() as f32 / self.used.len() as f32 * 100.0
    }

    /// Union another submesh's mask into this one. Both masks must
    /// describe the same texture dimensions.
    pub fn union(&mut self, other: &UvUsageMask) -> Result<(), Error> {
        if !self.is_valid()
            || !other.is_valid()
            || self.width != other.width
            || self.height != other.height
        {
            return Err(Error::InvalidInput);
        }
        for (flag, &theirs) in self.used.iter_mut().zip(&other.used) {
            *flag |= theirs;
        }
        if !other.uv_coords.is_empty() {
            if self.uv_coords.is_empty() {
                self.uv_bounds = other.uv_bounds;
            } else {
                self.uv_bounds.absorb(other.uv_bounds.min);
                self.uv_bounds.absorb(other.uv_bounds.max);
            }
        }
        self.uv_coords.extend_from_slice(&other.uv_coords);
        Ok(())
    }

    /// Collect the pixels of used texels, e.g. to restrict statistics or
    /// clustering to mesh-relevant image content.
    pub fn filter(&self, buffer: &PixelBuffer) -> Result<Vec<Pixel>, Error> {
        if !self.is_valid()
            || !buffer.is_valid()
            || self.width != buffer.width
            || self.height != buffer.height
        {
            return Err(Error::InvalidInput);
        }
        Ok(buffer
            .pixels
            .iter()
            .zip(&self.used)
            .filter_map(|(&px, &used)| used.then_some(px))
            .collect())
    }
}

/// Keep `original` wherever the mask is unused and `adjusted` wherever
/// it is used, so a recoloring never shows in areas the mesh never
/// samples. All three shapes must agree.
pub fn composite_masked(
    original: &PixelBuffer,
    adjusted: &PixelBuffer,
    mask: &UvUsageMask,
) -> Result<PixelBuffer, Error> {
    if !original.is_valid()
        || !adjusted.is_valid()
        || !mask.is_valid()
        || !original.same_shape(adjusted)
        || original.width != mask.width
        || original.height != mask.height
    {
        return Err(Error::InvalidInput);
    }

    let pixels = original
        .pixels
        .iter()
        .zip(&adjusted.pixels)
        .zip(&mask.used)
        .map(|((&orig, &adj), &used)| if used { adj } else { orig })
        .collect();

    Ok(PixelBuffer {
        width: original.width,
        height: original.height,
        pixels,
    })
}
