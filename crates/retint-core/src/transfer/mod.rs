//! Statistical color transfer between a target texture and a reference.
//!
//! All modes share the same preprocessing: pixels below the alpha
//! threshold are excluded from statistics over both buffers but written
//! through unchanged, and a buffer whose opaque set is empty falls back
//! to a single opaque white pixel so downstream math stays defined.

pub mod anchored;
pub mod channels;
pub mod histogram;
pub mod hue;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::image::{Pixel, PixelBuffer};
use crate::uv::{UvUsageMask, composite_masked};

pub use anchored::transfer_anchored;
pub use hue::dominant_hue;

/// Pixels with alpha below this never participate in statistics and are
/// always passed through untouched.
pub const ALPHA_THRESHOLD: f32 = 0.01;

/// Which recoloring algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferMode {
    /// Mean/deviation matching per LAB channel.
    HistogramMatch,
    /// Rotate hues by the dominant-hue difference.
    HueShift,
    /// Mean/deviation matching per RGB channel.
    ColorTransfer,
    /// Fixed blend of histogram matching and color transfer.
    Adaptive,
}

/// Options shared by every transfer mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferOptions {
    /// Algorithm to run.
    pub mode: TransferMode,
    /// Blend strength in `[0, 1]`. Zero returns the target unchanged.
    pub intensity: f32,
    /// Bias the result toward the target's original lightness.
    pub preserve_luminance: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            mode: TransferMode::HistogramMatch,
            intensity: 1.0,
            preserve_luminance: false,
        }
    }
}

/// Recolor `target` so its palette statistically matches `reference`.
///
/// The output has the target's dimensions; the reference may be any
/// size. Transparent pixels pass through bit-exact and opaque pixels
/// keep their alpha in every mode.
pub fn transfer(
    target: &PixelBuffer,
    reference: &PixelBuffer,
    options: &TransferOptions,
) -> Result<PixelBuffer, Error> {
    if !target.is_valid() || !reference.is_valid() {
        return Err(Error::InvalidInput);
    }
    let target_stats = opaque_pixels(&target.pixels);
    let reference_stats = opaque_pixels(&reference.pixels);
    Ok(dispatch(target, &target_stats, &reference_stats, options))
}

/// Recolor only the mesh-used area of `target`.
///
/// Statistics over the target are restricted to texels the mask marks
/// used; texels outside the mask keep their original value in the
/// output, so the recoloring is never visible in areas the mesh never
/// samples.
pub fn transfer_masked(
    target: &PixelBuffer,
    reference: &PixelBuffer,
    mask: &UvUsageMask,
    options: &TransferOptions,
) -> Result<PixelBuffer, Error> {
    if !target.is_valid() || !reference.is_valid() {
        return Err(Error::InvalidInput);
    }
    let used = mask.filter(target)?;
    let target_stats = opaque_pixels(&used);
    let reference_stats = opaque_pixels(&reference.pixels);
    let adjusted = dispatch(target, &target_stats, &reference_stats, options);
    composite_masked(target, &adjusted, mask)
}

fn dispatch(
    target: &PixelBuffer,
    target_stats: &[Pixel],
    reference_stats: &[Pixel],
    options: &TransferOptions,
) -> PixelBuffer {
    tracing::debug!(
        "transfer {:?}: intensity {:.3}, preserve_luminance {}",
        options.mode,
        options.intensity,
        options.preserve_luminance
    );
    match options.mode {
        TransferMode::HistogramMatch => histogram::apply(
            target,
            target_stats,
            reference_stats,
            options.intensity,
            options.preserve_luminance,
        ),
        TransferMode::HueShift => hue::apply(
            target,
            target_stats,
            reference_stats,
            options.intensity,
            options.preserve_luminance,
        ),
        TransferMode::ColorTransfer => channels::apply(
            target,
            target_stats,
            reference_stats,
            options.intensity,
            options.preserve_luminance,
        ),
        TransferMode::Adaptive => channels::apply_adaptive(
            target,
            target_stats,
            reference_stats,
            options.intensity,
            options.preserve_luminance,
        ),
    }
}

/// Pixels that participate in statistics. Falls back to a single opaque
/// white pixel when the alpha filter empties the set.
pub(crate) fn opaque_pixels(pixels: &[Pixel]) -> Vec<Pixel> {
    let opaque: Vec<Pixel> = pixels
        .iter()
        .copied()
        .filter(|px| px.a >= ALPHA_THRESHOLD)
        .collect();
    if opaque.is_empty() {
        tracing::warn!("no pixels above alpha threshold, substituting opaque white");
        vec![Pixel::WHITE]
    } else {
        opaque
    }
}
