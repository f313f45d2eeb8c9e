//! Difference-based balance transform.
//!
//! Applies a `from → to` color delta across a texture, scaled per pixel
//! by how similar the pixel is to the `from` color. Three policies
//! control the falloff; post-process knobs and an incremental preview
//! cache live in the sibling modules.

pub mod adjust;
pub mod cache;

use serde::{Deserialize, Serialize};

use crate::color::space::{MAX_RGB_DISTANCE, rgb_distance};
use crate::error::Error;
use crate::image::{Pixel, PixelBuffer};

pub use adjust::post_process;
pub use cache::{BalanceCache, CacheDecision};

/// How strongly the color delta follows similarity to the `from` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceMode {
    /// Uniform shift, no similarity weighting.
    Simple,
    /// Similarity-weighted shift with a soft, double-damped edge.
    Weighted,
    /// Squared-falloff selection with per-pixel delta rescaling.
    Advanced,
}

/// One invocation's balance parameters. Immutable during a call; the
/// caller mutates its own copy between calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    /// Falloff policy.
    pub mode: BalanceMode,
    /// Overall transform strength in `[0, 1]`.
    pub intensity: f32,
    /// Falloff sharpness, `> 0`. Larger values widen the selection.
    pub selection_radius: f32,
    /// Lower bound on similarity-derived strength (Weighted mode).
    pub min_similarity: f32,
    /// Post-process RGB multiplier. Identity 1.0.
    pub brightness: f32,
    /// Post-process contrast around 0.5. Identity 1.0.
    pub contrast: f32,
    /// Post-process gamma exponent. Identity 1.0.
    pub gamma: f32,
    /// Post-process alpha multiplier. Identity 1.0.
    pub transparency: f32,
}

impl Default for BalanceConfig {
    /// Identity post-process, full-strength simple shift.
    fn default() -> Self {
        Self {
            mode: BalanceMode::Simple,
            intensity: 1.0,
            selection_radius: 1.0,
            min_similarity: 0.0,
            brightness: 1.0,
            contrast: 1.0,
            gamma: 1.0,
            transparency: 1.0,
        }
    }
}

/// Apply the `from → to` delta across `target`.
///
/// `selection` optionally restricts which pixels are touched; excluded
/// pixels pass through bit-exact, skipping post-processing too. The
/// selection length must equal the pixel count.
pub fn apply_difference(
    target: &PixelBuffer,
    from: Pixel,
    to: Pixel,
    config: &BalanceConfig,
    selection: Option<&[bool]>,
) -> Result<PixelBuffer, Error> {
    let base = apply_base(target, from, to, config, selection)?;
    Ok(adjust::post_process_buffer(&base, config, selection))
}

/// The mode transform alone, before post-processing. The preview cache
/// stores this intermediate so knob changes can re-run only the cheap
/// stage.
pub(crate) fn apply_base(
    target: &PixelBuffer,
    from: Pixel,
    to: Pixel,
    config: &BalanceConfig,
    selection: Option<&[bool]>,
) -> Result<PixelBuffer, Error> {
    if !target.is_valid() || config.selection_radius <= 0.0 {
        return Err(Error::InvalidInput);
    }
    if let Some(mask) = selection
        && mask.len() != target.pixels.len()
    {
        return Err(Error::InvalidInput);
    }

    let delta = [to.r - from.r, to.g - from.g, to.b - from.b];

    let mut out = Vec::with_capacity(target.pixels.len());
    for (i, &px) in target.pixels.iter().enumerate() {
        if let Some(mask) = selection
            && !mask[i]
        {
            out.push(px);
            continue;
        }
        out.push(match config.mode {
            BalanceMode::Simple => shift(px, delta, config.intensity),
            BalanceMode::Weighted => weighted(px, from, delta, config),
            BalanceMode::Advanced => advanced(px, from, delta, config),
        });
    }

    Ok(PixelBuffer {
        width: target.width,
        height: target.height,
        pixels: out,
    })
}

/// Add the delta to the RGB channels at the given strength. Alpha is
/// untouched.
fn shift(px: Pixel, delta: [f32; 3], strength: f32) -> Pixel {
    Pixel::new(
        px.r + delta[0] * strength,
        px.g + delta[1] * strength,
        px.b + delta[2] * strength,
        px.a,
    )
}

/// Similarity-weighted application.
///
/// ```text
/// similarity = 1 − distance(px, from) / √3
/// strength   = max(similarity ^ (1 / radius), minSimilarity) × intensity
/// out        = lerp(px, px + delta × strength, strength)
/// ```
///
/// The delta is damped by `strength` twice — once scaling the shift and
/// once blending it in — which gives a softer edge than a single
/// application.
fn weighted(px: Pixel, from: Pixel, delta: [f32; 3], config: &BalanceConfig) -> Pixel {
    let similarity = (1.0 - rgb_distance(px, from) / MAX_RGB_DISTANCE).max(0.0);
    let shaped = similarity.powf(1.0 / config.selection_radius);
    let strength = shaped.max(config.min_similarity) * config.intensity;
    let shifted = shift(px, delta, strength);
    px.lerp(shifted, strength)
}

/// Sharper selection with per-pixel delta rescaling.
///
/// ```text
/// similarity = (1 − distance(px, from) / √3)²
/// strength   = similarity ^ (1 / radius) × intensity
/// scale      = 0.5 + similarity                   (0.5× – 1.5×)
/// blend      = 0.7 × strength + 0.3 × similarity ^ radius
/// out        = lerp(px, px + delta × scale × strength, blend)
/// ```
fn advanced(px: Pixel, from: Pixel, delta: [f32; 3], config: &BalanceConfig) -> Pixel {
    let linear = (1.0 - rgb_distance(px, from) / MAX_RGB_DISTANCE).max(0.0);
    let similarity = linear * linear;
    let strength = similarity.powf(1.0 / config.selection_radius) * config.intensity;
    let scale = 0.5 + similarity;
    let shifted = shift(
        px,
        [delta[0] * scale, delta[1] * scale, delta[2] * scale],
        strength,
    );
    let blend = 0.7 * strength + 0.3 * similarity.powf(config.selection_radius);
    px.lerp(shifted, blend)
}
