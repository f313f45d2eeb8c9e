//! Dual-color-anchored transfer — map one picked target color onto one
//! picked reference color, with distance-based falloff.
//!
//! Unlike the whole-image modes, this variant anchors on a single
//! selected color pair. Each pixel keeps its LAB offset from the
//! selected target color when mapped to the reference color, so texture
//! variation and shading survive instead of flattening to one tone.

use crate::color::space::{Lab, delta_e, lab_to_rgb, rgb_to_lab};
use crate::error::Error;
use crate::image::{Pixel, PixelBuffer};
use crate::transfer::ALPHA_THRESHOLD;

/// Recolor `target` by moving colors near `target_color` toward
/// `reference_color`.
///
/// `selection_range` is the falloff radius in Delta-E units: strength is
/// 1 at the selected color, falls off linearly, and reaches 0 at the
/// range boundary. Must be positive. The applied blend is
/// `strength × intensity`.
pub fn transfer_anchored(
    target: &PixelBuffer,
    target_color: Pixel,
    reference_color: Pixel,
    intensity: f32,
    selection_range: f32,
) -> Result<PixelBuffer, Error> {
    if !target.is_valid() || selection_range <= 0.0 {
        return Err(Error::InvalidInput);
    }

    let anchor = rgb_to_lab(target_color);
    let destination = rgb_to_lab(reference_color);

    let mut out = Vec::with_capacity(target.pixels.len());
    for &px in &target.pixels {
        if px.a < ALPHA_THRESHOLD {
            out.push(px);
            continue;
        }

        let lab = rgb_to_lab(px);
        let strength = (1.0 - delta_e(lab, anchor) / selection_range).max(0.0);
        if strength <= 0.0 {
            out.push(px);
            continue;
        }

        // Carry the pixel's offset from the anchor over to the
        // destination, preserving relative shading.
        let mapped = Lab {
            l: destination.l + (lab.l - anchor.l),
            a: destination.a + (lab.a - anchor.a),
            b: destination.b + (lab.b - anchor.b),
        };
        let candidate = lab_to_rgb(mapped, px.a);
        out.push(px.lerp(candidate, strength * intensity));
    }

    Ok(PixelBuffer {
        width: target.width,
        height: target.height,
        pixels: out,
    })
}
