//! Hue shift — rotate every hue by the dominant-hue difference.

use crate::color::space::{hsv_to_rgb, preserve_luminance, rgb_to_hsv};
use crate::image::{Pixel, PixelBuffer};
use crate::transfer::ALPHA_THRESHOLD;

/// Pixels at or below this saturation carry no meaningful hue and are
/// ignored when computing the dominant hue.
const SATURATION_FLOOR: f32 = 0.1;

/// Circular mean of hue over sufficiently saturated, sufficiently
/// opaque pixels, in degrees `[0, 360)`. Returns `0.0` when no pixel
/// qualifies.
pub fn dominant_hue(pixels: &[Pixel]) -> f32 {
    let mut sin_sum = 0.0_f64;
    let mut cos_sum = 0.0_f64;
    let mut count = 0_u64;

    for &px in pixels {
        if px.a < ALPHA_THRESHOLD {
            continue;
        }
        let hsv = rgb_to_hsv(px);
        if hsv.s <= SATURATION_FLOOR {
            continue;
        }
        let radians = (hsv.h as f64).to_radians();
        sin_sum += radians.sin();
        cos_sum += radians.cos();
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }
    (sin_sum.atan2(cos_sum).to_degrees() as f32).rem_euclid(360.0)
}

/// Rotate each opaque target hue by
/// `(referenceDominant − targetDominant) × intensity`, wrapping into
/// `[0, 360)`.
pub(crate) fn apply(
    target: &PixelBuffer,
    target_stats: &[Pixel],
    reference_stats: &[Pixel],
    intensity: f32,
    preserve: bool,
) -> PixelBuffer {
    let shift = (dominant_hue(reference_stats) - dominant_hue(target_stats)) * intensity;

    let mut out = Vec::with_capacity(target.pixels.len());
    for &px in &target.pixels {
        if px.a < ALPHA_THRESHOLD {
            out.push(px);
            continue;
        }
        let mut hsv = rgb_to_hsv(px);
        hsv.h = (hsv.h + shift).rem_euclid(360.0);
        let candidate = hsv_to_rgb(hsv, px.a);
        out.push(if preserve {
            preserve_luminance(px, candidate)
        } else {
            candidate
        });
    }

    PixelBuffer {
        width: target.width,
        height: target.height,
        pixels: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1.0;

    #[test]
    fn test_dominant_hue_of_pure_red_is_zero() {
        let pixels = vec![Pixel::opaque(1.0, 0.0, 0.0); 8];
        assert!(dominant_hue(&pixels).abs() < EPSILON);
    }

    #[test]
    fn test_dominant_hue_ignores_desaturated_pixels() {
        // Grays carry no hue; a single saturated green decides.
        let mut pixels = vec![Pixel::opaque(0.5, 0.5, 0.5); 16];
        pixels.push(Pixel::opaque(0.0, 1.0, 0.0));
        assert!((dominant_hue(&pixels) - 120.0).abs() < EPSILON);
    }

    #[test]
    fn test_dominant_hue_without_qualifying_pixels_is_zero() {
        let pixels = vec![Pixel::opaque(0.4, 0.4, 0.4); 8];
        assert_eq!(dominant_hue(&pixels), 0.0);
    }

    #[test]
    fn test_dominant_hue_averages_around_the_wrap_point() {
        // 350° and 10° must average to 0°, not 180°.
        let pixels = vec![
            Pixel::opaque(1.0, 0.0, 1.0 / 6.0), // h = 350
            Pixel::opaque(1.0, 1.0 / 6.0, 0.0), // h = 10
        ];
        let hue = dominant_hue(&pixels);
        assert!(
            hue < EPSILON || hue > 360.0 - EPSILON,
            "wrap-aware mean should be near 0: {hue}"
        );
    }

    #[test]
    fn test_full_shift_moves_target_hue_onto_reference() {
        let target = PixelBuffer::from_pixels(
            2,
            1,
            vec![Pixel::opaque(1.0, 0.1, 0.1); 2],
        )
        .unwrap();
        let reference = vec![Pixel::opaque(0.1, 1.0, 0.1); 2];

        let result = apply(&target, &target.pixels.clone(), &reference, 1.0, false);
        let shifted = rgb_to_hsv(result.pixels[0]);
        assert!(
            (shifted.h - 120.0).abs() < 2.0,
            "hue should land on the reference dominant: {}",
            shifted.h
        );
    }
}
