//! Histogram matching — per-channel LAB statistic transfer.

use crate::color::space::{Lab, lab_to_rgb, preserve_luminance, rgb_to_lab};
use crate::color::stats::ChannelStats;
use crate::image::{Pixel, PixelBuffer};
use crate::transfer::ALPHA_THRESHOLD;

/// Rescale each opaque target pixel's LAB distribution onto the
/// reference's.
///
/// ```text
/// matched = (value − targetMean) / targetStd × referenceStd + referenceMean
/// ```
///
/// Zero-deviation target channels pass the value through unchanged. The
/// matched color is blended with the original by `intensity`; when
/// `preserve` is set, the L channel blends at half intensity and the
/// result is pulled toward a luminance-preserved variant weighted by
/// `1 − intensity × 0.5`.
pub(crate) fn apply(
    target: &PixelBuffer,
    target_stats: &[Pixel],
    reference_stats: &[Pixel],
    intensity: f32,
    preserve: bool,
) -> PixelBuffer {
    let target_labs: Vec<_> = target_stats.iter().map(|&px| rgb_to_lab(px)).collect();
    let reference_labs: Vec<_> = reference_stats.iter().map(|&px| rgb_to_lab(px)).collect();
    let source = ChannelStats::of_lab(&target_labs);
    let destination = ChannelStats::of_lab(&reference_labs);

    let luminance_intensity = if preserve { intensity * 0.5 } else { intensity };

    let mut out = Vec::with_capacity(target.pixels.len());
    for &px in &target.pixels {
        if px.a < ALPHA_THRESHOLD {
            out.push(px);
            continue;
        }

        let lab = rgb_to_lab(px);
        let original = [lab.l, lab.a, lab.b];
        let mut matched = original;
        for c in 0..3 {
            if source.stddev[c] > 0.0 {
                matched[c] = (original[c] - source.mean[c]) / source.stddev[c]
                    * destination.stddev[c]
                    + destination.mean[c];
            }
        }

        let blended = Lab {
            l: original[0] + (matched[0] - original[0]) * luminance_intensity,
            a: original[1] + (matched[1] - original[1]) * intensity,
            b: original[2] + (matched[2] - original[2]) * intensity,
        };
        let mut result = lab_to_rgb(blended, px.a);
        if preserve {
            let kept = preserve_luminance(px, result);
            result = result.lerp(kept, 1.0 - intensity * 0.5);
        }
        out.push(result);
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
    use crate::transfer::opaque_pixels;

    fn buffer_of(pixels: Vec<Pixel>, width: u32) -> PixelBuffer {
        let height = pixels.len() as u32 / width;
        PixelBuffer::from_pixels(width, height, pixels).unwrap()
    }

    fn lab_stats(buffer: &PixelBuffer) -> ChannelStats {
        let labs: Vec<_> = buffer
            .pixels
            .iter()
            .filter(|px| px.a >= ALPHA_THRESHOLD)
            .map(|&px| rgb_to_lab(px))
            .collect();
        ChannelStats::of_lab(&labs)
    }

    #[test]
    fn test_full_intensity_converges_to_reference_statistics() {
        // Mid-range colors keep the statistic transfer inside the sRGB
        // gamut, so the match is exact up to conversion error.
        let target = buffer_of(
            vec![
                Pixel::opaque(0.45, 0.40, 0.42),
                Pixel::opaque(0.55, 0.50, 0.48),
                Pixel::opaque(0.50, 0.45, 0.50),
                Pixel::opaque(0.40, 0.55, 0.45),
            ],
            2,
        );
        let reference = buffer_of(
            vec![
                Pixel::opaque(0.55, 0.48, 0.35),
                Pixel::opaque(0.62, 0.55, 0.42),
                Pixel::opaque(0.58, 0.50, 0.38),
                Pixel::opaque(0.52, 0.44, 0.45),
            ],
            2,
        );

        let result = apply(
            &target,
            &opaque_pixels(&target.pixels),
            &opaque_pixels(&reference.pixels),
            1.0,
            false,
        );

        let got = lab_stats(&result);
        let want = lab_stats(&reference);
        for c in 0..3 {
            assert!(
                (got.mean[c] - want.mean[c]).abs() < 0.2,
                "channel {c} mean: {} vs {}",
                got.mean[c],
                want.mean[c]
            );
            assert!(
                (got.stddev[c] - want.stddev[c]).abs() < 0.2,
                "channel {c} stddev: {} vs {}",
                got.stddev[c],
                want.stddev[c]
            );
        }
    }

    #[test]
    fn test_zero_deviation_channel_passes_through() {
        // Constant target: every LAB channel has zero deviation, so the
        // match must not divide by zero and values pass through before
        // blending.
        let target = buffer_of(vec![Pixel::opaque(0.5, 0.5, 0.5); 4], 2);
        let reference = buffer_of(
            vec![
                Pixel::opaque(0.2, 0.6, 0.3),
                Pixel::opaque(0.8, 0.3, 0.5),
                Pixel::opaque(0.4, 0.5, 0.9),
                Pixel::opaque(0.6, 0.7, 0.1),
            ],
            2,
        );
        let result = apply(
            &target,
            &opaque_pixels(&target.pixels),
            &opaque_pixels(&reference.pixels),
            1.0,
            false,
        );
        for px in &result.pixels {
            assert!(px.r.is_finite() && px.g.is_finite() && px.b.is_finite());
            // All outputs identical since all inputs were identical
            assert_eq!(*px, result.pixels[0]);
        }
    }

    #[test]
    fn test_preserve_luminance_damps_lightness_shift() {
        let target = buffer_of(
            vec![
                Pixel::opaque(0.3, 0.3, 0.3),
                Pixel::opaque(0.4, 0.4, 0.4),
                Pixel::opaque(0.35, 0.35, 0.35),
                Pixel::opaque(0.45, 0.45, 0.45),
            ],
            2,
        );
        let reference = buffer_of(
            vec![
                Pixel::opaque(0.7, 0.7, 0.7),
                Pixel::opaque(0.9, 0.9, 0.9),
                Pixel::opaque(0.8, 0.8, 0.8),
                Pixel::opaque(0.85, 0.85, 0.85),
            ],
            2,
        );
        let stats_t = opaque_pixels(&target.pixels);
        let stats_r = opaque_pixels(&reference.pixels);

        let plain = apply(&target, &stats_t, &stats_r, 1.0, false);
        let kept = apply(&target, &stats_t, &stats_r, 1.0, true);

        let plain_l = lab_stats(&plain).mean[0];
        let kept_l = lab_stats(&kept).mean[0];
        let original_l = lab_stats(&target).mean[0];
        assert!(
            (kept_l - original_l).abs() < (plain_l - original_l).abs(),
            "preserved lightness should stay closer to the original: {kept_l} vs {plain_l} (original {original_l})"
        );
    }
}
