//! Per-channel RGB color transfer and the adaptive composition.

use crate::color::space::preserve_luminance;
use crate::color::stats::ChannelStats;
use crate::image::{Pixel, PixelBuffer};
use crate::transfer::{ALPHA_THRESHOLD, histogram};

/// The same normalize/rescale statistic transfer as histogram matching,
/// applied to R, G, B directly instead of LAB. Each channel is clamped
/// to `[0, 1]` independently, then the candidate is blended with the
/// original by `intensity`.
pub(crate) fn apply(
    target: &PixelBuffer,
    target_stats: &[Pixel],
    reference_stats: &[Pixel],
    intensity: f32,
    preserve: bool,
) -> PixelBuffer {
    let source = ChannelStats::of_rgb(target_stats);
    let destination = ChannelStats::of_rgb(reference_stats);

    let mut out = Vec::with_capacity(target.pixels.len());
    for &px in &target.pixels {
        if px.a < ALPHA_THRESHOLD {
            out.push(px);
            continue;
        }

        let mut channels = [px.r, px.g, px.b];
        for c in 0..3 {
            if source.stddev[c] > 0.0 {
                channels[c] = ((channels[c] - source.mean[c]) / source.stddev[c]
                    * destination.stddev[c]
                    + destination.mean[c])
                    .clamp(0.0, 1.0);
            }
        }

        let candidate = Pixel::new(channels[0], channels[1], channels[2], px.a);
        let mut result = px.lerp(candidate, intensity);
        if preserve {
            result = preserve_luminance(px, result);
        }
        out.push(result);
    }

    PixelBuffer {
        width: target.width,
        height: target.height,
        pixels: out,
    }
}

/// Fixed composition: histogram matching at `0.7 × intensity` and RGB
/// color transfer at `0.3 × intensity`, blended 50/50 per pixel. The
/// split is not tunable.
pub(crate) fn apply_adaptive(
    target: &PixelBuffer,
    target_stats: &[Pixel],
    reference_stats: &[Pixel],
    intensity: f32,
    preserve: bool,
) -> PixelBuffer {
    let matched = histogram::apply(
        target,
        target_stats,
        reference_stats,
        intensity * 0.7,
        preserve,
    );
    let transferred = apply(
        target,
        target_stats,
        reference_stats,
        intensity * 0.3,
        preserve,
    );

    let pixels = matched
        .pixels
        .iter()
        .zip(&transferred.pixels)
        .map(|(&a, &b)| a.lerp(b, 0.5))
        .collect();

    PixelBuffer {
        width: target.width,
        height: target.height,
        pixels,
    }
}
