//! Post-process adjustments applied after a difference transform.
//!
//! Every knob is multiplicative with identity 1.0, so the post-process
//! stage composes cleanly and the preview cache can re-run it on a
//! cached base instead of recomputing the whole transform.

use crate::balance::BalanceConfig;
use crate::image::{Pixel, PixelBuffer};

/// Knob values this close to 1.0 are treated as identity.
const IDENTITY_EPSILON: f32 = 1e-7;

/// Apply brightness, contrast, gamma, and transparency to one pixel.
///
/// ```text
/// brightness:   c × brightness
/// contrast:     (c − 0.5) × contrast + 0.5
/// gamma:        max(c, 0) ^ (1 / gamma)
/// transparency: a × transparency
/// ```
///
/// Channels are clamped to `[0, 1]` at the end. All knobs at 1.0 leave
/// the color untouched apart from that clamp.
pub fn post_process(px: Pixel, config: &BalanceConfig) -> Pixel {
    let mut channels = [px.r, px.g, px.b];

    if (config.brightness - 1.0).abs() > IDENTITY_EPSILON {
        for c in &mut channels {
            *c *= config.brightness;
        }
    }
    if (config.contrast - 1.0).abs() > IDENTITY_EPSILON {
        for c in &mut channels {
            *c = (*c - 0.5) * config.contrast + 0.5;
        }
    }
    if (config.gamma - 1.0).abs() > IDENTITY_EPSILON && config.gamma > 0.0 {
        for c in &mut channels {
            *c = c.max(0.0).powf(1.0 / config.gamma);
        }
    }

    let mut alpha = px.a;
    if (config.transparency - 1.0).abs() > IDENTITY_EPSILON {
        alpha *= config.transparency;
    }

    Pixel::new(
        channels[0].clamp(0.0, 1.0),
        channels[1].clamp(0.0, 1.0),
        channels[2].clamp(0.0, 1.0),
        alpha.clamp(0.0, 1.0),
    )
}

/// Post-process a whole buffer, leaving selection-excluded pixels
/// bit-exact.
pub(crate) fn post_process_buffer(
    buffer: &PixelBuffer,
    config: &BalanceConfig,
    selection: Option<&[bool]>,
) -> PixelBuffer {
    let pixels = buffer
        .pixels
        .iter()
        .enumerate()
        .map(|(i, &px)| {
            if let Some(mask) = selection
                && !mask[i]
            {
                return px;
            }
            post_process(px, config)
        })
        .collect();

    PixelBuffer {
        width: buffer.width,
        height: buffer.height,
        pixels,
    }
}
