//! Stateless color space conversions and perceptual distances.
//!
//! RGB ↔ LAB goes through a CIE XYZ intermediate with the fixed D65
//! sRGB matrices; RGB ↔ HSV is the standard max/min decomposition.
//! LAB and HSV values are recomputed on demand, never cached.
//!
//! # Reference
//! - IEC 61966-2-1 — sRGB transfer curve
//! - Lindbloom, Bruce J. — sRGB/XYZ matrices and CIE L*a*b* formulas

use crate::image::Pixel;

/// A CIE L*a*b* color. `l` is 0–100, `a`/`b` roughly −128 to +128.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    /// Lightness.
    pub l: f32,
    /// Green–red chroma axis.
    pub a: f32,
    /// Blue–yellow chroma axis.
    pub b: f32,
}

/// An HSV color. `h` is degrees in `[0, 360)`, `s`/`v` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Hue angle in degrees.
    pub h: f32,
    /// Saturation.
    pub s: f32,
    /// Value (brightness).
    pub v: f32,
}

/// D65 reference white.
const D65: [f32; 3] = [0.95047, 1.0, 1.08883];

/// sRGB to XYZ matrix (D65).
const SRGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// XYZ to sRGB matrix (D65).
const XYZ_TO_SRGB: [[f32; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

/// Maximum Euclidean distance between two RGB colors in the unit cube
/// (black to white), √3.
pub const MAX_RGB_DISTANCE: f32 = 1.732_050_8;

/// Convert one sRGB-encoded channel to linear light.
///
/// ```text
/// V <= 0.04045 → V / 12.92
/// V >  0.04045 → ((V + 0.055) / 1.055) ^ 2.4
/// ```
pub fn srgb_to_linear(encoded: f32) -> f32 {
    if encoded <= 0.04045 {
        encoded / 12.92
    } else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert one linear-light channel to its sRGB encoding.
pub fn linear_to_srgb(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// LAB forward companding function f(t).
fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    const DELTA_CUBED: f32 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// Inverse of [`lab_f`].
fn lab_f_inv(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;

    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

/// Convert an sRGB-encoded pixel to CIE L*a*b* (D65).
///
/// Channels are linearized, taken to XYZ through the D65 matrix, then
/// companded to LAB. Alpha does not participate.
pub fn rgb_to_lab(px: Pixel) -> Lab {
    let r = srgb_to_linear(px.r.max(0.0));
    let g = srgb_to_linear(px.g.max(0.0));
    let b = srgb_to_linear(px.b.max(0.0));

    let m = &SRGB_TO_XYZ;
    let x = m[0][0] * r + m[0][1] * g + m[0][2] * b;
    let y = m[1][0] * r + m[1][1] * g + m[1][2] * b;
    let z = m[2][0] * r + m[2][1] * g + m[2][2] * b;

    let fx = lab_f(x / D65[0]);
    let fy = lab_f(y / D65[1]);
    let fz = lab_f(z / D65[2]);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Convert a CIE L*a*b* color back to an sRGB-encoded pixel with the
/// given alpha. Out-of-gamut results are clamped to `[0, 1]`.
pub fn lab_to_rgb(lab: Lab, alpha: f32) -> Pixel {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = lab.a / 500.0 + fy;
    let fz = fy - lab.b / 200.0;

    let x = D65[0] * lab_f_inv(fx);
    let y = D65[1] * lab_f_inv(fy);
    let z = D65[2] * lab_f_inv(fz);

    let m = &XYZ_TO_SRGB;
    let r = m[0][0] * x + m[0][1] * y + m[0][2] * z;
    let g = m[1][0] * x + m[1][1] * y + m[1][2] * z;
    let b = m[2][0] * x + m[2][1] * y + m[2][2] * z;

    Pixel {
        r: linear_to_srgb(r.max(0.0)).clamp(0.0, 1.0),
        g: linear_to_srgb(g.max(0.0)).clamp(0.0, 1.0),
        b: linear_to_srgb(b.max(0.0)).clamp(0.0, 1.0),
        a: alpha,
    }
}

/// Decompose a pixel into hue/saturation/value.
pub fn rgb_to_hsv(px: Pixel) -> Hsv {
    let max = px.r.max(px.g).max(px.b);
    let min = px.r.min(px.g).min(px.b);
    let delta = max - min;

    let h = if delta <= f32::EPSILON {
        0.0
    } else if max == px.r {
        60.0 * ((px.g - px.b) / delta)
    } else if max == px.g {
        60.0 * ((px.b - px.r) / delta + 2.0)
    } else {
        60.0 * ((px.r - px.g) / delta + 4.0)
    };

    Hsv {
        h: h.rem_euclid(360.0),
        s: if max <= 0.0 { 0.0 } else { delta / max },
        v: max,
    }
}

/// Recompose an HSV color into a pixel with the given alpha.
pub fn hsv_to_rgb(hsv: Hsv, alpha: f32) -> Pixel {
    let h = hsv.h.rem_euclid(360.0);
    let c = hsv.v * hsv.s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = hsv.v - c;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Pixel::new(r + m, g + m, b + m, alpha)
}

/// CIE76 Delta-E — Euclidean distance in LAB space.
pub fn delta_e(a: Lab, b: Lab) -> f32 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Plain Euclidean distance in RGB space. Cheaper and less perceptual
/// than [`delta_e`]; maximum value is [`MAX_RGB_DISTANCE`].
pub fn rgb_distance(a: Pixel, b: Pixel) -> f32 {
    let dr = a.r - b.r;
    let dg = a.g - b.g;
    let db = a.b - b.b;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// A color with `candidate`'s chroma but `original`'s lightness.
///
/// Swaps the LAB L channel, keeping the candidate's a/b axes and alpha.
/// Used as a blend target rather than a hard override.
pub fn preserve_luminance(original: Pixel, candidate: Pixel) -> Pixel {
    let original_lab = rgb_to_lab(original);
    let candidate_lab = rgb_to_lab(candidate);
    lab_to_rgb(
        Lab {
            l: original_lab.l,
            a: candidate_lab.a,
            b: candidate_lab.b,
        },
        candidate.a,
    )
}
