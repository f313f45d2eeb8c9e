//! Per-channel mean and population standard deviation.

use crate::color::space::Lab;
use crate::image::Pixel;

/// Mean and population standard deviation for three channels (RGB or
/// LAB). Lifetime is one algorithm invocation; empty input yields the
/// zero record, and consumers treat a zero deviation as "pass the value
/// through" rather than dividing by it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelStats {
    /// Per-channel mean.
    pub mean: [f32; 3],
    /// Per-channel population standard deviation.
    pub stddev: [f32; 3],
}

impl ChannelStats {
    /// Statistics over the R, G, B channels of a pixel set.
    pub fn of_rgb(pixels: &[Pixel]) -> Self {
        compute(pixels, |px| [px.r, px.g, px.b])
    }

    /// Statistics over the L, a, b channels of a LAB color set.
    pub fn of_lab(colors: &[Lab]) -> Self {
        compute(colors, |lab| [lab.l, lab.a, lab.b])
    }
}

/// Two passes in f64: mean first, then variance against that mean.
fn compute<T>(items: &[T], channels: impl Fn(&T) -> [f32; 3]) -> ChannelStats {
    if items.is_empty() {
        return ChannelStats::default();
    }
    let n = items.len() as f64;

    let mut sum = [0.0_f64; 3];
    for item in items {
        let c = channels(item);
        for i in 0..3 {
            sum[i] += c[i] as f64;
        }
    }
    let mean = [sum[0] / n, sum[1] / n, sum[2] / n];

    let mut variance = [0.0_f64; 3];
    for item in items {
        let c = channels(item);
        for i in 0..3 {
            let d = c[i] as f64 - mean[i];
            variance[i] += d * d;
        }
    }

    ChannelStats {
        mean: [mean[0] as f32, mean[1] as f32, mean[2] as f32],
        stddev: [
            (variance[0] / n).sqrt() as f32,
            (variance[1] / n).sqrt() as f32,
            (variance[2] / n).sqrt() as f32,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_empty_input_yields_zero_record() {
        let stats = ChannelStats::of_rgb(&[]);
        assert_eq!(stats, ChannelStats::default());
    }

    #[test]
    fn test_constant_input_has_zero_deviation() {
        let pixels = vec![Pixel::opaque(0.25, 0.5, 0.75); 64];
        let stats = ChannelStats::of_rgb(&pixels);
        assert!((stats.mean[0] - 0.25).abs() < EPSILON);
        assert!((stats.mean[1] - 0.5).abs() < EPSILON);
        assert!((stats.mean[2] - 0.75).abs() < EPSILON);
        for c in 0..3 {
            assert_eq!(stats.stddev[c], 0.0, "channel {c} deviation");
        }
    }

    #[test]
    fn test_two_point_population_deviation() {
        // Population stddev of {0, 1} is 0.5
        let pixels = [Pixel::opaque(0.0, 0.0, 0.0), Pixel::opaque(1.0, 1.0, 1.0)];
        let stats = ChannelStats::of_rgb(&pixels);
        for c in 0..3 {
            assert!((stats.mean[c] - 0.5).abs() < EPSILON);
            assert!((stats.stddev[c] - 0.5).abs() < EPSILON);
        }
    }

    #[test]
    fn test_lab_stats_use_lab_channels() {
        let colors = [
            Lab { l: 40.0, a: -10.0, b: 5.0 },
            Lab { l: 60.0, a: 10.0, b: 15.0 },
        ];
        let stats = ChannelStats::of_lab(&colors);
        assert!((stats.mean[0] - 50.0).abs() < EPSILON);
        assert!((stats.mean[1] - 0.0).abs() < EPSILON);
        assert!((stats.mean[2] - 10.0).abs() < EPSILON);
        assert!((stats.stddev[0] - 10.0).abs() < EPSILON);
    }
}
