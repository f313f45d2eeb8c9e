//! K-means clustering over pixel colors.
//!
//! Randomness is always explicitly seeded — callers wanting a one-shot
//! non-deterministic palette pass their own entropy as the seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::space::rgb_distance;
use crate::image::Pixel;

/// Iterations for the standard extraction.
const ITERATIONS: usize = 10;

/// Iterations for the fast extraction.
const FAST_ITERATIONS: usize = 5;

/// The fast extraction samples every Nth pixel.
const FAST_STRIDE: usize = 10;

/// A converged cluster: its centroid color and how many pixels it
/// absorbed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cluster {
    /// Mean color of the cluster's pixels, alpha fixed to 1.
    pub centroid: Pixel,
    /// Number of pixels assigned in the final iteration.
    pub population: usize,
}

/// Extract the `k` dominant colors of a pixel set, most dominant first.
///
/// Centroids are initialized by uniform random sampling from the input
/// and refined over a fixed number of iterations: every pixel joins its
/// nearest centroid by RGB Euclidean distance, and each non-empty
/// cluster's centroid becomes its mean color with alpha fixed to 1.
/// Empty clusters keep their previous centroid, so exactly `k` colors
/// come back (possibly duplicated if clusters collapse). `k == 0` or an
/// empty input yields an empty result.
pub fn dominant_colors(pixels: &[Pixel], k: usize, seed: u64) -> Vec<Pixel> {
    clusters(pixels, k, ITERATIONS, seed)
        .into_iter()
        .map(|cluster| cluster.centroid)
        .collect()
}

/// Faster, rougher variant: fewer iterations over every 10th pixel.
pub fn dominant_colors_fast(pixels: &[Pixel], k: usize, seed: u64) -> Vec<Pixel> {
    let sampled: Vec<Pixel> = pixels.iter().copied().step_by(FAST_STRIDE).collect();
    clusters(&sampled, k, FAST_ITERATIONS, seed)
        .into_iter()
        .map(|cluster| cluster.centroid)
        .collect()
}

/// Run k-means and return the clusters sorted by population,
/// descending. Ties keep their centroid order.
pub(crate) fn clusters(
    pixels: &[Pixel],
    k: usize,
    iterations: usize,
    seed: u64,
) -> Vec<Cluster> {
    if k == 0 || pixels.is_empty() {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    // Alpha is normalized at initialization so clusters that never
    // absorb a pixel still report an opaque centroid.
    let mut centroids: Vec<Pixel> = (0..k)
        .map(|_| {
            let px = pixels[rng.random_range(0..pixels.len())];
            Pixel::opaque(px.r, px.g, px.b)
        })
        .collect();
    let mut assignments = vec![0_usize; pixels.len()];
    let mut populations = vec![0_usize; k];

    for _ in 0..iterations {
        for (slot, px) in assignments.iter_mut().zip(pixels) {
            let mut best = 0;
            let mut best_distance = f32::INFINITY;
            for (j, centroid) in centroids.iter().enumerate() {
                let distance = rgb_distance(*px, *centroid);
                if distance < best_distance {
                    best_distance = distance;
                    best = j;
                }
            }
            *slot = best;
        }

        let mut sums = vec![[0.0_f64; 3]; k];
        populations = vec![0_usize; k];
        for (&cluster, px) in assignments.iter().zip(pixels) {
            sums[cluster][0] += px.r as f64;
            sums[cluster][1] += px.g as f64;
            sums[cluster][2] += px.b as f64;
            populations[cluster] += 1;
        }

        for j in 0..k {
            if populations[j] > 0 {
                let n = populations[j] as f64;
                centroids[j] = Pixel::opaque(
                    (sums[j][0] / n) as f32,
                    (sums[j][1] / n) as f32,
                    (sums[j][2] / n) as f32,
                );
            }
            // Empty clusters keep their previous centroid
        }
    }

    let mut out: Vec<Cluster> = centroids
        .into_iter()
        .zip(populations)
        .map(|(centroid, population)| Cluster {
            centroid,
            population,
        })
        .collect();
    out.sort_by(|a, b| b.population.cmp(&a.population));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_zero_k_or_empty_input_yields_empty_result() {
        let pixels = vec![Pixel::opaque(0.5, 0.5, 0.5); 16];
        assert!(dominant_colors(&pixels, 0, 42).is_empty());
        assert!(dominant_colors(&[], 4, 42).is_empty());
    }

    #[test]
    fn test_returns_exactly_k_colors() {
        let pixels: Vec<Pixel> = (0..100)
            .map(|i| Pixel::opaque(i as f32 / 100.0, 0.5, 1.0 - i as f32 / 100.0))
            .collect();
        for k in [1, 3, 5, 8] {
            assert_eq!(dominant_colors(&pixels, k, 42).len(), k);
        }
        // More clusters than pixels still returns exactly k
        let few = vec![Pixel::opaque(0.2, 0.4, 0.6); 3];
        assert_eq!(dominant_colors(&few, 7, 42).len(), 7);
    }

    #[test]
    fn test_constant_input_collapses_to_the_input_color() {
        let color = Pixel::new(0.3, 0.6, 0.9, 0.5);
        let pixels = vec![color; 50];
        for centroid in dominant_colors(&pixels, 3, 42) {
            assert!((centroid.r - 0.3).abs() < EPSILON);
            assert!((centroid.g - 0.6).abs() < EPSILON);
            assert!((centroid.b - 0.9).abs() < EPSILON);
            assert_eq!(centroid.a, 1.0, "centroid alpha is fixed to 1");
        }
    }

    #[test]
    fn test_two_well_separated_colors_sort_largest_first() {
        // Random init may sample the same color twice and collapse both
        // clusters; some seed in a small batch always separates them.
        let mut pixels = vec![Pixel::opaque(0.95, 0.05, 0.05); 60];
        pixels.extend(vec![Pixel::opaque(0.05, 0.05, 0.95); 40]);

        let mut separated = false;
        for seed in 0..20 {
            let colors = dominant_colors(&pixels, 2, seed);
            assert_eq!(colors.len(), 2);
            if rgb_distance(colors[0], colors[1]) > 0.5 {
                // Most dominant first: the red cluster is larger
                assert!(
                    colors[0].r > colors[0].b,
                    "largest cluster should lead: {colors:?}"
                );
                assert!(colors[1].b > colors[1].r);
                separated = true;
                break;
            }
        }
        assert!(separated, "no seed separated two obvious clusters");
    }

    #[test]
    fn test_same_seed_reproduces_the_same_palette() {
        let pixels: Vec<Pixel> = (0..200)
            .map(|i| {
                Pixel::opaque(
                    (i % 17) as f32 / 17.0,
                    (i % 5) as f32 / 5.0,
                    (i % 11) as f32 / 11.0,
                )
            })
            .collect();
        let first = dominant_colors(&pixels, 4, 1234);
        let second = dominant_colors(&pixels, 4, 1234);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fast_variant_returns_k_colors_from_subsampled_input() {
        let pixels: Vec<Pixel> = (0..500)
            .map(|i| Pixel::opaque((i % 7) as f32 / 7.0, 0.4, 0.6))
            .collect();
        assert_eq!(dominant_colors_fast(&pixels, 3, 42).len(), 3);
    }
}
