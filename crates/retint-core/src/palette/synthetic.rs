//! Synthetic reference construction.
//!
//! Fills mesh-unused texels with draws from the dominant palette of the
//! used area, so statistics computed downstream reflect only image
//! content the mesh actually samples.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Error;
use crate::image::PixelBuffer;
use crate::palette::kmeans;
use crate::uv::UvUsageMask;

/// Iterations used when clustering the used-area pixels.
const ITERATIONS: usize = 10;

/// Build a reference buffer where used texels keep their original value
/// and unused texels become weighted-random draws from the used area's
/// dominant palette (cluster population is the weight, so the most
/// dominant color is drawn most often).
///
/// `k == 0` is [`Error::InvalidInput`]; a mask selecting zero texels is
/// [`Error::NoUsableReferenceArea`].
pub fn synthetic_reference(
    texture: &PixelBuffer,
    mask: &UvUsageMask,
    k: usize,
    seed: u64,
) -> Result<PixelBuffer, Error> {
    if k == 0 {
        return Err(Error::InvalidInput);
    }
    let used_pixels = mask.filter(texture)?;
    if used_pixels.is_empty() {
        return Err(Error::NoUsableReferenceArea);
    }

    let clusters = kmeans::clusters(&used_pixels, k, ITERATIONS, seed);
    let total: usize = clusters.iter().map(|c| c.population).sum();

    tracing::debug!(
        "synthetic reference: {} used texels, {} clusters, filling {} texels",
        used_pixels.len(),
        clusters.len(),
        texture.pixels.len() - used_pixels.len()
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels = texture.pixels.clone();
    for (px, &used) in pixels.iter_mut().zip(&mask.used) {
        if used {
            continue;
        }
        let mut draw = rng.random_range(0..total);
        for cluster in &clusters {
            if draw < cluster.population {
                *px = cluster.centroid;
                break;
            }
            draw -= cluster.population;
        }
    }

    Ok(PixelBuffer {
        width: texture.width,
        height: texture.height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Pixel;

    fn half_used_mask(width: u32, height: u32) -> UvUsageMask {
        let mut mask = UvUsageMask::empty(width, height);
        let half = mask.used.len() / 2;
        for flag in mask.used.iter_mut().take(half) {
            *flag = true;
        }
        mask
    }

    #[test]
    fn test_used_texels_keep_their_original_value() {
        let texture = PixelBuffer::from_pixels(
            4,
            2,
            (0..8)
                .map(|i| Pixel::opaque(i as f32 / 8.0, 0.5, 0.5))
                .collect(),
        )
        .unwrap();
        let mask = half_used_mask(4, 2);
        let reference = synthetic_reference(&texture, &mask, 2, 42).unwrap();
        for i in 0..4 {
            assert_eq!(reference.pixels[i], texture.pixels[i], "used texel {i}");
        }
    }

    #[test]
    fn test_unused_texels_draw_from_the_used_palette() {
        // Constant used area: every cluster centroid equals that color,
        // so every filled texel must too.
        let color = Pixel::opaque(0.2, 0.7, 0.4);
        let mut pixels = vec![color; 4];
        pixels.extend(vec![Pixel::opaque(0.9, 0.9, 0.9); 4]);
        let texture = PixelBuffer::from_pixels(4, 2, pixels).unwrap();
        let mask = half_used_mask(4, 2);

        let reference = synthetic_reference(&texture, &mask, 3, 42).unwrap();
        for i in 4..8 {
            let px = reference.pixels[i];
            assert!(
                (px.r - color.r).abs() < 1e-4
                    && (px.g - color.g).abs() < 1e-4
                    && (px.b - color.b).abs() < 1e-4,
                "filled texel {i} should come from the used palette: {px:?}"
            );
            assert_eq!(px.a, 1.0);
        }
    }

    #[test]
    fn test_empty_mask_is_no_usable_reference_area() {
        let texture = PixelBuffer::new(4, 4);
        let mask = UvUsageMask::empty(4, 4);
        assert_eq!(
            synthetic_reference(&texture, &mask, 3, 42),
            Err(Error::NoUsableReferenceArea)
        );
    }

    #[test]
    fn test_zero_clusters_is_invalid_input() {
        let texture = PixelBuffer::new(2, 2);
        let mask = half_used_mask(2, 2);
        assert_eq!(
            synthetic_reference(&texture, &mask, 0, 42),
            Err(Error::InvalidInput)
        );
    }

    #[test]
    fn test_same_seed_reproduces_the_same_reference() {
        let texture = PixelBuffer::from_pixels(
            4,
            4,
            (0..16)
                .map(|i| Pixel::opaque((i % 4) as f32 / 4.0, (i % 3) as f32 / 3.0, 0.5))
                .collect(),
        )
        .unwrap();
        let mask = half_used_mask(4, 4);
        let first = synthetic_reference(&texture, &mask, 3, 99).unwrap();
        let second = synthetic_reference(&texture, &mask, 3, 99).unwrap();
        assert_eq!(first, second);
    }
}
