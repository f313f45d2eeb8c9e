//! Incremental preview cache for the balance transform.
//!
//! A caller-owned, single-slot handle. When only the post-process knobs
//! change between calls, the cached pre-post-process base is re-adjusted
//! instead of recomputing the whole per-pixel transform, which is
//! observably identical to a full recompute. Anything else in the key
//! evicts the slot.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::balance::adjust::post_process_buffer;
use crate::balance::{BalanceConfig, apply_base};
use crate::error::Error;
use crate::image::{Pixel, PixelBuffer};

/// Intensity drift the cache still treats as "unchanged".
const INTENSITY_TOLERANCE: f32 = 0.01;

/// Tolerance for the remaining float fields of the key.
const KNOB_TOLERANCE: f32 = 1e-6;

/// What a repeat call needs to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// Something in the key changed; run the whole transform.
    FullRecompute,
    /// Only brightness/contrast/gamma/transparency changed; re-adjust
    /// the cached base.
    PostProcessOnly,
    /// Nothing changed; return the cached result.
    NoOp,
}

struct CacheEntry {
    source: u64,
    selection: Option<u64>,
    from: Pixel,
    to: Pixel,
    config: BalanceConfig,
    base: PixelBuffer,
    result: PixelBuffer,
}

/// Single-slot preview cache. Owned by the caller; independent
/// pipelines each hold their own handle, so there is no shared global
/// state to synchronize.
#[derive(Default)]
pub struct BalanceCache {
    entry: Option<CacheEntry>,
}

impl BalanceCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached slot.
    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Compare a prospective call against the cached key.
    pub fn classify(
        &self,
        target: &PixelBuffer,
        from: Pixel,
        to: Pixel,
        config: &BalanceConfig,
        selection: Option<&[bool]>,
    ) -> CacheDecision {
        let Some(entry) = &self.entry else {
            return CacheDecision::FullRecompute;
        };
        let cached = &entry.config;

        if entry.source != fingerprint(target)
            || entry.selection != selection_fingerprint(selection)
            || entry.from != from
            || entry.to != to
            || cached.mode != config.mode
            || (cached.intensity - config.intensity).abs() > INTENSITY_TOLERANCE
            || (cached.selection_radius - config.selection_radius).abs() > KNOB_TOLERANCE
            || (cached.min_similarity - config.min_similarity).abs() > KNOB_TOLERANCE
        {
            return CacheDecision::FullRecompute;
        }

        if (cached.brightness - config.brightness).abs() <= KNOB_TOLERANCE
            && (cached.contrast - config.contrast).abs() <= KNOB_TOLERANCE
            && (cached.gamma - config.gamma).abs() <= KNOB_TOLERANCE
            && (cached.transparency - config.transparency).abs() <= KNOB_TOLERANCE
        {
            CacheDecision::NoOp
        } else {
            CacheDecision::PostProcessOnly
        }
    }

    /// [`apply_difference`](crate::balance::apply_difference) through the
    /// cache.
    pub fn apply(
        &mut self,
        target: &PixelBuffer,
        from: Pixel,
        to: Pixel,
        config: &BalanceConfig,
        selection: Option<&[bool]>,
    ) -> Result<PixelBuffer, Error> {
        let decision = self.classify(target, from, to, config, selection);
        tracing::debug!("balance cache decision: {:?}", decision);

        if let Some(entry) = self.entry.as_mut() {
            match decision {
                CacheDecision::NoOp => return Ok(entry.result.clone()),
                CacheDecision::PostProcessOnly => {
                    let result = post_process_buffer(&entry.base, config, selection);
                    // Keep the key fields the base was computed with;
                    // only the post knobs advance.
                    entry.config.brightness = config.brightness;
                    entry.config.contrast = config.contrast;
                    entry.config.gamma = config.gamma;
                    entry.config.transparency = config.transparency;
                    entry.result = result.clone();
                    return Ok(result);
                }
                CacheDecision::FullRecompute => {}
            }
        }

        let base = apply_base(target, from, to, config, selection)?;
        let result = post_process_buffer(&base, config, selection);
        self.entry = Some(CacheEntry {
            source: fingerprint(target),
            selection: selection_fingerprint(selection),
            from,
            to,
            config: *config,
            base,
            result: result.clone(),
        });
        Ok(result)
    }
}

/// Content hash standing in for texture identity.
fn fingerprint(buffer: &PixelBuffer) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write_u32(buffer.width);
    hasher.write_u32(buffer.height);
    hasher.write(bytemuck::cast_slice(&buffer.pixels));
    hasher.finish()
}

fn selection_fingerprint(selection: Option<&[bool]>) -> Option<u64> {
    selection.map(|mask| {
        let mut hasher = DefaultHasher::new();
        mask.hash(&mut hasher);
        hasher.finish()
    })
}
