//! Error taxonomy for the recoloring core.
//!
//! Recoverable degeneracies stay local — zero-area UV triangles are
//! skipped, zero standard deviations pass values through. These variants
//! cover the cases a caller must fix before an operation can apply.

use thiserror::Error;

/// Failure cases surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A buffer, mask, or parameter does not satisfy the operation's
    /// shape contract (`len == width × height`, matching dimensions,
    /// positive radius, valid UV channel index).
    #[error("input shape does not satisfy the operation's contract")]
    InvalidInput,

    /// A usage mask selected zero texels, so no reference palette can be
    /// built from it.
    #[error("usage mask selects no texels to build a reference from")]
    NoUsableReferenceArea,

    /// Raw pixel data could not be interpreted as interleaved RGBA f32.
    #[error("raw pixel data is not interleaved RGBA f32")]
    UnreadableSource,
}
