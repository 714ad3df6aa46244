//! Shared primitives: errors, geometry, frames, small math helpers.

/// Frame, canvas and color types plus frame-rate arithmetic.
pub mod core;
/// Error taxonomy and result alias.
pub mod error;
pub(crate) mod math;
