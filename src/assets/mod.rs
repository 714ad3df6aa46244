//! Asset decoding and run-scoped preparation.
//!
//! All external IO is front-loaded here; renderers and the mixer only see
//! decoded buffers.

/// Image, narration and music decoding.
pub mod decode;
/// Whole-deck asset preparation.
pub mod loader;
