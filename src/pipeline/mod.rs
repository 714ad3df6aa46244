//! Top-level entry points: the video-generation run and static exports.

/// Static post and raw-art exports.
pub mod export;
/// The video-generation state machine.
pub mod generate;
