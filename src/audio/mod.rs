//! Offline audio mixing: narration and looping music beds to one stereo
//! PCM buffer.

/// Mix planning and rendering.
pub mod mix;
