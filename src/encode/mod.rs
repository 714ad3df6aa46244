//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order; the production sink
//! streams them to the system `ffmpeg`.

/// `ffmpeg`-based sink and format negotiation.
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
