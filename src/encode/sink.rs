use std::path::PathBuf;

use crate::encode::ffmpeg::{FORMAT_PREFERENCE, VideoFormat};
use crate::foundation::core::{FrameIndex, FrameRgba, Fps};
use crate::foundation::error::{EracastError, EracastResult};

/// Configuration provided to a [`FrameSink`] at the start of a run.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Optional external raw PCM audio file input.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input configuration for sinks that mux audio.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Lifecycle: `negotiate` once (before any asset work), then `begin`, then
/// `push_frame` in strictly increasing `FrameIndex` order, then `end`.
/// `abort` may be called at any point, any number of times.
pub trait FrameSink: Send {
    /// Pick the best supported container/codec, or fail with
    /// [`EracastError::Unsupported`] before any work is done.
    fn negotiate(&mut self) -> EracastResult<VideoFormat>;
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> EracastResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> EracastResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> EracastResult<()>;
    /// Discard any in-flight output. Idempotent.
    fn abort(&mut self);
}

/// In-memory sink for tests and debugging.
#[derive(Debug)]
pub struct InMemorySink {
    format: Option<VideoFormat>,
    cfg: Option<SinkConfig>,
    aborted: bool,
    /// Frames in timeline order.
    pub(crate) frames: Vec<(FrameIndex, FrameRgba)>,
}

impl InMemorySink {
    /// Sink that negotiates the last-resort format and keeps every frame.
    pub fn new() -> Self {
        Self {
            format: Some(FORMAT_PREFERENCE[FORMAT_PREFERENCE.len() - 1]),
            cfg: None,
            aborted: false,
            frames: Vec::new(),
        }
    }

    /// Sink whose negotiation always fails, for unsupported-environment
    /// tests.
    pub fn unsupported() -> Self {
        Self {
            format: None,
            cfg: None,
            aborted: false,
            frames: Vec::new(),
        }
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgba)] {
        &self.frames
    }

    /// True once `abort` has been called.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for InMemorySink {
    fn negotiate(&mut self) -> EracastResult<VideoFormat> {
        self.format
            .ok_or_else(|| EracastError::unsupported("no recordable format available"))
    }

    fn begin(&mut self, cfg: SinkConfig) -> EracastResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> EracastResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> EracastResult<()> {
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}
