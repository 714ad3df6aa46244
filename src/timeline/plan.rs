use crate::assets::decode::AudioPcm;
use crate::foundation::core::Fps;
use crate::foundation::error::{EracastError, EracastResult};
use crate::render::frame::RenderParams;

/// Seconds of fade-in at the start of every slide; narration starts when
/// the fade completes.
pub const FADE_IN_SEC: f64 = 1.0;
/// Seconds of fade-out at the end of every slide.
pub const FADE_OUT_SEC: f64 = 0.5;
/// Extra zoom accumulated across a slide: scale runs 1.0 to 1.08.
pub const ZOOM_SPAN: f64 = 0.08;

/// One slide's span on the output timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineEntry {
    /// Index into the deck.
    pub slide: usize,
    /// Start of the span in seconds.
    pub start_sec: f64,
    /// Span length: narration duration plus both fades.
    pub duration_sec: f64,
    /// First output frame of the span.
    pub start_frame: u64,
    /// Number of output frames; `ceil(duration_sec * fps)`.
    pub frame_count: u64,
}

impl TimelineEntry {
    /// Fade alpha for a frame of this span, ramped over frame indices.
    ///
    /// 0 at the first frame, 1.0 once the fade-in completes, 0 again at
    /// the last frame.
    pub fn opacity_for_frame(&self, frame: u64, fps: Fps) -> f64 {
        debug_assert!(frame < self.frame_count);
        if self.frame_count <= 1 {
            return 0.0;
        }
        let up = fps.frames_to_secs(frame) / FADE_IN_SEC;
        let down = fps.frames_to_secs(self.frame_count - 1 - frame) / FADE_OUT_SEC;
        up.min(down).clamp(0.0, 1.0)
    }

    /// Zoom factor for a frame of this span: linear 1.0 to 1.0 + span.
    pub fn scale_for_frame(&self, frame: u64) -> f64 {
        if self.frame_count <= 1 {
            return 1.0;
        }
        let progress = frame as f64 / (self.frame_count - 1) as f64;
        1.0 + progress * ZOOM_SPAN
    }

    /// Both animation parameters for a frame of this span.
    pub fn params_for_frame(&self, frame: u64, fps: Fps) -> RenderParams {
        RenderParams {
            scale: self.scale_for_frame(frame),
            opacity: self.opacity_for_frame(frame, fps),
        }
    }
}

/// Build the run timeline: one entry per slide, back to back, durations
/// derived from the narration clips.
pub fn build_timeline(narrations: &[AudioPcm], fps: Fps) -> EracastResult<Vec<TimelineEntry>> {
    if narrations.is_empty() {
        return Err(EracastError::validation(
            "timeline needs at least one narrated slide",
        ));
    }
    let mut entries = Vec::with_capacity(narrations.len());
    let mut start_sec = 0.0;
    let mut start_frame = 0u64;
    for (slide, narration) in narrations.iter().enumerate() {
        let duration_sec = narration.duration_secs() + FADE_IN_SEC + FADE_OUT_SEC;
        let frame_count = fps.secs_to_frames_ceil(duration_sec);
        entries.push(TimelineEntry {
            slide,
            start_sec,
            duration_sec,
            start_frame,
            frame_count,
        });
        start_sec += duration_sec;
        start_frame += frame_count;
    }
    Ok(entries)
}

/// Total frame count of a timeline.
pub fn total_frames(timeline: &[TimelineEntry]) -> u64 {
    timeline.iter().map(|e| e.frame_count).sum()
}

/// Total duration of a timeline in seconds.
pub fn total_duration_secs(timeline: &[TimelineEntry]) -> f64 {
    timeline.iter().map(|e| e.duration_sec).sum()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/plan.rs"]
mod tests;
