use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::assets::decode::PreparedImage;
use crate::assets::loader::{MIX_SAMPLE_RATE, PreparedSlideAssets};
use crate::audio::mix::{build_mix_plan, mix, write_mix_to_f32le_file};
use crate::content::service::{SpeechSynthesizer, TrackFetcher};
use crate::content::variation::{Slide, SlideDeck};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoFormat};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex, FrameRgba, Fps};
use crate::foundation::error::{EracastError, EracastResult};
use crate::render::frame::{RenderParams, render_frame};
use crate::render::text::FontSet;
use crate::render::watermark::BrandMark;
use crate::timeline::plan::{build_timeline, total_duration_secs, total_frames};

/// Phase of a video-generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RunState {
    /// No run started.
    Idle,
    /// Synthesizing narration, fetching beds, decoding images.
    Loading,
    /// Composing frames and pushing them to the sink.
    Rendering,
    /// Waiting for the muxed output to materialize.
    Finalizing,
    /// Output is ready.
    Done,
    /// The run ended with an error; intermediates were discarded.
    Failed,
}

/// Shared cancellation flag for an in-flight run.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tunables of a generation run.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Output canvas; the vertical reel by default.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Directory for the scratch PCM file.
    pub scratch_dir: PathBuf,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            canvas: Canvas::REEL,
            fps: Fps { num: 30, den: 1 },
            scratch_dir: std::env::temp_dir(),
        }
    }
}

/// Renders one composed frame for a slide.
///
/// Abstracted so pipeline tests can run without font bytes.
pub trait SlideFrameRenderer {
    /// Compose the frame for `slide` under the given animation parameters.
    fn render(
        &mut self,
        canvas: Canvas,
        slide: &Slide,
        image: Option<&PreparedImage>,
        params: RenderParams,
    ) -> EracastResult<FrameRgba>;
}

/// The production renderer: full slide layout and CPU rasterization.
pub struct CanvasRenderer {
    fonts: FontSet,
    brand: BrandMark,
}

impl CanvasRenderer {
    /// Build from parsed fonts and a brand mark.
    pub fn new(fonts: FontSet, brand: BrandMark) -> Self {
        Self { fonts, brand }
    }
}

impl SlideFrameRenderer for CanvasRenderer {
    fn render(
        &mut self,
        canvas: Canvas,
        slide: &Slide,
        image: Option<&PreparedImage>,
        params: RenderParams,
    ) -> EracastResult<FrameRgba> {
        Ok(render_frame(
            canvas,
            slide,
            &self.fonts,
            image,
            params,
            &self.brand,
        ))
    }
}

/// The collaborators a run drives.
pub struct RunServices<'a> {
    /// Narration backend.
    pub speech: &'a mut dyn SpeechSynthesizer,
    /// Music bed fetcher.
    pub tracks: &'a mut dyn TrackFetcher,
    /// Frame renderer.
    pub renderer: &'a mut dyn SlideFrameRenderer,
    /// Output sink.
    pub sink: &'a mut dyn FrameSink,
}

/// Summary of a completed run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunReport {
    /// Negotiated container/codec.
    pub format: VideoFormat,
    /// Frames pushed to the sink.
    pub total_frames: u64,
    /// Timeline length in seconds.
    pub duration_secs: f64,
}

/// One video-generation run: the explicit state machine driving load, mix,
/// render and finalize.
pub struct VideoRun {
    state: RunState,
    cancel: CancelToken,
}

impl VideoRun {
    /// A fresh run in `Idle`.
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            cancel: CancelToken::new(),
        }
    }

    /// Current phase.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Token callers may use to abandon the run from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Drive the run to `Done` or `Failed`.
    ///
    /// `progress` receives short textual status updates. On any error the
    /// sink is aborted and the scratch PCM file is removed; no partial
    /// output is guaranteed valid.
    pub fn execute(
        &mut self,
        deck: &SlideDeck,
        services: &mut RunServices<'_>,
        options: &GenerateOptions,
        progress: &mut dyn FnMut(&str),
    ) -> EracastResult<RunReport> {
        let scratch = options
            .scratch_dir
            .join(format!("eracast-mix-{}.f32le", std::process::id()));
        match self.run_phases(deck, services, options, &scratch, progress) {
            Ok(report) => {
                self.state = RunState::Done;
                Ok(report)
            }
            Err(e) => {
                services.sink.abort();
                remove_scratch(&scratch);
                self.state = RunState::Failed;
                Err(e)
            }
        }
    }

    fn run_phases(
        &mut self,
        deck: &SlideDeck,
        services: &mut RunServices<'_>,
        options: &GenerateOptions,
        scratch: &Path,
        progress: &mut dyn FnMut(&str),
    ) -> EracastResult<RunReport> {
        deck.validate()?;
        let anchor = &deck.slides[deck.anchor_index()];
        if anchor.image.is_none() {
            return Err(EracastError::validation(
                "the anchor slide has no image; generate images before the video",
            ));
        }

        // Negotiate before any asset work so an unsupported environment
        // fails without rendering a single frame.
        let format = services.sink.negotiate()?;
        self.check_cancel()?;

        self.state = RunState::Loading;
        progress("Preparando narração e trilhas...");
        let assets =
            PreparedSlideAssets::prepare(deck, services.speech, services.tracks, progress)?;
        self.check_cancel()?;

        let timeline = build_timeline(&assets.narrations, options.fps)?;
        let frames_total = total_frames(&timeline);
        let duration_secs = total_duration_secs(&timeline);
        info!(
            slides = timeline.len(),
            frames = frames_total,
            secs = duration_secs,
            "timeline built"
        );

        progress("Mixando áudio...");
        let plan = build_mix_plan(&timeline, deck, &assets, options.fps)?;
        let samples = mix(&plan);
        write_mix_to_f32le_file(&samples, scratch)?;
        self.check_cancel()?;

        self.state = RunState::Rendering;
        services.sink.begin(SinkConfig {
            width: options.canvas.width,
            height: options.canvas.height,
            fps: options.fps,
            audio: Some(AudioInputConfig {
                path: scratch.to_path_buf(),
                sample_rate: MIX_SAMPLE_RATE,
                channels: 2,
            }),
        })?;

        for entry in &timeline {
            progress(&format!(
                "Gravando cena {} de {}...",
                entry.slide + 1,
                timeline.len()
            ));
            let slide = &deck.slides[entry.slide];
            let image = assets.images[entry.slide].as_ref();
            for frame in 0..entry.frame_count {
                self.check_cancel()?;
                let params = entry.params_for_frame(frame, options.fps);
                let composed = services.renderer.render(options.canvas, slide, image, params)?;
                services
                    .sink
                    .push_frame(FrameIndex(entry.start_frame + frame), &composed)?;
            }
            debug!(slide = entry.slide, frames = entry.frame_count, "scene rendered");
        }

        self.state = RunState::Finalizing;
        progress("Finalizando vídeo...");
        services.sink.end()?;
        remove_scratch(scratch);

        Ok(RunReport {
            format,
            total_frames: frames_total,
            duration_secs,
        })
    }

    fn check_cancel(&self) -> EracastResult<()> {
        if self.cancel.is_cancelled() {
            return Err(EracastError::cancelled("run abandoned by caller"));
        }
        Ok(())
    }
}

impl Default for VideoRun {
    fn default() -> Self {
        Self::new()
    }
}

fn remove_scratch(path: &Path) {
    // Missing scratch is fine; teardown must stay idempotent.
    let _ = std::fs::remove_file(path);
}

/// Generate the narrated reel for a deck, writing next to `out_base` with
/// the negotiated container extension. Returns the report and output path.
#[allow(clippy::too_many_arguments)]
pub fn generate_video(
    deck: &SlideDeck,
    speech: &mut dyn SpeechSynthesizer,
    tracks: &mut dyn TrackFetcher,
    fonts: FontSet,
    brand: BrandMark,
    out_base: impl Into<PathBuf>,
    options: &GenerateOptions,
    progress: &mut dyn FnMut(&str),
) -> EracastResult<(RunReport, PathBuf)> {
    let mut renderer = CanvasRenderer::new(fonts, brand);
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_base));
    let mut run = VideoRun::new();
    let report = {
        let mut services = RunServices {
            speech,
            tracks,
            renderer: &mut renderer,
            sink: &mut sink,
        };
        run.execute(deck, &mut services, options, progress)?
    };
    let out_path = sink
        .out_path()
        .ok_or_else(|| EracastError::encode("sink finished without an output path"))?
        .to_path_buf();
    Ok((report, out_path))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/generate.rs"]
mod tests;
