//! Eracast turns AI-generated slide "variations" (phrase + optional photo,
//! rewritten across historical eras or seller personas) into static post
//! images and one narrated vertical video per run.
//!
//! # Pipeline overview
//!
//! 1. **Load**: synthesize narration per slide, fetch and decode the music
//!    beds, decode slide images ([`PreparedSlideAssets`])
//! 2. **Plan**: one timeline span per slide, duration derived from its
//!    narration ([`build_timeline`]); narration and looping music scheduled
//!    against it ([`build_mix_plan`])
//! 3. **Render**: each frame is laid out ([`plan_frame`]) and rasterized
//!    ([`rasterize`]) on the CPU
//! 4. **Encode**: frames stream to the system `ffmpeg` with the mixed PCM
//!    as a second input ([`FfmpegSink`])
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: identical inputs produce identical
//!   pixels and samples; no wall-clock pacing anywhere.
//! - **No IO in renderers**: external IO is front-loaded in
//!   [`PreparedSlideAssets`]; model calls and track fetching stay behind
//!   the [`ContentService`], [`SpeechSynthesizer`] and [`TrackFetcher`]
//!   traits.
//! - **Straight-alpha RGBA8** frames over an opaque background.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod audio;
mod content;
mod encode;
mod foundation;
mod pipeline;
mod render;
mod timeline;

pub use assets::decode::{
    AudioPcm, NARRATION_SAMPLE_RATE, PreparedImage, decode_audio_f32_stereo, decode_image,
    decode_narration_base64,
};
pub use assets::loader::{MIX_SAMPLE_RATE, PreparedSlideAssets};
pub use audio::mix::{
    AudioMixPlan, MUSIC_GAIN, MusicSegment, NarrationSegment, build_mix_plan, frame_to_sample,
    mix, write_mix_to_f32le_file,
};
pub use content::ambience::AmbienceKey;
pub use content::service::{
    ContentService, ImageEditRequest, SpeechSynthesizer, TrackFetcher, VariationRequest,
};
pub use content::variation::{
    GenerationMode, Slide, SlideDeck, TransformationResponse, Variation,
};
pub use encode::ffmpeg::{
    FORMAT_PREFERENCE, FfmpegSink, FfmpegSinkOpts, VideoFormat, ensure_parent_dir,
    is_ffmpeg_on_path, parse_encoder_names, probe_encoders, select_format,
};
pub use encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{Canvas, Fps, FrameIndex, FrameRgba, Line, Point, Rect, Rgba8, Vec2};
pub use foundation::error::{EracastError, EracastResult};
pub use pipeline::export::{
    art_filename, deck_filename, post_filename, render_post, save_all_posts, save_art,
    save_post_png, video_filename,
};
pub use pipeline::generate::{
    CancelToken, CanvasRenderer, GenerateOptions, RunReport, RunServices, RunState,
    SlideFrameRenderer, VideoRun, generate_video,
};
pub use render::frame::{
    BACKGROUND, FrameOp, FramePlan, RenderParams, SUBTITLE_COLOR, TEXT_COLOR, plan_frame,
    rasterize, render_frame,
};
pub use render::text::{FontRole, FontSet, FontStyle, GlyphMeasure, main_text_size, wrap_text};
pub use render::watermark::{
    BrandMark, WATERMARK_PRIMARY, WATERMARK_SECONDARY, WatermarkOp, rasterize_watermark,
    watermark_ops,
};
pub use timeline::plan::{
    FADE_IN_SEC, FADE_OUT_SEC, TimelineEntry, ZOOM_SPAN, build_timeline, total_duration_secs,
    total_frames,
};
