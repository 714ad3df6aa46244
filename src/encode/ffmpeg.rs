use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::debug;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRgba};
use crate::foundation::error::{EracastError, EracastResult};

/// A negotiated container/codec pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoFormat {
    /// Container file extension.
    pub extension: &'static str,
    /// ffmpeg video encoder name.
    pub video_encoder: &'static str,
    /// ffmpeg audio encoder name.
    pub audio_encoder: &'static str,
}

/// Descending preference order: best quality first, universal fallback
/// last.
pub const FORMAT_PREFERENCE: [VideoFormat; 3] = [
    VideoFormat {
        extension: "webm",
        video_encoder: "libvpx-vp9",
        audio_encoder: "libopus",
    },
    VideoFormat {
        extension: "webm",
        video_encoder: "libvpx",
        audio_encoder: "libopus",
    },
    VideoFormat {
        extension: "mp4",
        video_encoder: "libx264",
        audio_encoder: "aac",
    },
];

/// First preference whose encoders pass `is_available`.
pub fn select_format(is_available: &dyn Fn(&str) -> bool) -> Option<VideoFormat> {
    FORMAT_PREFERENCE
        .into_iter()
        .find(|f| is_available(f.video_encoder) && is_available(f.audio_encoder))
}

/// Encoder names reported by the system ffmpeg.
pub fn probe_encoders() -> EracastResult<String> {
    let out = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .map_err(|e| EracastError::unsupported(format!("cannot probe ffmpeg encoders: {e}")))?;
    if !out.status.success() {
        return Err(EracastError::unsupported(
            "ffmpeg -encoders exited with failure",
        ));
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Encoder names parsed from an `ffmpeg -encoders` listing.
///
/// Each entry line carries a capability-flag column followed by the
/// encoder name; header and legend lines are skipped. Matching whole
/// names avoids false positives from description text (a vp9-only build
/// mentions "libvpx" in its vp9 description).
pub fn parse_encoder_names(listing: &str) -> std::collections::HashSet<&str> {
    listing
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let flags = parts.next()?;
            let name = parts.next()?;
            if name == "=" || flags.is_empty() || !flags.chars().all(|c| "VASFXBD.".contains(c)) {
                return None;
            }
            Some(name)
        })
        .collect()
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> EracastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output path without extension; the negotiated container's extension
    /// is appended.
    pub out_base: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    /// Create options writing next to `out_base`.
    pub fn new(out_base: impl Into<PathBuf>) -> Self {
        Self {
            out_base: out_base.into(),
            overwrite: true,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGBA frames to its
/// stdin, muxing the mixed PCM file as a second input.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    format: Option<VideoFormat>,
    out_path: Option<PathBuf>,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            format: None,
            out_path: None,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }

    /// The output path, known once negotiation has picked a container.
    pub fn out_path(&self) -> Option<&Path> {
        self.out_path.as_deref()
    }
}

impl FrameSink for FfmpegSink {
    fn negotiate(&mut self) -> EracastResult<VideoFormat> {
        if !is_ffmpeg_on_path() {
            return Err(EracastError::unsupported(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }
        let listing = probe_encoders()?;
        let encoders = parse_encoder_names(&listing);
        let format = select_format(&|name| encoders.contains(name)).ok_or_else(|| {
            EracastError::unsupported("no supported container/codec pair in this ffmpeg build")
        })?;
        debug!(
            container = format.extension,
            video = format.video_encoder,
            "negotiated output format"
        );
        self.out_path = Some(self.opts.out_base.with_extension(format.extension));
        self.format = Some(format);
        Ok(format)
    }

    fn begin(&mut self, cfg: SinkConfig) -> EracastResult<()> {
        let format = self
            .format
            .ok_or_else(|| EracastError::encode("ffmpeg sink started before negotiation"))?;
        let out_path = self
            .out_path
            .clone()
            .ok_or_else(|| EracastError::encode("ffmpeg sink has no output path"))?;
        if cfg.width == 0 || cfg.height == 0 {
            return Err(EracastError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(EracastError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }

        ensure_parent_dir(&out_path)?;
        if !self.opts.overwrite && out_path.exists() {
            return Err(EracastError::validation(format!(
                "output file '{}' already exists",
                out_path.display()
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // Input 0: raw straight-alpha RGBA8 frames over stdin. Frames are
        // fully opaque by construction, so no flattening pass is needed.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
        ]);

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(EracastError::validation(
                    "audio sample_rate/channels must be non-zero when audio is enabled",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path)
            .args([
                "-c:v",
                format.video_encoder,
                "-pix_fmt",
                "yuv420p",
                "-c:a",
                format.audio_encoder,
                "-shortest",
            ]);
        } else {
            cmd.args([
                "-an",
                "-c:v",
                format.video_encoder,
                "-pix_fmt",
                "yuv420p",
            ]);
        }
        if format.extension == "mp4" {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.arg(&out_path);

        let mut child = cmd.spawn().map_err(|e| {
            EracastError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EracastError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| EracastError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> EracastResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| EracastError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(EracastError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(EracastError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(EracastError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            EracastError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> EracastResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| EracastError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| EracastError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| EracastError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| EracastError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(EracastError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        // A partial container is never valid output.
        if self.cfg.take().is_some()
            && let Some(path) = &self.out_path
        {
            let _ = std::fs::remove_file(path);
        }
        self.last_idx = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
