use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{EracastError, EracastResult};

/// Prepared raster image in straight-alpha RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major straight-alpha RGBA8.
    pub rgba8: Arc<Vec<u8>>,
}

/// Decoded audio clip stored as interleaved `f32` PCM.
#[derive(Clone, Debug)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved PCM samples.
    pub interleaved_f32: Arc<Vec<f32>>,
}

impl AudioPcm {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        (self.interleaved_f32.len() as f64)
            / f64::from(self.channels)
            / f64::from(self.sample_rate)
    }
}

/// Sample rate of synthesized narration payloads.
pub const NARRATION_SAMPLE_RATE: u32 = 24_000;

/// Decode encoded image bytes to straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> EracastResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PreparedImage {
        width,
        height,
        rgba8: Arc::new(rgba.into_raw()),
    })
}

/// Decode a base64 narration payload (16-bit LE PCM, mono, 24 kHz) to `f32`.
pub fn decode_narration_base64(payload: &str) -> EracastResult<AudioPcm> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("decode narration base64")?;
    if !bytes.len().is_multiple_of(2) {
        return Err(EracastError::asset(
            "narration byte length is not aligned to i16 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(bytes.len() / 2);
    for chunk in bytes.chunks_exact(2) {
        let s = i16::from_le_bytes([chunk[0], chunk[1]]);
        pcm.push(f32::from(s) / 32768.0);
    }
    Ok(AudioPcm {
        sample_rate: NARRATION_SAMPLE_RATE,
        channels: 1,
        interleaved_f32: Arc::new(pcm),
    })
}

/// Decode encoded audio bytes (OGG, MP3, ...) to stereo interleaved `f32`
/// PCM at `sample_rate`, via the system `ffmpeg` binary.
pub fn decode_audio_f32_stereo(bytes: &[u8], sample_rate: u32) -> EracastResult<AudioPcm> {
    let mut child = std::process::Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-i",
            "pipe:0",
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| EracastError::asset(format!("failed to run ffmpeg for audio decode: {e}")))?;

    // Feed the encoded bytes from a helper thread so a full stdout pipe
    // cannot deadlock against a full stdin pipe.
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| EracastError::asset("ffmpeg stdin unavailable"))?;
    let input = bytes.to_vec();
    let writer = std::thread::spawn(move || {
        let _ = stdin.write_all(&input);
    });

    let out = child
        .wait_with_output()
        .map_err(|e| EracastError::asset(format!("ffmpeg audio decode wait failed: {e}")))?;
    let _ = writer.join();

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        return Err(EracastError::asset(format!(
            "ffmpeg audio decode failed: {}",
            msg.trim()
        )));
    }
    if !out.stdout.len().is_multiple_of(4) {
        return Err(EracastError::asset(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: Arc::new(pcm),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
