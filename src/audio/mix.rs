use std::path::Path;

use crate::assets::decode::AudioPcm;
use crate::assets::loader::{MIX_SAMPLE_RATE, PreparedSlideAssets};
use crate::content::ambience::AmbienceKey;
use crate::content::variation::SlideDeck;
use crate::foundation::core::Fps;
use crate::foundation::error::{EracastError, EracastResult};
use crate::timeline::plan::{FADE_IN_SEC, TimelineEntry};

/// Fixed music attenuation relative to narration.
pub const MUSIC_GAIN: f32 = 0.15;

/// A narration clip played once from a timeline offset.
#[derive(Clone, Debug)]
pub struct NarrationSegment {
    /// First output sample of the clip.
    pub timeline_start_sample: u64,
    /// Decoded narration audio.
    pub source: AudioPcm,
}

/// A music bed looping across a contiguous span of slides sharing a track.
#[derive(Clone, Debug)]
pub struct MusicSegment {
    /// Ambience of the first slide in the span; later slides may carry a
    /// different key resolving to the same recording.
    pub key: AmbienceKey,
    /// First output sample of the span.
    pub timeline_start_sample: u64,
    /// One past the last output sample of the span.
    pub timeline_end_sample: u64,
    /// Decoded bed; `None` when the bed failed to load and the span stays
    /// silent.
    pub source: Option<AudioPcm>,
}

/// Everything the mixer needs to render the run's audio.
#[derive(Clone, Debug)]
pub struct AudioMixPlan {
    /// Output sample rate.
    pub sample_rate: u32,
    /// Output channel count (stereo).
    pub channels: u16,
    /// Output length in per-channel samples.
    pub total_samples: u64,
    /// One-shot narration segments, in slide order.
    pub narration: Vec<NarrationSegment>,
    /// Looping music segments; boundaries fall exactly on track changes.
    pub music: Vec<MusicSegment>,
}

/// Schedule narration and music against the timeline.
///
/// Narration starts `FADE_IN_SEC` after its slide's span so the fade-in
/// completes as speech begins. Consecutive slides whose ambience resolves
/// to the same recording merge into one music segment; the bed restarts
/// from source time zero only where the track changes.
pub fn build_mix_plan(
    timeline: &[TimelineEntry],
    deck: &SlideDeck,
    assets: &PreparedSlideAssets,
    fps: Fps,
) -> EracastResult<AudioMixPlan> {
    if timeline.len() != deck.slides.len() || timeline.len() != assets.narrations.len() {
        return Err(EracastError::validation(
            "timeline, deck and narration counts must match",
        ));
    }

    let total_frames: u64 = timeline.iter().map(|e| e.frame_count).sum();
    let total_samples = frame_to_sample(total_frames, fps, MIX_SAMPLE_RATE);

    let narration_offset = (FADE_IN_SEC * f64::from(MIX_SAMPLE_RATE)).round() as u64;
    let narration = timeline
        .iter()
        .map(|entry| NarrationSegment {
            timeline_start_sample: frame_to_sample(entry.start_frame, fps, MIX_SAMPLE_RATE)
                + narration_offset,
            source: assets.narrations[entry.slide].clone(),
        })
        .collect();

    let mut music: Vec<MusicSegment> = Vec::new();
    for entry in timeline {
        let key = AmbienceKey::for_level(deck.slides[entry.slide].level);
        let start = frame_to_sample(entry.start_frame, fps, MIX_SAMPLE_RATE);
        let end = frame_to_sample(entry.start_frame + entry.frame_count, fps, MIX_SAMPLE_RATE);
        match music.last_mut() {
            // The same recording keeps playing across a key change; only
            // an actual track change restarts the bed.
            Some(last) if last.key.track_url() == key.track_url() => {
                last.timeline_end_sample = end
            }
            _ => music.push(MusicSegment {
                key,
                timeline_start_sample: start,
                timeline_end_sample: end,
                source: assets.music.get(&key).cloned(),
            }),
        }
    }

    Ok(AudioMixPlan {
        sample_rate: MIX_SAMPLE_RATE,
        channels: 2,
        total_samples,
        narration,
        music,
    })
}

/// Render the plan to interleaved stereo `f32` samples in [-1, 1].
pub fn mix(plan: &AudioMixPlan) -> Vec<f32> {
    let mut out = vec![0.0f32; plan.total_samples as usize * usize::from(plan.channels)];

    for seg in &plan.narration {
        let src = &seg.source;
        let src_frames = src.interleaved_f32.len() / usize::from(src.channels.max(1));
        if src_frames == 0 {
            continue;
        }
        for dst_sample in seg.timeline_start_sample..plan.total_samples {
            let rel_sec =
                ((dst_sample - seg.timeline_start_sample) as f64) / f64::from(plan.sample_rate);
            let src_pos = rel_sec * f64::from(src.sample_rate);
            let src_frame0 = src_pos.floor() as usize;
            if src_frame0 >= src_frames {
                break;
            }
            let (l, r) = sample_interp(src, src_frame0, src_frames, src_pos);
            accumulate(&mut out, dst_sample, l, r, 1.0);
        }
    }

    for seg in &plan.music {
        let Some(src) = &seg.source else { continue };
        let src_frames = src.interleaved_f32.len() / usize::from(src.channels.max(1));
        if src_frames == 0 {
            continue;
        }
        let end = seg.timeline_end_sample.min(plan.total_samples);
        for dst_sample in seg.timeline_start_sample..end {
            let rel_sec =
                ((dst_sample - seg.timeline_start_sample) as f64) / f64::from(plan.sample_rate);
            let src_pos = rel_sec * f64::from(src.sample_rate);
            // The bed loops: wrap the source position instead of stopping.
            let src_frame0 = (src_pos.floor() as u64 % src_frames as u64) as usize;
            let frac_pos = src_frame0 as f64 + src_pos.fract();
            let (l, r) = sample_interp_wrapping(src, src_frame0, src_frames, frac_pos);
            accumulate(&mut out, dst_sample, l, r, MUSIC_GAIN);
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

/// Persist an interleaved `f32` mix as raw little-endian PCM.
pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> EracastResult<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            EracastError::encode(format!(
                "failed to create audio mix output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        EracastError::encode(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

/// Convert a frame delta to an output sample index, rounding to nearest.
pub fn frame_to_sample(frame_delta: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frame_delta) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

fn accumulate(out: &mut [f32], dst_sample: u64, l: f32, r: f32, gain: f32) {
    let idx = dst_sample as usize * 2;
    out[idx] += l * gain;
    out[idx + 1] += r * gain;
}

fn sample_interp(src: &AudioPcm, frame0: usize, src_frames: usize, src_pos: f64) -> (f32, f32) {
    let frame1 = (frame0 + 1).min(src_frames - 1);
    interp_frames(src, frame0, frame1, (src_pos - frame0 as f64) as f32)
}

fn sample_interp_wrapping(
    src: &AudioPcm,
    frame0: usize,
    src_frames: usize,
    frac_pos: f64,
) -> (f32, f32) {
    let frame1 = (frame0 + 1) % src_frames;
    interp_frames(src, frame0, frame1, (frac_pos - frame0 as f64) as f32)
}

fn interp_frames(src: &AudioPcm, frame0: usize, frame1: usize, frac: f32) -> (f32, f32) {
    let data = src.interleaved_f32.as_ref();
    if src.channels <= 1 {
        let v0 = data[frame0];
        let v1 = data[frame1];
        let v = v0 + (v1 - v0) * frac;
        (v, v)
    } else {
        let c = usize::from(src.channels);
        let (i0, i1) = (frame0 * c, frame1 * c);
        let l = data[i0] + (data[i1] - data[i0]) * frac;
        let r = data[i0 + 1] + (data[i1 + 1] - data[i0 + 1]) * frac;
        (l, r)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
