use super::*;

use base64::Engine as _;

use crate::content::service::{SpeechSynthesizer, TrackFetcher};
use crate::content::variation::Slide;
use crate::foundation::error::EracastError;

fn slide(level: i32, image: Option<Vec<u8>>) -> Slide {
    Slide {
        level,
        era: format!("era {level}"),
        text: format!("texto {level}"),
        subtitle: None,
        explanation: "e".to_string(),
        image,
    }
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::new(2, 2);
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

/// Returns a fixed short PCM16 payload for every request.
struct StubSpeech {
    calls: Vec<String>,
    fail_on: Option<usize>,
}

impl StubSpeech {
    fn new() -> Self {
        Self {
            calls: Vec::new(),
            fail_on: None,
        }
    }
}

impl SpeechSynthesizer for StubSpeech {
    fn synthesize(&mut self, text: &str) -> EracastResult<String> {
        if self.fail_on == Some(self.calls.len()) {
            return Err(EracastError::asset("synthesis backend unavailable"));
        }
        self.calls.push(text.to_string());
        let pcm: Vec<u8> = (0..4800i16).flat_map(|s| s.to_le_bytes()).collect();
        Ok(base64::engine::general_purpose::STANDARD.encode(pcm))
    }
}

/// Fails every fetch, recording requested URLs.
struct FailingTracks {
    urls: Vec<String>,
}

impl TrackFetcher for FailingTracks {
    fn fetch(&mut self, url: &str) -> EracastResult<Vec<u8>> {
        self.urls.push(url.to_string());
        Err(EracastError::asset("offline"))
    }
}

fn no_progress() -> impl FnMut(&str) {
    |_: &str| {}
}

#[test]
fn narration_is_loaded_per_slide_in_deck_order() {
    let deck = SlideDeck {
        slides: vec![slide(-1, None), slide(1, None), slide(2, None)],
    };
    let mut speech = StubSpeech::new();
    let mut tracks = FailingTracks { urls: Vec::new() };

    let assets =
        PreparedSlideAssets::prepare(&deck, &mut speech, &mut tracks, &mut no_progress()).unwrap();
    assert_eq!(assets.narrations.len(), 3);
    assert_eq!(
        speech.calls,
        vec!["texto -1", "texto 1", "texto 2"],
        "slide order preserved"
    );
    for pcm in &assets.narrations {
        assert_eq!(pcm.sample_rate, 24_000);
        assert_eq!(pcm.interleaved_f32.len(), 4800);
    }
}

#[test]
fn narration_failure_is_fatal() {
    let deck = SlideDeck {
        slides: vec![slide(-1, None), slide(1, None)],
    };
    let mut speech = StubSpeech::new();
    speech.fail_on = Some(1);
    let mut tracks = FailingTracks { urls: Vec::new() };

    let err =
        PreparedSlideAssets::prepare(&deck, &mut speech, &mut tracks, &mut no_progress())
            .unwrap_err();
    assert!(matches!(err, EracastError::Asset(_)));
    assert!(err.to_string().contains("slide 1"));
}

#[test]
fn music_failures_degrade_and_each_track_is_fetched_once() {
    // Levels -1 and 1 share Modern; 0 is Cover; 3 is Y1800. Cover and
    // Y1800 are distinct keys resolving to the same recording, so only
    // two distinct tracks exist.
    let deck = SlideDeck {
        slides: vec![
            slide(-1, None),
            slide(1, None),
            slide(0, None),
            slide(3, None),
        ],
    };
    let mut speech = StubSpeech::new();
    let mut tracks = FailingTracks { urls: Vec::new() };

    let assets =
        PreparedSlideAssets::prepare(&deck, &mut speech, &mut tracks, &mut no_progress()).unwrap();
    assert!(assets.music.is_empty(), "every bed failed");
    assert_eq!(tracks.urls.len(), 2, "one fetch per distinct track");
    let mut unique = tracks.urls.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), tracks.urls.len(), "no track fetched twice");
}

/// Serves a short WAV for every request, recording URLs.
struct WavTracks {
    urls: Vec<String>,
}

impl TrackFetcher for WavTracks {
    fn fetch(&mut self, url: &str) -> EracastResult<Vec<u8>> {
        self.urls.push(url.to_string());
        let samples = vec![4096i16; 2400];
        let data_len = (samples.len() * 2) as u32;
        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&24_000u32.to_le_bytes());
        out.extend_from_slice(&(24_000u32 * 2).to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in &samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        Ok(out)
    }
}

#[test]
fn keys_sharing_a_track_share_the_decoded_samples() {
    if !crate::encode::ffmpeg::is_ffmpeg_on_path() {
        return;
    }
    // Cover (level 0) and Y1800 (level 3) resolve to the same recording.
    let deck = SlideDeck {
        slides: vec![slide(0, None), slide(3, None)],
    };
    let mut speech = StubSpeech::new();
    let mut tracks = WavTracks { urls: Vec::new() };

    let assets =
        PreparedSlideAssets::prepare(&deck, &mut speech, &mut tracks, &mut no_progress()).unwrap();
    assert_eq!(tracks.urls.len(), 1, "shared track decoded once");
    let cover = assets.music.get(&AmbienceKey::for_level(0)).unwrap();
    let y1800 = assets.music.get(&AmbienceKey::for_level(3)).unwrap();
    assert!(std::sync::Arc::ptr_eq(
        &cover.interleaved_f32,
        &y1800.interleaved_f32
    ));
}

#[test]
fn images_degrade_to_none() {
    let deck = SlideDeck {
        slides: vec![
            slide(-1, Some(png_bytes())),
            slide(1, Some(vec![0xde, 0xad])),
            slide(2, None),
        ],
    };
    let mut speech = StubSpeech::new();
    let mut tracks = FailingTracks { urls: Vec::new() };

    let assets =
        PreparedSlideAssets::prepare(&deck, &mut speech, &mut tracks, &mut no_progress()).unwrap();
    assert_eq!(assets.images.len(), 3);
    assert!(assets.images[0].is_some());
    assert!(assets.images[1].is_none(), "undecodable bytes degrade");
    assert!(assets.images[2].is_none(), "missing image degrades");
}
