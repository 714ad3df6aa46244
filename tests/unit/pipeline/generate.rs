use super::*;

use base64::Engine as _;

use crate::content::variation::{Slide, SlideDeck};
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Canvas;

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

fn deck() -> SlideDeck {
    SlideDeck {
        slides: vec![slide(-1, None), slide(1, Some(png_bytes()))],
    }
}

// Per-test scratch dirs: the scratch filename is keyed by pid and tests
// share a process.
fn options(tag: &str) -> GenerateOptions {
    GenerateOptions {
        canvas: Canvas {
            width: 32,
            height: 18,
        },
        scratch_dir: std::env::temp_dir().join(format!("eracast-test-{tag}")),
        ..GenerateOptions::default()
    }
}

/// 0.2s of silence per request.
struct StubSpeech {
    calls: usize,
    fail: bool,
}

impl SpeechSynthesizer for StubSpeech {
    fn synthesize(&mut self, _text: &str) -> EracastResult<String> {
        self.calls += 1;
        if self.fail {
            return Err(EracastError::asset("backend down"));
        }
        let pcm = vec![0u8; 4800 * 2];
        Ok(base64::engine::general_purpose::STANDARD.encode(pcm))
    }
}

struct FailingTracks;

impl TrackFetcher for FailingTracks {
    fn fetch(&mut self, _url: &str) -> EracastResult<Vec<u8>> {
        Err(EracastError::asset("offline"))
    }
}

/// Solid-color renderer; pipeline tests need no fonts.
struct StubRenderer;

impl SlideFrameRenderer for StubRenderer {
    fn render(
        &mut self,
        canvas: Canvas,
        _slide: &Slide,
        _image: Option<&PreparedImage>,
        params: RenderParams,
    ) -> EracastResult<FrameRgba> {
        let level = (params.opacity * 255.0).round() as u8;
        Ok(FrameRgba::solid(
            canvas,
            crate::foundation::core::Rgba8::new(level, level, level, 255),
        ))
    }
}

fn run_with(
    deck: &SlideDeck,
    speech: &mut StubSpeech,
    sink: &mut InMemorySink,
    tag: &str,
) -> (VideoRun, EracastResult<RunReport>) {
    let mut run = VideoRun::new();
    let mut renderer = StubRenderer;
    let mut tracks = FailingTracks;
    let result = {
        let mut services = RunServices {
            speech,
            tracks: &mut tracks,
            renderer: &mut renderer,
            sink,
        };
        run.execute(deck, &mut services, &options(tag), &mut |_| {})
    };
    (run, result)
}

#[test]
fn run_reaches_done_with_exact_frame_counts() {
    let deck = deck();
    let mut speech = StubSpeech {
        calls: 0,
        fail: false,
    };
    let mut sink = InMemorySink::new();
    let (run, result) = run_with(&deck, &mut speech, &mut sink, "done");

    let report = result.unwrap();
    assert_eq!(run.state(), RunState::Done);
    // Each 0.2s narration yields ceil((0.2 + 1.5) * 30) = 51 frames.
    assert_eq!(report.total_frames, 102);
    assert_eq!(sink.frames().len(), 102);
    for (i, (idx, _)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64, "strictly ordered frame indices");
    }
    assert!(!sink.is_aborted());
    assert!((report.duration_secs - 3.4).abs() < 1e-9);

    // Fade endpoints show up in the stubbed pixels. Frame 30 sits one
    // second in, past the fade-in and clear of the fade-out.
    let first = sink.frames()[0].1.get_pixel(0, 0).unwrap();
    let last = sink.frames()[101].1.get_pixel(0, 0).unwrap();
    let steady = sink.frames()[30].1.get_pixel(0, 0).unwrap();
    assert_eq!(first[0], 0);
    assert_eq!(last[0], 0);
    assert_eq!(steady[0], 255);
}

#[test]
fn all_music_beds_failing_still_reaches_done() {
    // FailingTracks rejects every bed; the run must still complete.
    let deck = deck();
    let mut speech = StubSpeech {
        calls: 0,
        fail: false,
    };
    let mut sink = InMemorySink::new();
    let (run, result) = run_with(&deck, &mut speech, &mut sink, "silent-beds");
    assert!(result.is_ok());
    assert_eq!(run.state(), RunState::Done);
}

#[test]
fn narration_failure_aborts_before_rendering() {
    let deck = deck();
    let mut speech = StubSpeech {
        calls: 0,
        fail: true,
    };
    let mut sink = InMemorySink::new();
    let (run, result) = run_with(&deck, &mut speech, &mut sink, "narration-fail");

    let err = result.unwrap_err();
    assert!(matches!(err, EracastError::Asset(_)));
    assert_eq!(run.state(), RunState::Failed);
    assert_eq!(sink.frames().len(), 0);
    assert!(sink.is_aborted());
}

#[test]
fn unsupported_environment_rejects_with_zero_frames() {
    let deck = deck();
    let mut speech = StubSpeech {
        calls: 0,
        fail: false,
    };
    let mut sink = InMemorySink::unsupported();
    let (run, result) = run_with(&deck, &mut speech, &mut sink, "unsupported");

    let err = result.unwrap_err();
    assert!(matches!(err, EracastError::Unsupported(_)));
    assert_eq!(run.state(), RunState::Failed);
    assert_eq!(sink.frames().len(), 0);
    assert_eq!(speech.calls, 0, "fails before any loading");
}

#[test]
fn anchor_without_image_is_rejected() {
    let deck = SlideDeck {
        slides: vec![slide(-1, Some(png_bytes())), slide(1, None)],
    };
    let mut speech = StubSpeech {
        calls: 0,
        fail: false,
    };
    let mut sink = InMemorySink::new();
    let (run, result) = run_with(&deck, &mut speech, &mut sink, "no-anchor-image");

    assert!(matches!(result.unwrap_err(), EracastError::Validation(_)));
    assert_eq!(run.state(), RunState::Failed);
    assert_eq!(speech.calls, 0);
}

#[test]
fn cancellation_tears_down_idempotently() {
    let deck = deck();
    let mut speech = StubSpeech {
        calls: 0,
        fail: false,
    };
    let mut sink = InMemorySink::new();

    let mut run = VideoRun::new();
    run.cancel_token().cancel();
    run.cancel_token().cancel(); // idempotent

    let mut renderer = StubRenderer;
    let mut tracks = FailingTracks;
    let result = {
        let mut services = RunServices {
            speech: &mut speech,
            tracks: &mut tracks,
            renderer: &mut renderer,
            sink: &mut sink,
        };
        run.execute(&deck, &mut services, &options("cancel"), &mut |_| {})
    };

    assert!(matches!(result.unwrap_err(), EracastError::Cancelled(_)));
    assert_eq!(run.state(), RunState::Failed);
    assert_eq!(sink.frames().len(), 0);
    assert!(sink.is_aborted());
}

#[test]
fn progress_reports_each_phase() {
    let deck = deck();
    let mut speech = StubSpeech {
        calls: 0,
        fail: false,
    };
    let mut sink = InMemorySink::new();
    let mut run = VideoRun::new();
    let mut renderer = StubRenderer;
    let mut tracks = FailingTracks;
    let mut messages: Vec<String> = Vec::new();
    {
        let mut services = RunServices {
            speech: &mut speech,
            tracks: &mut tracks,
            renderer: &mut renderer,
            sink: &mut sink,
        };
        run.execute(&deck, &mut services, &options("progress"), &mut |msg| {
            messages.push(msg.to_string())
        })
        .unwrap();
    }
    assert!(messages.iter().any(|m| m.contains("narração")));
    assert!(messages.iter().any(|m| m.contains("cena")));
    assert!(messages.iter().any(|m| m.contains("Finalizando")));
}
