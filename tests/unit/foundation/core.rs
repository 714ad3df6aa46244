use super::*;

#[test]
fn fps_rejects_zero_components() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::new(30, 1).is_ok());
}

#[test]
fn fps_frame_math() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.frames_to_secs(30), 1.0);
    assert_eq!(fps.secs_to_frames_ceil(1.0), 30);
    // 2.5s at 30fps is exactly 75 frames; a hair over rounds up.
    assert_eq!(fps.secs_to_frames_ceil(2.5), 75);
    assert_eq!(fps.secs_to_frames_ceil(2.501), 76);
}

#[test]
fn canvas_presets() {
    assert_eq!(Canvas::REEL.width, 1080);
    assert_eq!(Canvas::REEL.height, 1920);
    assert_eq!(Canvas::POST.width, 1080);
    assert_eq!(Canvas::POST.height, 1350);
}

#[test]
fn solid_frame_is_opaque() {
    let frame = FrameRgba::solid(
        Canvas {
            width: 4,
            height: 3,
        },
        Rgba8::new(10, 20, 30, 0),
    );
    assert_eq!(frame.data.len(), 4 * 3 * 4);
    assert_eq!(frame.get_pixel(0, 0), Some([10, 20, 30, 255]));
    assert_eq!(frame.get_pixel(3, 2), Some([10, 20, 30, 255]));
    assert_eq!(frame.get_pixel(4, 0), None);
}

#[test]
fn blend_pixel_over_opaque_background() {
    let mut frame = FrameRgba::solid(
        Canvas {
            width: 2,
            height: 2,
        },
        Rgba8::new(0, 0, 0, 255),
    );
    frame.blend_pixel(0, 0, Rgba8::new(255, 255, 255, 255));
    assert_eq!(frame.get_pixel(0, 0), Some([255, 255, 255, 255]));

    frame.blend_pixel(1, 1, Rgba8::new(200, 100, 0, 128));
    let [r, g, b, a] = frame.get_pixel(1, 1).unwrap();
    assert!((99..=101).contains(&r));
    assert!((49..=51).contains(&g));
    assert_eq!(b, 0);
    assert_eq!(a, 255);

    // Out of bounds and zero alpha are no-ops.
    frame.blend_pixel(-1, 0, Rgba8::new(255, 0, 0, 255));
    frame.blend_pixel(0, 5, Rgba8::new(255, 0, 0, 255));
    frame.blend_pixel(0, 0, Rgba8::new(0, 0, 0, 0));
    assert_eq!(frame.get_pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn with_alpha_factor_scales_and_clamps() {
    let c = Rgba8::new(1, 2, 3, 200);
    assert_eq!(c.with_alpha_factor(0.0).a, 0);
    assert_eq!(c.with_alpha_factor(1.0).a, 200);
    assert_eq!(c.with_alpha_factor(0.5).a, 100);
    assert_eq!(c.with_alpha_factor(2.0).a, 200);
    assert_eq!(c.with_alpha_factor(-1.0).a, 0);
}
