use crate::foundation::core::{FrameRgba, Line, Point, Rect, Rgba8};
use crate::render::text::{FontSet, FontStyle};

/// Fill an axis-aligned rect, clipped to the frame.
pub(crate) fn fill_rect(frame: &mut FrameRgba, rect: Rect, color: Rgba8) {
    let x0 = rect.x0.round().max(0.0) as i64;
    let y0 = rect.y0.round().max(0.0) as i64;
    let x1 = rect.x1.round().min(f64::from(frame.width)) as i64;
    let y1 = rect.y1.round().min(f64::from(frame.height)) as i64;
    for y in y0..y1 {
        for x in x0..x1 {
            frame.blend_pixel(x, y, color);
        }
    }
}

/// Stroke a line segment with round caps, antialiased by signed distance.
pub(crate) fn stroke_line(frame: &mut FrameRgba, line: Line, width: f64, color: Rgba8) {
    let half = width / 2.0;
    let pad = half + 1.0;
    let x0 = (line.p0.x.min(line.p1.x) - pad).floor().max(0.0) as i64;
    let y0 = (line.p0.y.min(line.p1.y) - pad).floor().max(0.0) as i64;
    let x1 = (line.p0.x.max(line.p1.x) + pad)
        .ceil()
        .min(f64::from(frame.width)) as i64;
    let y1 = (line.p0.y.max(line.p1.y) + pad)
        .ceil()
        .min(f64::from(frame.height)) as i64;
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let d = dist_to_segment(p, line);
            let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
            if coverage > 0.0 {
                frame.blend_pixel(x, y, color.with_alpha_factor(coverage));
            }
        }
    }
}

fn dist_to_segment(p: Point, line: Line) -> f64 {
    let d = line.p1 - line.p0;
    let len2 = d.hypot2();
    if len2 == 0.0 {
        return (p - line.p0).hypot();
    }
    let t = ((p - line.p0).dot(d) / len2).clamp(0.0, 1.0);
    let proj = line.p0 + d * t;
    (p - proj).hypot()
}

/// Rasterize one run of text with its baseline origin at `(x, y)`.
///
/// Returns the pen x position after the run.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_text_run(
    frame: &mut FrameRgba,
    fonts: &FontSet,
    style: FontStyle,
    size: f32,
    text: &str,
    x: f64,
    y: f64,
    tracking: f32,
    color: Rgba8,
) -> f64 {
    let font = fonts.face(style);
    let baseline_y = y.round() as i64;
    let mut pen_x = x;
    for c in text.chars() {
        let (metrics, bitmap) = font.rasterize(c, size);
        if metrics.width == 0 {
            // Whitespace and zero-extent glyphs only advance the pen.
            pen_x += f64::from(metrics.advance_width + tracking);
            continue;
        }
        let left = pen_x.round() as i64 + i64::from(metrics.xmin);
        let top = baseline_y - i64::from(metrics.ymin) - metrics.height as i64;
        for (row, chunk) in bitmap.chunks_exact(metrics.width).enumerate() {
            for (col, &coverage) in chunk.iter().enumerate() {
                if coverage == 0 {
                    continue;
                }
                let px = color.with_alpha_factor(f64::from(coverage) / 255.0);
                frame.blend_pixel(left + col as i64, top + row as i64, px);
            }
        }
        pen_x += f64::from(metrics.advance_width + tracking);
    }
    pen_x
}
