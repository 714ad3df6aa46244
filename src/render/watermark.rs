use crate::foundation::core::{FrameRgba, Line, Point, Rect, Rgba8};
use crate::render::raster;
use crate::render::text::{FontRole, FontSet, FontStyle};

/// Light foreground used for the arrow and title.
pub const WATERMARK_PRIMARY: Rgba8 = Rgba8::new(0xe2, 0xe8, 0xf0, 255);
/// Muted foreground used for the bars and tagline.
pub const WATERMARK_SECONDARY: Rgba8 = Rgba8::new(0x94, 0xa3, 0xb8, 255);

/// Brand identity stamped on every export.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BrandMark {
    /// First watermark text line, uppercase.
    pub title: String,
    /// Second watermark text line, uppercase, letter-spaced.
    pub tagline: String,
    /// Filename prefix.
    pub slug: String,
}

impl Default for BrandMark {
    fn default() -> Self {
        Self {
            title: "JEFFERSON GOMES".to_string(),
            tagline: "INSIDE SALES".to_string(),
            slug: "jefferson_gomes".to_string(),
        }
    }
}

/// One drawing primitive of the brand watermark.
#[derive(Clone, Debug, PartialEq)]
pub enum WatermarkOp {
    /// Filled bar of the growth chart.
    Bar {
        /// Bar bounds in canvas coordinates.
        rect: Rect,
        /// Fill color.
        color: Rgba8,
    },
    /// Stroked segment (arrow shaft or head).
    Stroke {
        /// Segment in canvas coordinates.
        line: Line,
        /// Stroke width in px.
        width: f64,
        /// Stroke color.
        color: Rgba8,
    },
    /// Left-aligned text run with its baseline at `origin`.
    Label {
        /// Text to draw.
        text: String,
        /// Baseline origin in canvas coordinates.
        origin: Point,
        /// Font size in px.
        size: f32,
        /// Extra per-glyph advance in px.
        tracking: f32,
        /// Text color.
        color: Rgba8,
    },
}

/// Build the watermark primitive sequence: five rising bars, an upward
/// arrow with a head, and two brand text lines, translated to `origin`
/// and scaled by `scale`.
pub fn watermark_ops(origin: Point, scale: f64, brand: &BrandMark) -> Vec<WatermarkOp> {
    let at = |x: f64, y: f64| Point::new(origin.x + x * scale, origin.y + y * scale);
    let mut ops = Vec::new();

    let bar_width = 10.0;
    let gap = 5.0;
    let baseline_y = 50.0;
    let heights = [20.0, 30.0, 40.0, 50.0, 60.0];
    for (i, h) in heights.iter().enumerate() {
        let x = i as f64 * (bar_width + gap);
        let p0 = at(x, baseline_y - h);
        let p1 = at(x + bar_width, baseline_y);
        ops.push(WatermarkOp::Bar {
            rect: Rect::new(p0.x, p0.y, p1.x, p1.y),
            color: WATERMARK_SECONDARY,
        });
    }

    // Arrow shaft rises from the first bar past the last one.
    let end_x = heights.len() as f64 * (bar_width + gap) + 5.0;
    let end_y = baseline_y - heights[heights.len() - 1] - 10.0;
    let stroke = 4.0 * scale;
    ops.push(WatermarkOp::Stroke {
        line: Line::new(at(-5.0, baseline_y - heights[0] + 10.0), at(end_x, end_y)),
        width: stroke,
        color: WATERMARK_PRIMARY,
    });
    ops.push(WatermarkOp::Stroke {
        line: Line::new(at(end_x - 10.0, end_y), at(end_x, end_y)),
        width: stroke,
        color: WATERMARK_PRIMARY,
    });
    ops.push(WatermarkOp::Stroke {
        line: Line::new(at(end_x, end_y), at(end_x, end_y + 10.0)),
        width: stroke,
        color: WATERMARK_PRIMARY,
    });

    let text_y = baseline_y + 25.0;
    ops.push(WatermarkOp::Label {
        text: brand.title.clone(),
        origin: at(0.0, text_y),
        size: 24.0 * scale as f32,
        tracking: 0.0,
        color: WATERMARK_PRIMARY,
    });
    ops.push(WatermarkOp::Label {
        text: brand.tagline.clone(),
        origin: at(0.0, text_y + 20.0),
        size: 16.0 * scale as f32,
        tracking: 2.0 * scale as f32,
        color: WATERMARK_SECONDARY,
    });
    ops
}

/// Rasterize a watermark primitive sequence onto a frame.
pub fn rasterize_watermark(frame: &mut FrameRgba, ops: &[WatermarkOp], fonts: &FontSet) {
    for op in ops {
        match op {
            WatermarkOp::Bar { rect, color } => raster::fill_rect(frame, *rect, *color),
            WatermarkOp::Stroke { line, width, color } => {
                raster::stroke_line(frame, *line, *width, *color)
            }
            WatermarkOp::Label {
                text,
                origin,
                size,
                tracking,
                color,
            } => {
                raster::draw_text_run(
                    frame,
                    fonts,
                    FontStyle::upright(FontRole::Sans),
                    *size,
                    text,
                    origin.x,
                    origin.y,
                    *tracking,
                    *color,
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/watermark.rs"]
mod tests;
