use crate::assets::decode::PreparedImage;
use crate::content::variation::Slide;
use crate::foundation::core::{Canvas, FrameRgba, Line, Point, Rect, Rgba8};
use crate::foundation::error::{EracastError, EracastResult};
use crate::foundation::math::lerp;
use crate::render::raster;
use crate::render::text::{FontSet, FontStyle, GlyphMeasure, main_text_size, wrap_text};
use crate::render::watermark::{self, BrandMark, WatermarkOp};

/// Slate background behind every slide.
pub const BACKGROUND: Rgba8 = Rgba8::new(0x0f, 0x17, 0x2a, 255);
/// Primary slide text color.
pub const TEXT_COLOR: Rgba8 = Rgba8::new(0xf1, 0xf5, 0xf9, 255);
/// Cover subtitle color.
pub const SUBTITLE_COLOR: Rgba8 = Rgba8::new(0xcb, 0xd5, 0xe1, 255);

const ERA_BASELINE_Y: f64 = 120.0;
const ERA_SIZE: f32 = 26.0;
const ERA_UNDERLINE_MARGIN: f64 = 20.0;
const WRAP_WIDTH: f32 = 900.0;
const BOTTOM_PADDING: f64 = 220.0;
// Minimum baseline for the main block. Applies on the cover too, so huge
// text can never climb into the top margin.
const MIN_START_Y: f64 = ERA_BASELINE_Y + 100.0;
const SUBTITLE_SIZE: f32 = 36.0;
const SUBTITLE_LINE_HEIGHT: f64 = 50.0;
const WATERMARK_SCALE: f64 = 1.5;

/// Per-frame animation parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderParams {
    /// Centered zoom factor applied to the slide image; 1.0 = none.
    pub scale: f64,
    /// Fade alpha applied to image and text, in [0, 1].
    pub opacity: f64,
}

impl RenderParams {
    /// Validated constructor.
    pub fn new(scale: f64, opacity: f64) -> EracastResult<Self> {
        if !scale.is_finite() || scale < 1.0 {
            return Err(EracastError::validation("scale must be >= 1.0"));
        }
        if !(0.0..=1.0).contains(&opacity) {
            return Err(EracastError::validation("opacity must be in [0, 1]"));
        }
        Ok(Self { scale, opacity })
    }
}

/// One layout operation of a planned frame, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOp {
    /// Slide image blitted to cover the canvas, zoomed about the center.
    ImageCover {
        /// Destination rect; may exceed the canvas and is clipped at raster
        /// time.
        dest: Rect,
        /// Fade alpha.
        opacity: f64,
    },
    /// Bottom-to-top black gradient, independent of fade state.
    GradientOverlay,
    /// One horizontally centered line of text.
    TextLine {
        /// Line content.
        text: String,
        /// Horizontal center in px.
        center_x: f64,
        /// Baseline y in px.
        baseline: f64,
        /// Font size in px.
        size: f32,
        /// Face selection.
        style: FontStyle,
        /// Base color.
        color: Rgba8,
        /// Fade alpha multiplied into the color.
        alpha: f64,
    },
    /// Era underline rule.
    Underline {
        /// Segment under the label.
        line: Line,
        /// Stroke width in px.
        width: f64,
        /// Base color (carries the rule's own translucency).
        color: Rgba8,
        /// Fade alpha multiplied into the color.
        alpha: f64,
    },
    /// Brand watermark primitives, always fully opaque.
    Watermark(Vec<WatermarkOp>),
}

/// A fully laid-out frame, ready to rasterize.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    /// Target canvas.
    pub canvas: Canvas,
    /// Operations in paint order.
    pub ops: Vec<FrameOp>,
}

/// Lay out one frame.
///
/// Pure: depends only on the arguments (text measurement comes through
/// `measure`), so layout is testable without any font or image bytes.
/// `image_dims` is the source image size, when the slide has one.
pub fn plan_frame(
    canvas: Canvas,
    slide: &Slide,
    measure: &dyn GlyphMeasure,
    image_dims: Option<(u32, u32)>,
    params: RenderParams,
    brand: &BrandMark,
) -> FramePlan {
    let width = f64::from(canvas.width);
    let height = f64::from(canvas.height);
    let center_x = width / 2.0;
    let mut ops = Vec::new();

    if let Some((img_w, img_h)) = image_dims
        && img_w > 0
        && img_h > 0
    {
        ops.push(FrameOp::ImageCover {
            dest: cover_rect(width, height, img_w, img_h, params.scale),
            opacity: params.opacity,
        });
    }

    ops.push(FrameOp::GradientOverlay);

    // The cover has no era label; its headline speaks for itself.
    if !slide.is_cover() {
        let era = slide.era.to_uppercase();
        let era_style = FontStyle::upright(crate::render::text::FontRole::Sans);
        let era_width = f64::from(measure.text_width(era_style, ERA_SIZE, &era));
        ops.push(FrameOp::TextLine {
            text: era,
            center_x,
            baseline: ERA_BASELINE_Y,
            size: ERA_SIZE,
            style: era_style,
            color: TEXT_COLOR,
            alpha: params.opacity * 0.8,
        });
        let rule_y = ERA_BASELINE_Y + 15.0;
        let half = era_width / 2.0 + ERA_UNDERLINE_MARGIN;
        ops.push(FrameOp::Underline {
            line: Line::new(
                Point::new(center_x - half, rule_y),
                Point::new(center_x + half, rule_y),
            ),
            width: 2.0,
            color: Rgba8::new(255, 255, 255, 51),
            alpha: params.opacity * 0.8,
        });
    }

    let size = main_text_size(slide.level);
    let style = FontStyle::main_for_level(slide.level);
    let lines = wrap_text(measure, style, size, WRAP_WIDTH, &slide.display_text());
    let line_height = f64::from(size) * 1.3;
    let total_height = lines.len() as f64 * line_height;
    let mut start_y = height - BOTTOM_PADDING - total_height + line_height;
    if start_y < MIN_START_Y {
        start_y = MIN_START_Y;
    }
    for (i, line) in lines.iter().enumerate() {
        ops.push(FrameOp::TextLine {
            text: line.clone(),
            center_x,
            baseline: start_y + i as f64 * line_height,
            size,
            style,
            color: TEXT_COLOR,
            alpha: params.opacity,
        });
    }

    if slide.is_cover()
        && let Some(subtitle) = &slide.subtitle
    {
        let sub_style = FontStyle::upright(crate::render::text::FontRole::Serif);
        let quoted = format!("\u{201c}{subtitle}\u{201d}");
        let sub_lines = wrap_text(measure, sub_style, SUBTITLE_SIZE, WRAP_WIDTH, &quoted);
        let subtitle_y = start_y + lines.len() as f64 * line_height + 20.0;
        for (i, line) in sub_lines.iter().enumerate() {
            ops.push(FrameOp::TextLine {
                text: line.clone(),
                center_x,
                baseline: subtitle_y + i as f64 * SUBTITLE_LINE_HEIGHT,
                size: SUBTITLE_SIZE,
                style: sub_style,
                color: SUBTITLE_COLOR,
                alpha: params.opacity,
            });
        }
    }

    ops.push(FrameOp::Watermark(watermark::watermark_ops(
        Point::new(50.0, height - 150.0),
        WATERMARK_SCALE,
        brand,
    )));

    FramePlan { canvas, ops }
}

/// Rasterize a planned frame to straight-alpha RGBA8.
pub fn rasterize(
    plan: &FramePlan,
    fonts: &FontSet,
    image: Option<&PreparedImage>,
) -> FrameRgba {
    let mut frame = FrameRgba::solid(plan.canvas, BACKGROUND);
    for op in &plan.ops {
        match op {
            FrameOp::ImageCover { dest, opacity } => {
                if let Some(img) = image {
                    blit_cover(&mut frame, img, *dest, *opacity);
                }
            }
            FrameOp::GradientOverlay => gradient_overlay(&mut frame),
            FrameOp::TextLine {
                text,
                center_x,
                baseline,
                size,
                style,
                color,
                alpha,
            } => {
                let line_width = f64::from(fonts.text_width(*style, *size, text));
                raster::draw_text_run(
                    &mut frame,
                    fonts,
                    *style,
                    *size,
                    text,
                    center_x - line_width / 2.0,
                    *baseline,
                    0.0,
                    color.with_alpha_factor(*alpha),
                );
            }
            FrameOp::Underline {
                line,
                width,
                color,
                alpha,
            } => {
                raster::stroke_line(&mut frame, *line, *width, color.with_alpha_factor(*alpha));
            }
            FrameOp::Watermark(ops) => watermark::rasterize_watermark(&mut frame, ops, fonts),
        }
    }
    frame
}

/// Plan and rasterize in one call.
pub fn render_frame(
    canvas: Canvas,
    slide: &Slide,
    fonts: &FontSet,
    image: Option<&PreparedImage>,
    params: RenderParams,
    brand: &BrandMark,
) -> FrameRgba {
    let dims = image.map(|i| (i.width, i.height));
    let plan = plan_frame(canvas, slide, fonts, dims, params, brand);
    rasterize(&plan, fonts, image)
}

/// Aspect-preserving cover placement with an extra centered zoom.
fn cover_rect(width: f64, height: f64, img_w: u32, img_h: u32, scale: f64) -> Rect {
    let img_ratio = f64::from(img_w) / f64::from(img_h);
    let canvas_ratio = width / height;
    let (render_w, render_h) = if img_ratio > canvas_ratio {
        (f64::from(img_w) * (height / f64::from(img_h)), height)
    } else {
        (width, f64::from(img_h) * (width / f64::from(img_w)))
    };
    let offset_x = (width - render_w) / 2.0;
    let offset_y = (height - render_h) / 2.0;
    let zoomed_w = render_w * scale;
    let zoomed_h = render_h * scale;
    let x0 = offset_x - (zoomed_w - render_w) / 2.0;
    let y0 = offset_y - (zoomed_h - render_h) / 2.0;
    Rect::new(x0, y0, x0 + zoomed_w, y0 + zoomed_h)
}

/// Blit an image into `dest` with bilinear sampling, clipped to the frame.
fn blit_cover(frame: &mut FrameRgba, img: &PreparedImage, dest: Rect, opacity: f64) {
    if dest.width() <= 0.0 || dest.height() <= 0.0 || opacity <= 0.0 {
        return;
    }
    let x0 = dest.x0.max(0.0).floor() as i64;
    let y0 = dest.y0.max(0.0).floor() as i64;
    let x1 = dest.x1.min(f64::from(frame.width)).ceil() as i64;
    let y1 = dest.y1.min(f64::from(frame.height)).ceil() as i64;
    for y in y0..y1 {
        let v = ((y as f64 + 0.5 - dest.y0) / dest.height()) * f64::from(img.height) - 0.5;
        for x in x0..x1 {
            let u = ((x as f64 + 0.5 - dest.x0) / dest.width()) * f64::from(img.width) - 0.5;
            let [r, g, b, a] = sample_bilinear(img, u as f32, v as f32);
            let alpha = (f64::from(a) * opacity).round() as u8;
            frame.blend_pixel(x, y, Rgba8::new(r, g, b, alpha));
        }
    }
}

fn sample_bilinear(img: &PreparedImage, u: f32, v: f32) -> [u8; 4] {
    let max_x = (img.width - 1) as f32;
    let max_y = (img.height - 1) as f32;
    let u = u.clamp(0.0, max_x);
    let v = v.clamp(0.0, max_y);
    let x0 = u.floor() as u32;
    let y0 = v.floor() as u32;
    let x1 = (x0 + 1).min(img.width - 1);
    let y1 = (y0 + 1).min(img.height - 1);
    let fx = u - x0 as f32;
    let fy = v - y0 as f32;

    let px = |x: u32, y: u32| -> [f32; 4] {
        let i = ((y * img.width + x) * 4) as usize;
        [
            f32::from(img.rgba8[i]),
            f32::from(img.rgba8[i + 1]),
            f32::from(img.rgba8[i + 2]),
            f32::from(img.rgba8[i + 3]),
        ]
    };
    let (a, b, c, d) = (px(x0, y0), px(x1, y0), px(x0, y1), px(x1, y1));
    let mut out = [0u8; 4];
    for ch in 0..4 {
        let top = lerp(a[ch], b[ch], fx);
        let bottom = lerp(c[ch], d[ch], fx);
        out[ch] = lerp(top, bottom, fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Darken toward the bottom so text stays legible over any image.
fn gradient_overlay(frame: &mut FrameRgba) {
    let height = f64::from(frame.height);
    for y in 0..frame.height {
        // Gradient parameter runs 0 at the bottom edge to 1 at the top.
        let t = (height - (f64::from(y) + 0.5)) / height;
        let alpha = if t <= 0.4 {
            lerp(1.0_f32, 0.6, (t / 0.4) as f32)
        } else {
            lerp(0.6_f32, 0.0, ((t - 0.4) / 0.6) as f32)
        };
        let a = (f64::from(alpha) * 255.0).round().clamp(0.0, 255.0) as u8;
        if a == 0 {
            continue;
        }
        let color = Rgba8::new(0, 0, 0, a);
        for x in 0..frame.width {
            frame.blend_pixel(i64::from(x), i64::from(y), color);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
