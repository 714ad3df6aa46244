use crate::foundation::error::{EracastError, EracastResult};

pub use kurbo::{Line, Point, Rect, Vec2};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Zero-based index of a frame on the output timeline.
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Output frame rate as a rational `num/den`.
pub struct Fps {
    /// Numerator; must be > 0.
    pub num: u32,
    /// Denominator; must be > 0.
    pub den: u32,
}

impl Fps {
    /// Validated constructor.
    pub fn new(num: u32, den: u32) -> EracastResult<Self> {
        if den == 0 {
            return Err(EracastError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(EracastError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert a frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Smallest whole frame count covering `secs` of playback.
    ///
    /// Values within 1e-9 frames of a whole number snap to it, so float
    /// noise from summed durations cannot add a spurious frame.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        let frames = secs * self.as_f64();
        let nearest = frames.round();
        let whole = if (frames - nearest).abs() < 1e-9 {
            nearest
        } else {
            frames.ceil()
        };
        whole.max(0.0) as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Output canvas dimensions in pixels.
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The 9:16 vertical reel canvas used for video generation.
    pub const REEL: Canvas = Canvas {
        width: 1080,
        height: 1920,
    };

    /// The 4:5 portrait canvas used for static post exports.
    pub const POST: Canvas = Canvas {
        width: 1080,
        height: 1350,
    };
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (straight, not premultiplied).
    pub a: u8,
}

impl Rgba8 {
    /// Construct from channel values.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Return this color with its alpha scaled by `factor` in [0,1].
    pub fn with_alpha_factor(self, factor: f64) -> Self {
        let a = (f64::from(self.a) * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

/// A single fully composed frame in row-major straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes; length is `width * height * 4`.
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// Allocate a frame filled with an opaque solid color.
    pub fn solid(canvas: Canvas, color: Rgba8) -> Self {
        let px = [color.r, color.g, color.b, 255];
        let mut data = Vec::with_capacity((canvas.width * canvas.height * 4) as usize);
        for _ in 0..(canvas.width * canvas.height) {
            data.extend_from_slice(&px);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    /// Read one pixel; out-of-bounds returns `None`.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Blend a straight-alpha color over the pixel at `(x, y)`.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba8) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        if color.a == 0 {
            return;
        }
        let i = ((y as u64 * u64::from(self.width) + x as u64) * 4) as usize;
        let sa = u16::from(color.a);
        let inv = 255 - sa;
        let blend = |dst: u8, src: u8| -> u8 {
            crate::foundation::math::mul_div255_u8(u16::from(src), sa)
                .saturating_add(crate::foundation::math::mul_div255_u8(u16::from(dst), inv))
        };
        self.data[i] = blend(self.data[i], color.r);
        self.data[i + 1] = blend(self.data[i + 1], color.g);
        self.data[i + 2] = blend(self.data[i + 2], color.b);
        // Frames start from an opaque background; alpha stays saturated.
        self.data[i + 3] = self.data[i + 3].max(color.a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
