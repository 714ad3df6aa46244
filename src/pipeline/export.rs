use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::warn;

use crate::assets::decode::{self, PreparedImage};
use crate::content::variation::{Slide, SlideDeck};
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::core::{Canvas, FrameRgba};
use crate::foundation::error::{EracastError, EracastResult};
use crate::render::frame::{RenderParams, render_frame};
use crate::render::text::FontSet;
use crate::render::watermark::BrandMark;

/// Compose one static post frame: the portrait canvas, no zoom, no fade.
pub fn render_post(
    slide: &Slide,
    fonts: &FontSet,
    image: Option<&PreparedImage>,
    brand: &BrandMark,
) -> FrameRgba {
    render_frame(
        Canvas::POST,
        slide,
        fonts,
        image,
        RenderParams {
            scale: 1.0,
            opacity: 1.0,
        },
        brand,
    )
}

/// Write a composed frame as a PNG file.
pub fn save_post_png(frame: &FrameRgba, path: &Path) -> EracastResult<()> {
    ensure_parent_dir(path)?;
    image::save_buffer(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Write a slide's raw generated art, untouched by the compositor.
pub fn save_art(slide: &Slide, path: &Path) -> EracastResult<()> {
    let bytes = slide
        .image
        .as_ref()
        .ok_or_else(|| EracastError::validation("slide has no image to export"))?;
    ensure_parent_dir(path)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("write art '{}'", path.display()))?;
    Ok(())
}

/// Filename for a composited post export.
pub fn post_filename(brand: &BrandMark, era: &str) -> String {
    format!("{}_post-{}.png", brand.slug, normalize_era(era))
}

/// Filename for a raw art export.
pub fn art_filename(brand: &BrandMark, era: &str) -> String {
    format!("{}_arte-{}.png", brand.slug, normalize_era(era))
}

/// Filename base for the generated video, without extension.
pub fn video_filename(brand: &BrandMark, era: &str) -> String {
    format!("{}_video-{}", brand.slug, normalize_era(era))
}

/// Filename for one entry of a whole-deck export.
pub fn deck_filename(brand: &BrandMark, era: &str, index: usize) -> String {
    format!("{}-{}-{}.png", brand.slug, normalize_era(era), index)
}

fn normalize_era(era: &str) -> String {
    era.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Render and save a composited post for every slide carrying an image.
///
/// Slides whose image fails to decode are skipped with a warning. Returns
/// the written paths in deck order.
pub fn save_all_posts(
    deck: &SlideDeck,
    fonts: &FontSet,
    brand: &BrandMark,
    out_dir: &Path,
) -> EracastResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (i, slide) in deck.slides.iter().enumerate() {
        let Some(bytes) = &slide.image else { continue };
        let image = match decode::decode_image(bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!(slide = i, error = %e, "image decode failed; skipping export");
                continue;
            }
        };
        let frame = render_post(slide, fonts, Some(&image), brand);
        let path = out_dir.join(deck_filename(brand, &slide.era, i));
        save_post_png(&frame, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/export.rs"]
mod tests;
