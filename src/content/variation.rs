use crate::foundation::error::{EracastError, EracastResult};

/// How a phrase is expanded into variations by the content service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Rewrite the phrase across historical eras (levels 1..=5).
    Chronological,
    /// Rewrite the phrase as seller personas, with a synthetic cover at level 0.
    SalesTypes,
    /// Single base avatar portrait.
    Avatar,
    /// Carousel of hook / content / CTA slides.
    SocialMedia,
    /// One persuasive single-image post.
    SingleImage,
}

/// One generated variation of the input phrase.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Variation {
    /// Dense sort key: 0 = cover, 1..N = variations. Not guaranteed contiguous.
    pub level: i32,
    /// Era or persona label shown above the slide text.
    pub era: String,
    /// Main slide text.
    pub text: String,
    /// Secondary text; only carried by the cover (level 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Short rationale shown alongside the variation.
    pub explanation: String,
    /// Encoded image bytes (PNG/JPEG), when an image was generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
}

/// Response of a variation-synthesis call.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TransformationResponse {
    /// Generated variations, any order; consumers sort by level.
    pub variations: Vec<Variation>,
    /// Optional social caption suggested alongside the variations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_suggestion: Option<String>,
}

impl TransformationResponse {
    /// Parse a service response from its JSON wire form.
    pub fn from_json(s: &str) -> EracastResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| EracastError::validation(format!("malformed variation response: {e}")))
    }

    /// Prepend the synthetic sales-mode cover slide (level 0) carrying the
    /// original phrase as its subtitle.
    pub fn prepend_sales_cover(&mut self, original_phrase: &str) {
        self.variations.insert(
            0,
            Variation {
                level: 0,
                era: "Capa".to_string(),
                text: "Que tipo de vendedor você é?".to_string(),
                subtitle: Some(original_phrase.to_string()),
                explanation: "Descubra seu perfil.".to_string(),
                image: None,
            },
        );
    }
}

/// One unit of renderable content: the original input, the cover, or a
/// generated variation.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Slide {
    /// −1 = original input, 0 = cover, 1..N = variation levels.
    pub level: i32,
    /// Era or persona label.
    pub era: String,
    /// Main text.
    pub text: String,
    /// Cover-only secondary text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Short rationale.
    pub explanation: String,
    /// Encoded image bytes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
}

impl Slide {
    /// True for the synthetic cover slide.
    pub fn is_cover(&self) -> bool {
        self.level == 0
    }

    /// Text as rendered on the canvas: the cover shouts, everything else is
    /// quoted speech.
    pub fn display_text(&self) -> String {
        if self.is_cover() {
            self.text.to_uppercase()
        } else {
            format!("\u{201c}{}\u{201d}", self.text)
        }
    }
}

/// Ordered slide sequence for one generation session.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SlideDeck {
    /// Slides in presentation order (original input first, then by level).
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    /// Build a deck from the user's original input plus a service response.
    ///
    /// The original phrase/photo becomes a level −1 slide at the front;
    /// variations follow in ascending level order.
    pub fn from_response(
        original_phrase: &str,
        original_image: Option<Vec<u8>>,
        response: &TransformationResponse,
    ) -> Self {
        let mut variations = response.variations.clone();
        variations.sort_by_key(|v| v.level);

        let mut slides = Vec::with_capacity(variations.len() + 1);
        slides.push(Slide {
            level: -1,
            era: "Entrada Original".to_string(),
            text: original_phrase.to_string(),
            subtitle: None,
            explanation: "Frase e imagem originais fornecidas.".to_string(),
            image: original_image,
        });
        for v in variations {
            slides.push(Slide {
                level: v.level,
                era: v.era,
                text: v.text,
                subtitle: v.subtitle,
                explanation: v.explanation,
                image: v.image,
            });
        }
        Self { slides }
    }

    /// Index of the anchor slide: the identity reference for a run.
    ///
    /// The cover (level 0) when present, else the first level-1 variation,
    /// else the first slide.
    pub fn anchor_index(&self) -> usize {
        for target in [0, 1] {
            if let Some(i) = self.slides.iter().position(|s| s.level == target) {
                return i;
            }
        }
        0
    }

    /// Validate deck invariants before a run.
    pub fn validate(&self) -> EracastResult<()> {
        if self.slides.is_empty() {
            return Err(EracastError::validation("deck must contain slides"));
        }
        for (i, slide) in self.slides.iter().enumerate() {
            if slide.text.trim().is_empty() {
                return Err(EracastError::validation(format!(
                    "slide {i} text must be non-empty"
                )));
            }
            if slide.era.trim().is_empty() {
                return Err(EracastError::validation(format!(
                    "slide {i} era label must be non-empty"
                )));
            }
            if slide.subtitle.is_some() && slide.level != 0 {
                return Err(EracastError::validation(format!(
                    "slide {i} carries a subtitle but is not the cover"
                )));
            }
        }
        Ok(())
    }

    /// Replace a slide's text (and, on the cover, its subtitle).
    pub fn apply_text_edit(
        &mut self,
        index: usize,
        text: String,
        subtitle: Option<String>,
    ) -> EracastResult<()> {
        let slide = self
            .slides
            .get_mut(index)
            .ok_or_else(|| EracastError::validation(format!("no slide at index {index}")))?;
        if text.trim().is_empty() {
            return Err(EracastError::validation("edited text must be non-empty"));
        }
        slide.text = text;
        if slide.level == 0 {
            slide.subtitle = subtitle;
        }
        Ok(())
    }

    /// Replace a slide's image with a freshly edited one.
    ///
    /// An empty payload means the edit produced nothing; the prior image is
    /// preserved unchanged and an error is reported.
    pub fn apply_image_edit(&mut self, index: usize, image: Vec<u8>) -> EracastResult<()> {
        let slide = self
            .slides
            .get_mut(index)
            .ok_or_else(|| EracastError::validation(format!("no slide at index {index}")))?;
        if image.is_empty() {
            return Err(EracastError::asset(
                "image edit produced no data; keeping previous image",
            ));
        }
        slide.image = Some(image);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/variation.rs"]
mod tests;
