use crate::content::variation::{GenerationMode, TransformationResponse};
use crate::foundation::error::EracastResult;

/// Request for a variation-synthesis call.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VariationRequest {
    /// The user's input phrase.
    pub phrase: String,
    /// How the phrase should be expanded.
    pub mode: GenerationMode,
    /// Optional user photo (encoded PNG/JPEG) used for image generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<u8>>,
}

/// Request to re-touch one slide image with a free-form instruction.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageEditRequest {
    /// The image to edit (encoded bytes).
    pub image: Vec<u8>,
    /// Natural-language edit instruction.
    pub instruction: String,
}

/// Generative backend producing variations and image edits.
///
/// Implementations talk to whatever model API the host application uses;
/// the engine never performs network IO itself.
pub trait ContentService {
    /// Expand a phrase into slide variations.
    fn synthesize_variations(
        &mut self,
        request: &VariationRequest,
    ) -> EracastResult<TransformationResponse>;

    /// Produce an edited version of a slide image.
    ///
    /// Returns the edited image bytes; an empty result means the edit
    /// produced nothing usable.
    fn edit_image(&mut self, request: &ImageEditRequest) -> EracastResult<Vec<u8>>;
}

/// Text-to-speech backend.
pub trait SpeechSynthesizer {
    /// Synthesize narration for `text`.
    ///
    /// Returns base64-encoded 16-bit little-endian PCM, mono, 24 kHz.
    fn synthesize(&mut self, text: &str) -> EracastResult<String>;
}

/// Fetches a remote audio track by URL.
pub trait TrackFetcher {
    /// Fetch the encoded bytes of the track at `url`.
    fn fetch(&mut self, url: &str) -> EracastResult<Vec<u8>>;
}
