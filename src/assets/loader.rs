use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::assets::decode::{self, AudioPcm, PreparedImage};
use crate::content::ambience::AmbienceKey;
use crate::content::service::{SpeechSynthesizer, TrackFetcher};
use crate::content::variation::SlideDeck;
use crate::foundation::error::{EracastError, EracastResult};

/// Sample rate of the mixed output and of decoded music beds.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Everything a render run needs, fully decoded up front.
#[derive(Clone, Debug)]
pub struct PreparedSlideAssets {
    /// One narration clip per slide, in deck order.
    pub narrations: Vec<AudioPcm>,
    /// Music beds that loaded successfully, keyed by ambience.
    pub music: BTreeMap<AmbienceKey, AudioPcm>,
    /// One decoded image per slide; `None` when absent or undecodable.
    pub images: Vec<Option<PreparedImage>>,
}

impl PreparedSlideAssets {
    /// Synthesize and decode every asset the deck needs.
    ///
    /// Narration is mandatory: any synthesis or decode failure aborts the
    /// load. Music beds degrade: a failed fetch or decode logs a warning and
    /// leaves every key using that track silent. Images degrade to `None`.
    pub fn prepare(
        deck: &SlideDeck,
        speech: &mut dyn SpeechSynthesizer,
        tracks: &mut dyn TrackFetcher,
        progress: &mut dyn FnMut(&str),
    ) -> EracastResult<Self> {
        let mut narrations = Vec::with_capacity(deck.slides.len());
        for (i, slide) in deck.slides.iter().enumerate() {
            progress(&format!(
                "Gerando narração {} de {}...",
                i + 1,
                deck.slides.len()
            ));
            let payload = speech.synthesize(&slide.text).map_err(|e| {
                EracastError::asset(format!("narration synthesis failed for slide {i}: {e}"))
            })?;
            let pcm = decode::decode_narration_base64(&payload).map_err(|e| {
                EracastError::asset(format!("narration decode failed for slide {i}: {e}"))
            })?;
            narrations.push(pcm);
        }

        progress("Carregando trilhas sonoras...");
        let mut keys: Vec<AmbienceKey> = deck
            .slides
            .iter()
            .map(|s| AmbienceKey::for_level(s.level))
            .collect();
        keys.sort();
        keys.dedup();
        // Distinct keys can resolve to the same recording; each track is
        // fetched and decoded once and its samples shared across keys.
        let mut decoded: BTreeMap<&'static str, Option<AudioPcm>> = BTreeMap::new();
        let mut music = BTreeMap::new();
        for key in keys {
            let url = key.track_url();
            let bed = decoded
                .entry(url)
                .or_insert_with(|| match load_music_bed(tracks, url) {
                    Ok(pcm) => {
                        debug!(url, secs = pcm.duration_secs(), "music bed loaded");
                        Some(pcm)
                    }
                    Err(e) => {
                        warn!(url, error = %e, "music bed unavailable; spans stay silent");
                        None
                    }
                });
            if let Some(pcm) = bed {
                music.insert(key, pcm.clone());
            }
        }

        let images = deck
            .slides
            .iter()
            .enumerate()
            .map(|(i, slide)| match &slide.image {
                None => None,
                Some(bytes) => match decode::decode_image(bytes) {
                    Ok(img) => Some(img),
                    Err(e) => {
                        warn!(slide = i, error = %e, "image decode failed; rendering without it");
                        None
                    }
                },
            })
            .collect();

        Ok(Self {
            narrations,
            music,
            images,
        })
    }
}

fn load_music_bed(tracks: &mut dyn TrackFetcher, url: &str) -> EracastResult<AudioPcm> {
    let bytes = tracks.fetch(url)?;
    decode::decode_audio_f32_stereo(&bytes, MIX_SAMPLE_RATE)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
