//! Slide content: the variation data model, ambience mapping, and the
//! collaborator interfaces the engine consumes.

/// Level-to-music-bed mapping.
pub mod ambience;
/// Generative/speech/track collaborator traits.
pub mod service;
/// Variations, slides and decks.
pub mod variation;
