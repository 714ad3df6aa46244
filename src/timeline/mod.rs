//! The run timeline: per-slide spans and per-frame animation parameters.

/// Timeline construction and fade/zoom ramps.
pub mod plan;
