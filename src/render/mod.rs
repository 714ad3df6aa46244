//! The CPU slide compositor: layout planning and rasterization.

/// Frame layout and rasterization.
pub mod frame;
pub(crate) mod raster;
/// Font faces, measurement and word wrap.
pub mod text;
/// Brand watermark geometry.
pub mod watermark;
