//! Font loading and single-line rasterization.

mod font_system;
mod raster;

pub use font_system::{FontId, FontLoadError, FontSystem};
pub use raster::TextMask;
