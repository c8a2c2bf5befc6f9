//! Glyph bitmaps: rendering a font's character ramp to images and reading such a set back.

pub mod alphabet;
pub mod font;
pub mod raster;
pub mod render;
pub mod set;
