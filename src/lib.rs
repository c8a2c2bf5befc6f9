//! Glyphreel renders a font's character ramp into per-character bitmaps and assembles PNG frame
//! sequences into MP4 videos.
//!
//! - [`render_glyph_set`] writes `<code_point>.png` for each character of an [`Alphabet`]
//! - [`GlyphSet`] loads such a directory back and matches image cells to characters
//! - [`compose_video`] encodes a sorted directory of frames through the system `ffmpeg`
#![forbid(unsafe_code)]

mod foundation;

pub mod compose;
pub mod encode;
pub mod frames;
pub mod glyphs;
pub mod probe;

pub use crate::foundation::core::{Fps, FrameIndex, FrameRGBA};
pub use crate::foundation::error::{GlyphreelError, GlyphreelResult};
pub use crate::foundation::fs::{StagedDir, StagedFile};

pub use crate::compose::{ComposeConfig, ComposeReport, compose_video, stream_frames};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoCodec, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::frames::{FrameSequence, list_frames};
pub use crate::glyphs::alphabet::{
    Alphabet, DEFAULT_ALPHABET, code_point_file_name, parse_code_point_file_name,
};
pub use crate::glyphs::font::GlyphFont;
pub use crate::glyphs::raster::{GlyphBitmap, GlyphRasterizer, GlyphStatus, InkBounds};
pub use crate::glyphs::render::{GlyphRenderConfig, GlyphRenderReport, render_glyph_set};
pub use crate::glyphs::set::GlyphSet;
pub use crate::probe::{VideoInfo, is_ffprobe_on_path, probe_video};
