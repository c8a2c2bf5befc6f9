use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::{
        error::{GlyphreelError, GlyphreelResult},
        fs::StagedDir,
    },
    glyphs::{
        alphabet::{Alphabet, code_point_file_name},
        font::GlyphFont,
        raster::{GlyphRasterizer, GlyphStatus},
    },
};

/// Font used when none is named on the command line.
pub const DEFAULT_FONT_NAME: &str = "ComicMono";
/// Point size (and canvas side) used when none is given.
pub const DEFAULT_FONT_SIZE: u32 = 10;
/// Directory holding `<name>.ttf` files and their `<name>_chars/` outputs.
pub const DEFAULT_FONTS_DIR: &str = "fonts";

/// Glyph directory rendered for `font_name`: `<fonts_dir>/<font_name>_chars`.
pub fn glyph_dir(fonts_dir: &Path, font_name: &str) -> PathBuf {
    fonts_dir.join(format!("{font_name}_chars"))
}

/// Inputs for one glyph-set render.
#[derive(Clone, Debug)]
pub struct GlyphRenderConfig {
    pub font_path: PathBuf,
    /// Replaced wholesale by the render.
    pub out_dir: PathBuf,
    pub alphabet: Alphabet,
    /// Side length of the square output images, in pixels.
    pub canvas_size: u32,
    pub font_size: u32,
}

impl GlyphRenderConfig {
    /// Apply the `<fonts_dir>/<name>.ttf` -> `<fonts_dir>/<name>_chars/` convention, with a
    /// canvas as wide as the font size.
    pub fn from_font_name(fonts_dir: &Path, font_name: &str, font_size: u32) -> Self {
        Self {
            font_path: fonts_dir.join(format!("{font_name}.ttf")),
            out_dir: glyph_dir(fonts_dir, font_name),
            alphabet: Alphabet::default(),
            canvas_size: font_size,
            font_size,
        }
    }

    pub fn validate(&self) -> GlyphreelResult<()> {
        if self.font_size == 0 {
            return Err(GlyphreelError::validation("font size must be > 0"));
        }
        if self.canvas_size == 0 {
            return Err(GlyphreelError::validation("canvas size must be > 0"));
        }
        if self.canvas_size > u32::from(u16::MAX) {
            return Err(GlyphreelError::validation("canvas size exceeds 65535"));
        }
        if self.alphabet.is_empty() {
            return Err(GlyphreelError::validation("alphabet must not be empty"));
        }
        Ok(())
    }
}

/// Outcome of [`render_glyph_set`].
#[derive(Clone, Debug, Default)]
pub struct GlyphRenderReport {
    pub out_dir: PathBuf,
    pub family_name: String,
    /// Files written, in alphabet order.
    pub written: Vec<PathBuf>,
    /// Characters that rendered without ink (whitespace and the like).
    pub blank: Vec<char>,
    /// Characters the font has no glyph for; written as empty canvases.
    pub missing: Vec<char>,
}

/// Render every character of the alphabet to `<out_dir>/<code_point>.png`.
///
/// The font is loaded before anything touches the filesystem. Images are written into a
/// staging directory which then replaces `out_dir`, so the previous contents are either fully
/// kept (on error) or fully replaced.
#[tracing::instrument(skip(cfg), fields(font = %cfg.font_path.display(), out = %cfg.out_dir.display()))]
pub fn render_glyph_set(cfg: &GlyphRenderConfig) -> GlyphreelResult<GlyphRenderReport> {
    cfg.validate()?;

    let font = GlyphFont::load(&cfg.font_path, cfg.font_size as f32)?;
    let family_name = font.family_name().to_string();
    let mut rasterizer = GlyphRasterizer::new(font, cfg.canvas_size)?;

    let staged = StagedDir::new(&cfg.out_dir)?;
    let mut report = GlyphRenderReport {
        family_name,
        ..GlyphRenderReport::default()
    };

    for &ch in cfg.alphabet.chars() {
        let bmp = rasterizer.render(ch)?;
        match bmp.status {
            GlyphStatus::Inked => {}
            GlyphStatus::Blank => {
                if !ch.is_whitespace() {
                    tracing::warn!(?ch, "glyph rendered without ink");
                }
                report.blank.push(ch);
            }
            GlyphStatus::Missing => {
                tracing::warn!(?ch, code_point = u32::from(ch), "font has no glyph; writing empty canvas");
                report.missing.push(ch);
            }
        }

        let name = code_point_file_name(ch);
        let path = staged.path().join(&name);
        bmp.image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write glyph png '{}'", path.display()))?;
        tracing::trace!(?ch, position = ?bmp.position, "glyph written");

        report.written.push(cfg.out_dir.join(name));
    }

    report.out_dir = staged.commit()?;
    tracing::info!(
        count = report.written.len(),
        blank = report.blank.len(),
        missing = report.missing.len(),
        "glyph set rendered"
    );
    Ok(report)
}
