use std::path::{Path, PathBuf};

use crate::foundation::error::{GlyphreelError, GlyphreelResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 ink color carried through Parley layouts.
pub struct InkRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl InkRgba8 {
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

/// A glyph positioned relative to the top-left corner of its layout box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Result of shaping a single character.
#[derive(Clone, Debug)]
pub struct ShapedChar {
    pub ch: char,
    pub font_size: f32,
    /// Drawable glyphs; `.notdef` is filtered out.
    pub glyphs: Vec<PlacedGlyph>,
    /// Layout box width (the advance).
    pub width: f32,
    /// Layout box height (the line box).
    pub height: f32,
    /// Set when the font has no glyph for at least one code point of `ch`.
    pub missing: bool,
}

/// A font file loaded at a fixed pixel size, ready for shaping and rasterizing.
pub struct GlyphFont {
    path: PathBuf,
    size_px: f32,
    family_name: String,
    data: vello_cpu::peniko::FontData,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<InkRgba8>,
}

impl std::fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFont")
            .field("path", &self.path)
            .field("size_px", &self.size_px)
            .field("family_name", &self.family_name)
            .finish_non_exhaustive()
    }
}

impl GlyphFont {
    /// Read and register the font at `path`.
    ///
    /// A missing file or bytes that do not parse as a font yield [`GlyphreelError::FontLoad`].
    #[tracing::instrument(level = "debug")]
    pub fn load(path: &Path, size_px: f32) -> GlyphreelResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(GlyphreelError::validation(
                "font size must be finite and > 0",
            ));
        }

        let bytes = std::fs::read(path).map_err(|e| {
            GlyphreelError::font_load(format!("failed to read font '{}': {e}", path.display()))
        })?;

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            GlyphreelError::font_load(format!(
                "'{}' does not contain a parsable font",
                path.display()
            ))
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| {
                GlyphreelError::font_load(format!(
                    "font family in '{}' has no name",
                    path.display()
                ))
            })?
            .to_string();

        tracing::debug!(family = %family_name, size_px, "font loaded");

        Ok(Self {
            path: path.to_path_buf(),
            size_px,
            family_name,
            data: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub(crate) fn data(&self) -> &vello_cpu::peniko::FontData {
        &self.data
    }

    /// Shape `ch` on a single unbroken line.
    pub fn layout_char(&mut self, ch: char, ink: InkRgba8) -> parley::Layout<InkRgba8> {
        let mut buf = [0u8; 4];
        let text: &str = ch.encode_utf8(&mut buf);

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(ink));

        let mut layout: parley::Layout<InkRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Shape `ch` and flatten the layout into drawable glyph positions.
    pub fn shape_char(&mut self, ch: char) -> ShapedChar {
        let layout = self.layout_char(ch, InkRgba8::BLACK);

        let mut glyphs = Vec::new();
        let mut missing = false;
        let mut font_size = self.size_px;
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                font_size = run.run().font_size();
                for g in run.positioned_glyphs() {
                    let id = g.id;
                    if id == 0 {
                        missing = true;
                        continue;
                    }
                    glyphs.push(PlacedGlyph {
                        id,
                        x: g.x,
                        y: g.y,
                    });
                }
            }
        }

        ShapedChar {
            ch,
            font_size,
            glyphs,
            width: layout.width(),
            height: layout.height(),
            missing,
        }
    }
}
