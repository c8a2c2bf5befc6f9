use image::GrayImage;

use crate::{
    foundation::error::{GlyphreelError, GlyphreelResult},
    glyphs::font::{GlyphFont, InkRgba8, ShapedChar},
};

/// Inked pixel bounds of a glyph, in whole pixels relative to its layout box origin.
///
/// `x1`/`y1` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InkBounds {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl InkBounds {
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Bounds of all pixels in a grayscale image darker than `threshold`.
    pub fn of_ink(img: &GrayImage, threshold: u8) -> Option<Self> {
        let mut out: Option<Self> = None;
        for (x, y, px) in img.enumerate_pixels() {
            if px.0[0] >= threshold {
                continue;
            }
            let (x, y) = (x as i32, y as i32);
            out = Some(match out {
                None => Self {
                    x0: x,
                    y0: y,
                    x1: x + 1,
                    y1: y + 1,
                },
                Some(b) => Self {
                    x0: b.x0.min(x),
                    y0: b.y0.min(y),
                    x1: b.x1.max(x + 1),
                    y1: b.y1.max(y + 1),
                },
            });
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphStatus {
    /// The glyph put ink on the canvas.
    Inked,
    /// The font maps the character to an empty outline (e.g. space).
    Blank,
    /// The font has no glyph for the character; the canvas is left empty.
    Missing,
}

#[derive(Clone, Debug)]
pub struct GlyphBitmap {
    pub ch: char,
    pub status: GlyphStatus,
    /// Measured ink box before centering, if any.
    pub ink: Option<InkBounds>,
    /// Top-left of the ink box on the canvas. May be negative when the glyph overflows.
    pub position: (i32, i32),
    pub image: GrayImage,
}

/// Rasterizes single characters, black on white, centered in a square canvas.
pub struct GlyphRasterizer {
    font: GlyphFont,
    canvas_size: u16,
    /// Cached render context and the surface size it was built for.
    ctx: Option<((u16, u16), vello_cpu::RenderContext)>,
}

impl GlyphRasterizer {
    pub fn new(font: GlyphFont, canvas_size: u32) -> GlyphreelResult<Self> {
        if canvas_size == 0 {
            return Err(GlyphreelError::validation("canvas size must be > 0"));
        }
        let canvas_size: u16 = canvas_size
            .try_into()
            .map_err(|_| GlyphreelError::validation("canvas size exceeds u16"))?;
        Ok(Self {
            font,
            canvas_size,
            ctx: None,
        })
    }

    pub fn font(&self) -> &GlyphFont {
        &self.font
    }

    pub fn canvas_size(&self) -> u32 {
        u32::from(self.canvas_size)
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&GlyphFont, &mut vello_cpu::RenderContext) -> GlyphreelResult<R>,
    ) -> GlyphreelResult<R> {
        let mut ctx = match self.ctx.take() {
            Some((dims, ctx)) if dims == (width, height) => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&self.font, &mut ctx)?;
        self.ctx = Some(((width, height), ctx));
        Ok(out)
    }

    /// Measure the inked box of `ch` by rasterizing it onto a padded scratch surface.
    ///
    /// Returns `None` when the glyph leaves no ink.
    pub fn measure(&mut self, ch: char) -> GlyphreelResult<Option<InkBounds>> {
        let shaped = self.font.shape_char(ch);
        self.measure_shaped(&shaped)
    }

    fn measure_shaped(&mut self, shaped: &ShapedChar) -> GlyphreelResult<Option<InkBounds>> {
        if shaped.glyphs.is_empty() {
            return Ok(None);
        }

        let pad = shaped.font_size.ceil().max(1.0) as u32;
        let w = shaped.width.max(shaped.font_size).ceil() as u32 + 2 * pad;
        let h = shaped.height.max(shaped.font_size).ceil() as u32 + 2 * pad;
        let w: u16 = w
            .try_into()
            .map_err(|_| GlyphreelError::render("glyph scratch width exceeds u16"))?;
        let h: u16 = h
            .try_into()
            .map_err(|_| GlyphreelError::render("glyph scratch height exceeds u16"))?;

        let scratch = self.with_ctx_mut(w, h, |font, ctx| {
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            fill_background(ctx, w, h, InkRgba8::WHITE);
            draw_shaped(ctx, font, shaped, f64::from(pad), f64::from(pad));
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            pixmap_to_gray(&pixmap)
        })?;

        let pad = pad as i32;
        Ok(InkBounds::of_ink(&scratch, u8::MAX).map(|b| InkBounds {
            x0: b.x0 - pad,
            y0: b.y0 - pad,
            x1: b.x1 - pad,
            y1: b.y1 - pad,
        }))
    }

    /// Render `ch` centered on a white canvas.
    ///
    /// The glyph is placed so its ink box sits at `((canvas - w) / 2, (canvas - h) / 2)`,
    /// rounded to whole pixels. Glyphs larger than the canvas are clipped, never scaled.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn render(&mut self, ch: char) -> GlyphreelResult<GlyphBitmap> {
        let shaped = self.font.shape_char(ch);
        let ink = self.measure_shaped(&shaped)?;

        let status = match (ink, shaped.missing) {
            (Some(_), _) => GlyphStatus::Inked,
            (None, true) => GlyphStatus::Missing,
            (None, false) => GlyphStatus::Blank,
        };

        let size = self.canvas_size;
        let position = ink
            .map(|b| centered_position(u32::from(size), b))
            .unwrap_or((0, 0));

        let image = self.with_ctx_mut(size, size, |font, ctx| {
            let mut pixmap = vello_cpu::Pixmap::new(size, size);
            fill_background(ctx, size, size, InkRgba8::WHITE);
            if let Some(b) = ink {
                let dx = f64::from(position.0 - b.x0);
                let dy = f64::from(position.1 - b.y0);
                draw_shaped(ctx, font, &shaped, dx, dy);
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            pixmap_to_gray(&pixmap)
        })?;

        Ok(GlyphBitmap {
            ch,
            status,
            ink,
            position,
            image,
        })
    }
}

/// Top-left placement that centers an ink box of the given size in a square canvas.
pub fn centered_position(canvas: u32, ink: InkBounds) -> (i32, i32) {
    let c = canvas as i32;
    (
        (c - ink.width()).div_euclid(2),
        (c - ink.height()).div_euclid(2),
    )
}

fn fill_background(ctx: &mut vello_cpu::RenderContext, w: u16, h: u16, color: InkRgba8) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(w),
        f64::from(h),
    ));
}

fn draw_shaped(
    ctx: &mut vello_cpu::RenderContext,
    font: &GlyphFont,
    shaped: &ShapedChar,
    dx: f64,
    dy: f64,
) {
    let ink = InkRgba8::BLACK;
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((dx, dy)));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        ink.r, ink.g, ink.b, ink.a,
    ));
    let glyphs = shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
        id: g.id,
        x: g.x,
        y: g.y,
    });
    ctx.glyph_run(font.data())
        .font_size(shaped.font_size)
        .fill_glyphs(glyphs);
}

/// Collapse an opaque RGBA pixmap to 8-bit luma.
fn pixmap_to_gray(pixmap: &vello_cpu::Pixmap) -> GlyphreelResult<GrayImage> {
    let (w, h) = (u32::from(pixmap.width()), u32::from(pixmap.height()));
    let rgba = image::RgbaImage::from_raw(w, h, pixmap.data_as_u8_slice().to_vec())
        .ok_or_else(|| GlyphreelError::render("pixmap byte length mismatch"))?;
    Ok(image::DynamicImage::ImageRgba8(rgba).into_luma8())
}

#[cfg(test)]
#[path = "../../tests/unit/glyphs/raster.rs"]
mod tests;
