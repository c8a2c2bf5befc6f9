use std::path::Path;

use anyhow::Context as _;
use image::GrayImage;

use crate::{
    foundation::error::{GlyphreelError, GlyphreelResult},
    glyphs::alphabet::parse_code_point_file_name,
};

/// A rendered glyph directory loaded back into memory, for matching image cells to characters.
#[derive(Clone, Debug)]
pub struct GlyphSet {
    width: u32,
    height: u32,
    /// Sorted by code point.
    glyphs: Vec<(char, GrayImage)>,
}

impl GlyphSet {
    /// Load every `<code_point>.png` in `dir`.
    ///
    /// Other files are skipped with a warning. All glyphs must share one size.
    #[tracing::instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
    pub fn load(dir: &Path) -> GlyphreelResult<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            GlyphreelError::empty_input(format!(
                "cannot read glyph directory '{}': {e}",
                dir.display()
            ))
        })?;

        let mut glyphs = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("list glyph directory '{}'", dir.display()))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.ends_with(".png") {
                continue;
            }
            let Some(ch) = parse_code_point_file_name(&name) else {
                tracing::warn!(file = %name, "skipping glyph file without a code point name");
                continue;
            };
            let path = entry.path();
            let img = image::open(&path)
                .with_context(|| format!("decode glyph '{}'", path.display()))?
                .into_luma8();
            glyphs.push((ch, img));
        }

        Self::from_glyphs(glyphs).map_err(|e| match e {
            GlyphreelError::EmptyInput(_) => GlyphreelError::empty_input(format!(
                "no glyph images found in '{}'",
                dir.display()
            )),
            other => other,
        })
    }

    /// Build a set from in-memory glyphs.
    pub fn from_glyphs(mut glyphs: Vec<(char, GrayImage)>) -> GlyphreelResult<Self> {
        let Some((_, first)) = glyphs.first() else {
            return Err(GlyphreelError::empty_input("glyph set is empty"));
        };
        let (width, height) = first.dimensions();
        if width == 0 || height == 0 {
            return Err(GlyphreelError::validation("glyph images must be non-empty"));
        }
        for (ch, img) in &glyphs {
            if img.dimensions() != (width, height) {
                return Err(GlyphreelError::validation(format!(
                    "glyph {ch:?} is {}x{}, expected {width}x{height}",
                    img.width(),
                    img.height()
                )));
            }
        }

        glyphs.sort_by_key(|(ch, _)| *ch);
        glyphs.dedup_by_key(|(ch, _)| *ch);
        Ok(Self {
            width,
            height,
            glyphs,
        })
    }

    pub fn cell_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs.iter().map(|(ch, _)| *ch)
    }

    /// The glyph closest to `cell` by squared L2 distance. Ties go to the lowest code point.
    pub fn best_match(&self, cell: &GrayImage) -> GlyphreelResult<char> {
        if cell.dimensions() != (self.width, self.height) {
            return Err(GlyphreelError::validation(format!(
                "cell is {}x{}, glyphs are {}x{}",
                cell.width(),
                cell.height(),
                self.width,
                self.height
            )));
        }

        let mut best: Option<(u64, char)> = None;
        for (ch, glyph) in &self.glyphs {
            let d = squared_distance(cell.as_raw(), glyph.as_raw());
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, *ch));
            }
        }
        best.map(|(_, ch)| ch)
            .ok_or_else(|| GlyphreelError::empty_input("glyph set is empty"))
    }

    /// Tile `img` into glyph-sized cells, left to right and top to bottom, and match each one.
    ///
    /// Partial cells on the right and bottom edges are dropped.
    pub fn image_to_ascii(&self, img: &GrayImage) -> GlyphreelResult<Vec<String>> {
        let cols = img.width() / self.width;
        let rows = img.height() / self.height;

        let mut out = Vec::with_capacity(rows as usize);
        for row in 0..rows {
            let mut line = String::with_capacity(cols as usize);
            for col in 0..cols {
                let cell = image::imageops::crop_imm(
                    img,
                    col * self.width,
                    row * self.height,
                    self.width,
                    self.height,
                )
                .to_image();
                line.push(self.best_match(&cell)?);
            }
            out.push(line);
        }
        Ok(out)
    }
}

fn squared_distance(a: &[u8], b: &[u8]) -> u64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = i64::from(x) - i64::from(y);
            (d * d) as u64
        })
        .sum()
}

#[cfg(test)]
#[path = "../../tests/unit/glyphs/set.rs"]
mod tests;
