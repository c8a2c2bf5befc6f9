//! PNG frame sequences on disk.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::{
    core::FrameRGBA,
    error::{GlyphreelError, GlyphreelResult},
};

/// Paths of every `*.png` in `dir`, sorted lexicographically by file name.
///
/// A missing directory, or one with no PNG files, is [`GlyphreelError::EmptyInput`].
pub fn list_frames(dir: &Path) -> GlyphreelResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        GlyphreelError::empty_input(format!(
            "cannot read frame directory '{}': {e}",
            dir.display()
        ))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list frame directory '{}'", dir.display()))?;
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(".png") {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Err(GlyphreelError::empty_input(format!(
            "no .png frames in '{}'",
            dir.display()
        )));
    }

    names.sort();
    Ok(names.into_iter().map(|n| dir.join(n)).collect())
}

/// Decode one frame to RGBA8, requiring the given dimensions.
pub fn read_frame_rgba8(path: &Path, expected: (u32, u32)) -> GlyphreelResult<FrameRGBA> {
    let img = image::open(path)
        .with_context(|| format!("decode frame '{}'", path.display()))?
        .into_rgba8();
    if img.dimensions() != expected {
        return Err(GlyphreelError::validation(format!(
            "frame '{}' is {}x{}, expected {}x{} (from the first frame)",
            path.display(),
            img.width(),
            img.height(),
            expected.0,
            expected.1
        )));
    }
    Ok(FrameRGBA::from_rgba_image(img))
}

/// An ordered list of frames plus the output size taken from the first one.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    paths: Vec<PathBuf>,
    width: u32,
    height: u32,
}

impl FrameSequence {
    pub fn open(dir: &Path) -> GlyphreelResult<Self> {
        let paths = list_frames(dir)?;
        let first = &paths[0];
        let (width, height) = image::image_dimensions(first)
            .with_context(|| format!("read dimensions of first frame '{}'", first.display()))?;
        if width == 0 || height == 0 {
            return Err(GlyphreelError::validation(format!(
                "first frame '{}' has zero size",
                first.display()
            )));
        }
        tracing::debug!(frames = paths.len(), width, height, "frame sequence opened");
        Ok(Self {
            paths,
            width,
            height,
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Decode frames lazily, in order.
    pub fn iter(&self) -> impl Iterator<Item = GlyphreelResult<FrameRGBA>> + '_ {
        let dims = self.dimensions();
        self.paths.iter().map(move |p| read_frame_rgba8(p, dims))
    }
}

#[cfg(test)]
#[path = "../tests/unit/frames.rs"]
mod tests;
