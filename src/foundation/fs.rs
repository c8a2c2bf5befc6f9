//! Staged output paths.
//!
//! Outputs are written next to their final location under a hidden sibling name and renamed
//! into place only once complete, so an interrupted run never leaves a half-written glyph
//! directory or a truncated video where a previous good one used to be.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{GlyphreelError, GlyphreelResult};

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> GlyphreelResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Hidden sibling of `target`: `<parent>/.<name>.<tag>-<pid>`.
fn sibling_path(target: &Path, tag: &str) -> GlyphreelResult<PathBuf> {
    let name = target.file_name().ok_or_else(|| {
        GlyphreelError::validation(format!(
            "output path '{}' has no file name",
            target.display()
        ))
    })?;
    let sibling = format!(
        ".{}.{tag}-{}",
        name.to_string_lossy(),
        std::process::id()
    );
    Ok(match target.parent() {
        Some(parent) => parent.join(sibling),
        None => PathBuf::from(sibling),
    })
}

fn remove_any(path: &Path) -> std::io::Result<()> {
    if std::fs::symlink_metadata(path)?.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

fn path_exists(path: &Path) -> GlyphreelResult<bool> {
    match std::fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("failed to stat '{}'", path.display()))
            .into()),
    }
}

/// A directory that replaces `target` wholesale on [`StagedDir::commit`].
///
/// Dropping an uncommitted `StagedDir` removes the staging tree and leaves `target` untouched.
#[derive(Debug)]
pub struct StagedDir {
    target: PathBuf,
    staging: PathBuf,
    committed: bool,
}

impl StagedDir {
    pub fn new(target: impl Into<PathBuf>) -> GlyphreelResult<Self> {
        let target = target.into();
        ensure_parent_dir(&target)?;

        let staging = sibling_path(&target, "staging")?;
        if path_exists(&staging)? {
            remove_any(&staging).with_context(|| {
                format!("failed to clear stale staging dir '{}'", staging.display())
            })?;
        }
        std::fs::create_dir(&staging)
            .with_context(|| format!("failed to create staging dir '{}'", staging.display()))?;
        tracing::debug!(staging = %staging.display(), target = %target.display(), "staging dir created");

        Ok(Self {
            target,
            staging,
            committed: false,
        })
    }

    /// Directory to write into.
    pub fn path(&self) -> &Path {
        &self.staging
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Swap the staged tree into place, discarding whatever `target` held before.
    pub fn commit(mut self) -> GlyphreelResult<PathBuf> {
        let old = sibling_path(&self.target, "old")?;
        let had_previous = path_exists(&self.target)?;

        if had_previous {
            if path_exists(&old)? {
                remove_any(&old)
                    .with_context(|| format!("failed to clear '{}'", old.display()))?;
            }
            std::fs::rename(&self.target, &old).with_context(|| {
                format!("failed to move aside previous '{}'", self.target.display())
            })?;
        }

        if let Err(e) = std::fs::rename(&self.staging, &self.target) {
            if had_previous {
                let _ = std::fs::rename(&old, &self.target);
            }
            return Err(anyhow::Error::new(e)
                .context(format!(
                    "failed to move '{}' into place at '{}'",
                    self.staging.display(),
                    self.target.display()
                ))
                .into());
        }
        self.committed = true;

        if had_previous && let Err(e) = remove_any(&old) {
            tracing::warn!(path = %old.display(), error = %e, "failed to remove previous output");
        }

        Ok(self.target.clone())
    }
}

impl Drop for StagedDir {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_dir_all(&self.staging);
        }
    }
}

/// A file that replaces `target` on [`StagedFile::commit`].
///
/// Dropping an uncommitted `StagedFile` deletes the partial file.
#[derive(Debug)]
pub struct StagedFile {
    target: PathBuf,
    partial: PathBuf,
    committed: bool,
}

impl StagedFile {
    pub fn new(target: impl Into<PathBuf>) -> GlyphreelResult<Self> {
        let target = target.into();
        ensure_parent_dir(&target)?;

        let partial = sibling_path(&target, "partial")?;
        if path_exists(&partial)? {
            remove_any(&partial)
                .with_context(|| format!("failed to clear stale '{}'", partial.display()))?;
        }

        Ok(Self {
            target,
            partial,
            committed: false,
        })
    }

    /// File to write into.
    pub fn path(&self) -> &Path {
        &self.partial
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn commit(mut self) -> GlyphreelResult<PathBuf> {
        if !path_exists(&self.partial)? {
            return Err(GlyphreelError::validation(format!(
                "nothing was written to '{}'",
                self.partial.display()
            )));
        }
        if cfg!(windows) && path_exists(&self.target)? {
            remove_any(&self.target)
                .with_context(|| format!("failed to replace '{}'", self.target.display()))?;
        }
        std::fs::rename(&self.partial, &self.target).with_context(|| {
            format!(
                "failed to move '{}' into place at '{}'",
                self.partial.display(),
                self.target.display()
            )
        })?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.partial);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/fs.rs"]
mod tests;
