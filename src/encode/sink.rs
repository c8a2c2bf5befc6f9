use crate::foundation::core::{Fps, FrameIndex, FrameRGBA};
use crate::foundation::error::{GlyphreelError, GlyphreelResult};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    pub fps: Fps,
}

/// Consumer of frames in output order.
///
/// Ordering contract: `push_frame` is called with strictly increasing [`FrameIndex`] values,
/// starting at zero, between one `begin` and one `end`.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> GlyphreelResult<()>;
    /// Push the next frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlyphreelResult<()>;
    /// Flush and finalize the output.
    fn end(&mut self) -> GlyphreelResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames in the order they were pushed.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> GlyphreelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlyphreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| GlyphreelError::encode("in-memory sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(GlyphreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> GlyphreelResult<()> {
        self.finished = true;
        Ok(())
    }
}
