//! Frame compositor: a directory of PNG frames in, one MP4 out.

use std::path::PathBuf;

use crate::{
    encode::{
        ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoCodec, validate_sink_config},
        sink::{FrameSink, SinkConfig},
    },
    foundation::{
        core::{Fps, FrameIndex},
        error::GlyphreelResult,
        fs::StagedFile,
    },
    frames::FrameSequence,
};

pub const DEFAULT_FRAMES_DIR: &str = "output/frames";
pub const DEFAULT_OUT_PATH: &str = "output/text.mp4";
pub const DEFAULT_FPS: u32 = 24;

#[derive(Clone, Debug)]
pub struct ComposeConfig {
    pub frames_dir: PathBuf,
    /// Overwritten without confirmation.
    pub out_path: PathBuf,
    pub fps: Fps,
    pub codec: VideoCodec,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from(DEFAULT_FRAMES_DIR),
            out_path: PathBuf::from(DEFAULT_OUT_PATH),
            fps: Fps {
                num: DEFAULT_FPS,
                den: 1,
            },
            codec: VideoCodec::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ComposeReport {
    pub out_path: PathBuf,
    pub frames: usize,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

impl ComposeReport {
    /// Nominal playback length.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frames as u64)
    }
}

/// Push every frame of `seq` into `sink`, in order, one output frame per input file.
pub fn stream_frames(
    seq: &FrameSequence,
    fps: Fps,
    sink: &mut dyn FrameSink,
) -> GlyphreelResult<usize> {
    let (width, height) = seq.dimensions();
    sink.begin(SinkConfig { width, height, fps })?;
    for (i, frame) in seq.iter().enumerate() {
        let frame = frame?;
        sink.push_frame(FrameIndex(i as u64), &frame)?;
    }
    sink.end()?;
    Ok(seq.len())
}

/// Encode `cfg.frames_dir/*.png`, sorted by name, into an MP4 at `cfg.out_path`.
///
/// Input problems surface before any output exists. The video is encoded to a hidden sibling
/// file and moved over `out_path` only after ffmpeg finalizes it; a failed run leaves no file.
#[tracing::instrument(skip(cfg), fields(frames = %cfg.frames_dir.display(), out = %cfg.out_path.display()))]
pub fn compose_video(cfg: &ComposeConfig) -> GlyphreelResult<ComposeReport> {
    let seq = FrameSequence::open(&cfg.frames_dir)?;
    let (width, height) = seq.dimensions();
    validate_sink_config(
        &SinkConfig {
            width,
            height,
            fps: cfg.fps,
        },
        cfg.codec,
    )?;

    let staged = StagedFile::new(&cfg.out_path)?;
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(staged.path()).with_codec(cfg.codec));
    let frames = stream_frames(&seq, cfg.fps, &mut sink)?;
    drop(sink);
    let out_path = staged.commit()?;

    tracing::info!(
        frames,
        width,
        height,
        fps = %cfg.fps,
        codec = %cfg.codec,
        "video written"
    );
    Ok(ComposeReport {
        out_path,
        frames,
        width,
        height,
        fps: cfg.fps,
    })
}

#[cfg(test)]
#[path = "../tests/unit/compose.rs"]
mod tests;
