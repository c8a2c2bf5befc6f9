use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::str::FromStr;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRGBA};
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::foundation::fs::ensure_parent_dir;

/// Video codec, identified by its four-character code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum VideoCodec {
    /// MPEG-4 Part 2 (`mp4v`).
    #[default]
    Mp4v,
    /// H.264 via libx264 (`avc1`).
    Avc1,
}

impl VideoCodec {
    pub fn fourcc(self) -> [u8; 4] {
        match self {
            Self::Mp4v => *b"mp4v",
            Self::Avc1 => *b"avc1",
        }
    }

    fn ffmpeg_args(self) -> &'static [&'static str] {
        match self {
            Self::Mp4v => &["-c:v", "mpeg4", "-q:v", "2", "-tag:v", "mp4v"],
            Self::Avc1 => &["-c:v", "libx264", "-tag:v", "avc1"],
        }
    }
}

impl std::fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(std::str::from_utf8(&self.fourcc()).map_err(|_| std::fmt::Error)?)
    }
}

impl FromStr for VideoCodec {
    type Err = GlyphreelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4v" => Ok(Self::Mp4v),
            "avc1" | "h264" => Ok(Self::Avc1),
            other => Err(GlyphreelError::validation(format!(
                "unsupported codec tag '{other}' (expected mp4v or avc1)"
            ))),
        }
    }
}

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    pub codec: VideoCodec,
    /// Background used to flatten translucent pixels (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            codec: VideoCodec::default(),
            bg_rgba: [0, 0, 0, 255],
        }
    }

    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }
}

/// Checks an output configuration against what `codec` can encode.
///
/// `avc1` (libx264 with yuv420p) needs even dimensions; `mp4v` takes any size.
pub fn validate_sink_config(cfg: &SinkConfig, codec: VideoCodec) -> GlyphreelResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(GlyphreelError::validation("fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(GlyphreelError::validation(
            "video width/height must be non-zero",
        ));
    }
    if codec == VideoCodec::Avc1
        && (!cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2))
    {
        return Err(GlyphreelError::validation(format!(
            "{codec} output needs even width/height (yuv420p), got {}x{}",
            cfg.width, cfg.height
        )));
    }
    Ok(())
}

impl FfmpegSink {
    /// Close stdin, wait for ffmpeg and collect its stderr.
    ///
    /// A non-zero exit becomes an [`GlyphreelError::Encode`] carrying ffmpeg's own message.
    fn finish_child(&mut self) -> GlyphreelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| GlyphreelError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            GlyphreelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| GlyphreelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| GlyphreelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(GlyphreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> GlyphreelResult<()> {
        validate_sink_config(&cfg, self.opts.codec)?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(GlyphreelError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(GlyphreelError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input: opaque RGBA8; alpha is flattened before writing to stdin (push_frame).
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an"]);
        cmd.args(self.opts.codec.ffmpeg_args());
        // The output path may be a staging name without an extension, so name the muxer.
        cmd.args(["-pix_fmt", "yuv420p", "-movflags", "+faststart", "-f", "mp4"]);
        cmd.arg(&self.opts.out_path);

        tracing::debug!(?cmd, "spawning ffmpeg");
        let mut child = cmd.spawn().map_err(|e| {
            GlyphreelError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GlyphreelError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| GlyphreelError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlyphreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| GlyphreelError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(GlyphreelError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(GlyphreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(GlyphreelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(GlyphreelError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        if let Err(write_err) = stdin.write_all(&self.scratch) {
            // ffmpeg usually closed the pipe because it failed; its stderr says why.
            self.finish_child()?;
            return Err(GlyphreelError::encode(format!(
                "failed to write frame to ffmpeg stdin: {write_err}"
            )));
        }
        Ok(())
    }

    fn end(&mut self) -> GlyphreelResult<()> {
        self.finish_child()?;
        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // Abandoned mid-stream: close stdin and reap the child so no zombie is left behind.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input frame rate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Composite straight-alpha RGBA8 over an opaque background.
fn flatten_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    bg_rgba: [u8; 4],
) -> GlyphreelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(GlyphreelError::validation(
            "flatten_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let r = mul_div255(s[0] as u16, a) + mul_div255(bg_r, inv);
        let g = mul_div255(s[1] as u16, a) + mul_div255(bg_g, inv);
        let b = mul_div255(s[2] as u16, a) + mul_div255(bg_b, inv);

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
