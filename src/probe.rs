//! Inspecting encoded videos with `ffprobe` / `ffmpeg`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{GlyphreelError, GlyphreelResult};

#[derive(Clone, Debug, serde::Serialize)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub codec_tag: Option<String>,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    /// Frames in the video stream, when the container records it.
    pub frame_count: Option<u64>,
    pub duration_sec: f64,
}

impl VideoInfo {
    pub fn fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_tag_string: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Read the first video stream's geometry, rate and length.
pub fn probe_video(path: &Path) -> GlyphreelResult<VideoInfo> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| GlyphreelError::encode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(GlyphreelError::encode(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(path, &out.stdout)
}

fn parse_probe_json(path: &Path, json: &[u8]) -> GlyphreelResult<VideoInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| GlyphreelError::encode(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            GlyphreelError::encode(format!("no video stream found in '{}'", path.display()))
        })?;
    let width = video
        .width
        .ok_or_else(|| GlyphreelError::encode("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| GlyphreelError::encode("missing video height from ffprobe"))?;
    let (fps_num, fps_den) = parse_ff_ratio(video.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| GlyphreelError::encode("invalid video r_frame_rate"))?;

    let duration_sec = video
        .duration
        .as_deref()
        .or_else(|| parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoInfo {
        path: path.to_path_buf(),
        codec_tag: video.codec_tag_string.clone(),
        width,
        height,
        fps_num,
        fps_den,
        frame_count: video.nb_frames.as_deref().and_then(|s| s.parse().ok()),
        duration_sec,
    })
}

/// Decode every frame of `info.path` to RGBA8, in presentation order.
pub fn decode_video_frames_rgba8(info: &VideoInfo) -> GlyphreelResult<Vec<FrameRGBA>> {
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(&info.path)
        .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
        .output()
        .map_err(|e| {
            GlyphreelError::encode(format!("failed to run ffmpeg for video decode: {e}"))
        })?;
    if !out.status.success() {
        return Err(GlyphreelError::encode(format!(
            "ffmpeg video decode failed for '{}': {}",
            info.path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let frame_len = info.width as usize * info.height as usize * 4;
    if frame_len == 0 {
        return Err(GlyphreelError::encode(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if !out.stdout.len().is_multiple_of(frame_len) {
        return Err(GlyphreelError::encode(format!(
            "decoded video has invalid size: got {} bytes, expected multiples of {frame_len}",
            out.stdout.len()
        )));
    }

    Ok(out
        .stdout
        .chunks_exact(frame_len)
        .map(|chunk| FrameRGBA {
            width: info.width,
            height: info.height,
            data: chunk.to_vec(),
        })
        .collect())
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let (a, b) = s.split_once('/')?;
    let a = a.parse::<u32>().ok()?;
    let b = b.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}
