use std::path::Path;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::error::GlyphreelError;

fn scratch_dir(tag: &str) -> PathBuf {
    let tmp = std::env::temp_dir().join(format!(
        "glyphreel_compose_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&tmp).unwrap();
    tmp
}

fn write_png(path: &Path, v: u8) {
    image::RgbaImage::from_pixel(4, 2, image::Rgba([v, 0, 0, 255]))
        .save(path)
        .unwrap();
}

#[test]
fn frames_reach_the_sink_in_name_order_exactly_once() {
    let dir = scratch_dir("order");
    write_png(&dir.join("0003.png"), 30);
    write_png(&dir.join("0001.png"), 10);
    write_png(&dir.join("0002.png"), 20);

    let seq = FrameSequence::open(&dir).unwrap();
    let mut sink = InMemorySink::new();
    let n = stream_frames(&seq, Fps::whole(24).unwrap(), &mut sink).unwrap();

    assert_eq!(n, 3);
    assert!(sink.is_finished());
    assert_eq!(
        sink.config(),
        Some(&SinkConfig {
            width: 4,
            height: 2,
            fps: Fps::whole(24).unwrap(),
        })
    );
    let reds: Vec<u8> = sink.frames().iter().map(|(_, f)| f.data[0]).collect();
    assert_eq!(reds, vec![10, 20, 30]);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2]);
}

#[test]
fn empty_frame_dir_fails_without_creating_output() {
    let dir = scratch_dir("empty");
    let out = dir.join("out").join("text.mp4");
    let cfg = ComposeConfig {
        frames_dir: dir.join("frames"),
        out_path: out.clone(),
        ..ComposeConfig::default()
    };
    std::fs::create_dir_all(&cfg.frames_dir).unwrap();

    assert!(matches!(
        compose_video(&cfg),
        Err(GlyphreelError::EmptyInput(_))
    ));
    assert!(!out.exists());
    assert!(!dir.join("out").exists());
}

#[test]
fn odd_sized_frames_fail_before_encoding_for_avc1() {
    let dir = scratch_dir("odd");
    image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 0, 0, 255]))
        .save(dir.join("0001.png"))
        .unwrap();
    let out = dir.join("text.mp4");
    let cfg = ComposeConfig {
        frames_dir: dir.clone(),
        out_path: out.clone(),
        codec: VideoCodec::Avc1,
        ..ComposeConfig::default()
    };

    assert!(matches!(
        compose_video(&cfg),
        Err(GlyphreelError::Validation(_))
    ));
    assert!(!out.exists());
}

#[test]
fn odd_sized_frames_stream_for_mp4v() {
    let dir = scratch_dir("odd_mp4v");
    for i in 1..=2 {
        image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 0, 0, 255]))
            .save(dir.join(format!("{i:04}.png")))
            .unwrap();
    }

    let seq = FrameSequence::open(&dir).unwrap();
    let sink_cfg = SinkConfig {
        width: 3,
        height: 2,
        fps: Fps::whole(24).unwrap(),
    };
    assert!(validate_sink_config(&sink_cfg, VideoCodec::Mp4v).is_ok());

    let mut sink = InMemorySink::new();
    assert_eq!(stream_frames(&seq, sink_cfg.fps, &mut sink).unwrap(), 2);
    assert_eq!(sink.config(), Some(&sink_cfg));
}

#[test]
fn defaults_match_fixed_paths() {
    let cfg = ComposeConfig::default();
    assert_eq!(cfg.frames_dir, PathBuf::from("output/frames"));
    assert_eq!(cfg.out_path, PathBuf::from("output/text.mp4"));
    assert_eq!(cfg.fps, Fps::whole(24).unwrap());
    assert_eq!(cfg.codec, VideoCodec::Mp4v);
}

#[test]
fn report_duration_follows_frame_rate() {
    let report = ComposeReport {
        out_path: PathBuf::from("x.mp4"),
        frames: 48,
        width: 2,
        height: 2,
        fps: Fps::whole(24).unwrap(),
    };
    assert!((report.duration_secs() - 2.0).abs() < 1e-12);
}
