use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::whole(24).unwrap(),
    }
}

#[test]
fn codec_tags_are_four_bytes() {
    assert_eq!(&VideoCodec::Mp4v.fourcc(), b"mp4v");
    assert_eq!(&VideoCodec::Avc1.fourcc(), b"avc1");
    assert_eq!(VideoCodec::default(), VideoCodec::Mp4v);
    assert_eq!(VideoCodec::Mp4v.to_string(), "mp4v");
}

#[test]
fn codec_parses_from_tag() {
    assert_eq!("mp4v".parse::<VideoCodec>().unwrap(), VideoCodec::Mp4v);
    assert_eq!("AVC1".parse::<VideoCodec>().unwrap(), VideoCodec::Avc1);
    assert_eq!("h264".parse::<VideoCodec>().unwrap(), VideoCodec::Avc1);
    assert!("xvid".parse::<VideoCodec>().is_err());
}

#[test]
fn sink_config_validation_catches_bad_values() {
    for codec in [VideoCodec::Mp4v, VideoCodec::Avc1] {
        assert!(validate_sink_config(&cfg(64, 48), codec).is_ok());
        assert!(validate_sink_config(&cfg(0, 48), codec).is_err());
        assert!(
            validate_sink_config(
                &SinkConfig {
                    width: 64,
                    height: 48,
                    fps: Fps { num: 0, den: 1 },
                },
                codec
            )
            .is_err()
        );
    }
}

#[test]
fn odd_sizes_are_accepted_for_mp4v_only() {
    assert!(validate_sink_config(&cfg(3, 2), VideoCodec::Mp4v).is_ok());
    assert!(validate_sink_config(&cfg(891, 81), VideoCodec::Mp4v).is_ok());
    assert!(matches!(
        validate_sink_config(&cfg(63, 48), VideoCodec::Avc1),
        Err(GlyphreelError::Validation(_))
    ));
    assert!(matches!(
        validate_sink_config(&cfg(64, 47), VideoCodec::Avc1),
        Err(GlyphreelError::Validation(_))
    ));
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn flatten_opaque_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_transparent_returns_bg() {
    let src = vec![200u8, 100, 50, 0];
    let mut dst = vec![0u8; 4];
    flatten_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_half_alpha_over_black() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_over_bg_to_opaque_rgba8(&mut dst, &src, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}
