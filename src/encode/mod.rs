//! Encoding sinks.
//!
//! Sinks consume frames in output order and finalize a container when the sequence ends.

/// `ffmpeg`-based MP4 output via the system `ffmpeg` binary.
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
