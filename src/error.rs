use std::path::PathBuf;

use thiserror::Error;

/// Error type for the whole analysis engine.
///
/// Query failures are deliberately loud: a missing position is reported as
/// `NotFound` rather than a default value, so a caller can tell "no fly there
/// that frame" apart from "fly stood still". Range errors never clamp.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A fly has no recorded position for the requested frame.
    #[error("fly {fly} has no recorded position for frame {frame}")]
    NotFound { fly: u64, frame: usize },

    /// A frame range query was malformed or reaches outside recorded history.
    #[error("invalid frame range {start}..={end} for fly {fly}")]
    InvalidRange { fly: u64, start: usize, end: usize },

    /// An image file could not be read or decoded. The offending frame is
    /// never appended to the session, so the track set stays consistent.
    #[error("failed to read image {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: image::ImageError,
    },

    /// A raw buffer did not match the declared frame geometry.
    #[error("frame buffer of {actual} bytes does not match {width}x{height} RGB ({expected} bytes)")]
    FrameGeometry {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// A background detection task failed to run to completion.
    #[error("detection worker failed: {0}")]
    Worker(String),
}
