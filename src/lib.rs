// THEORY:
// This file is the main entry point for the `flydentify` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (GUIs, exporters, the bundled
// command-line runner).
//
// The primary goal is to export the `Analyzer` session and its associated data
// structures (`DetectorConfig`, `Fly`, `AnalysisError`, etc.) as the clean,
// high-level interface for the whole engine. The internal modules
// (`core_modules`) hold the algorithmic pieces — the blob detector that turns
// a frame into centroids, and the tracker that turns centroid lists into
// persistent fly identities — and are re-exported selectively.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use crate::core_modules::blob_detector::blob_detector::{find_blobs, DetectorConfig};
pub use crate::core_modules::centroid::Centroid;
pub use crate::core_modules::fly::Fly;
pub use crate::core_modules::frame::FrameBuffer;
pub use crate::core_modules::tracker::FlyTracker;
pub use crate::error::AnalysisError;
pub use crate::pipeline::Analyzer;
