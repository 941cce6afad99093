// THEORY:
// The `pipeline` module is the top-level API for the engine: one `Analyzer`
// is one analysis session. It owns the ordered sequence of decoded frames,
// the detector configuration, and the current fly set, and it wires the two
// algorithmic layers together: for each incoming frame, run the blob
// detector once, then hand the centroids to the tracker.
//
// Key architectural principles:
// 1.  **Frames are kept**: every analyzed frame is stored (decoded) for the
//     lifetime of the session, because changing a detector parameter replays
//     the whole sequence from frame 0. The fly set is a pure function of
//     (ordered frames, configuration), never incrementally patched.
// 2.  **Atomic reanalysis**: a replay builds into a scratch tracker and only
//     replaces the visible fly set when the whole pass succeeds. Consumers
//     never observe a half-updated set.
// 3.  **Decoding at the boundary**: file I/O and image decoding happen here,
//     not in the core. A frame that fails to decode is reported and never
//     appended, so no partial update occurs for it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core_modules::blob_detector::blob_detector::{find_blobs, DetectorConfig};
use crate::core_modules::fly::Fly;
use crate::core_modules::frame::FrameBuffer;
use crate::core_modules::tracker::FlyTracker;
use crate::error::AnalysisError;

/// One analysis session over an ordered sequence of frames.
pub struct Analyzer {
    config: DetectorConfig,
    /// Stored frames in analysis order. `Arc` so a parallel replay can hand
    /// frames to worker tasks without copying pixel data.
    frames: Vec<Arc<FrameBuffer>>,
    /// Where each frame came from, when it came from a file.
    sources: Vec<Option<PathBuf>>,
    tracker: FlyTracker,
}

impl Analyzer {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            frames: Vec::new(),
            sources: Vec::new(),
            tracker: FlyTracker::new(),
        }
    }

    /// Detects blobs in one already-decoded frame and folds them into the
    /// fly set. The frame is appended as the next index in the sequence.
    pub fn analyze_frame(&mut self, frame: FrameBuffer) {
        self.analyze_from(frame, None);
    }

    /// Decodes an image file and analyzes it as the next frame. On decode
    /// failure nothing is appended and the fly set is untouched.
    pub fn analyze_file(&mut self, path: &Path) -> Result<(), AnalysisError> {
        let img = image::open(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), frame = self.frames.len(), "analyzing image");
        self.analyze_from(img.to_rgb8().into(), Some(path.to_path_buf()));
        Ok(())
    }

    fn analyze_from(&mut self, frame: FrameBuffer, source: Option<PathBuf>) {
        let frame_index = self.frames.len();
        let centroids = find_blobs(&frame, &self.config);
        debug!(frame = frame_index, blobs = centroids.len(), "frame detected");
        self.tracker.update(&centroids, frame_index);
        self.frames.push(Arc::new(frame));
        self.sources.push(source);
    }

    /// Updates the minimum blob size and, when any frames are stored, replays
    /// the whole sequence under the new setting.
    pub fn set_size_threshold(&mut self, size_threshold: usize) {
        if self.config.size_threshold == size_threshold {
            return;
        }
        self.config.size_threshold = size_threshold;
        if !self.frames.is_empty() {
            self.reanalyze();
        }
    }

    /// Updates the luminance cutoff and replays stored frames, like
    /// `set_size_threshold`.
    pub fn set_contrast_threshold(&mut self, contrast_threshold: u8) {
        if self.config.contrast_threshold == contrast_threshold {
            return;
        }
        self.config.contrast_threshold = contrast_threshold;
        if !self.frames.is_empty() {
            self.reanalyze();
        }
    }

    /// Replays detection and tracking from frame 0 over every stored frame.
    /// The rebuilt fly set replaces the visible one only once the pass is
    /// complete.
    pub fn reanalyze(&mut self) {
        info!(frames = self.frames.len(), "reanalyzing all frames");
        let mut scratch = FlyTracker::new();
        for (frame_index, frame) in self.frames.iter().enumerate() {
            let centroids = find_blobs(frame, &self.config);
            scratch.update(&centroids, frame_index);
        }
        self.tracker = scratch;
    }

    pub(crate) fn install_tracker(&mut self, tracker: FlyTracker) {
        self.tracker = tracker;
    }

    pub(crate) fn stored_frames(&self) -> &[Arc<FrameBuffer>] {
        &self.frames
    }

    /// Read-only view of the current fly set.
    pub fn flies(&self) -> &[Fly] {
        self.tracker.flies()
    }

    pub fn config(&self) -> DetectorConfig {
        self.config
    }

    /// Number of frames analyzed so far.
    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&FrameBuffer> {
        self.frames.get(index).map(|frame| frame.as_ref())
    }

    /// The file a frame was decoded from, when it came from one.
    pub fn frame_path(&self, index: usize) -> Option<&Path> {
        self.sources.get(index)?.as_deref()
    }

    /// Formats one summary row per fly — average velocity components and
    /// total distance over `[start, end]` — in the tabular export layout.
    /// Flies whose history does not cover the range are skipped with a
    /// warning.
    pub fn data_rows(&self, start: usize, end: usize) -> Vec<String> {
        let mut rows = Vec::with_capacity(self.flies().len());
        for fly in self.flies() {
            match (fly.average_velocity(start, end), fly.total_distance(start, end)) {
                (Ok((vx, vy)), Ok(distance)) => {
                    rows.push(format!(
                        "{:<8}, {:<14.6}, {:<14.6}, {:<14.6}",
                        format!("fly {}", fly.id()),
                        vx,
                        vy,
                        distance
                    ));
                }
                (Err(error), _) | (_, Err(error)) => {
                    warn!(fly = fly.id(), %error, "fly skipped in data report");
                }
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A white frame with one dark square at `(x, y)`.
    fn square_frame(x: u32, y: u32, side: u32) -> FrameBuffer {
        let (width, height) = (40u32, 40u32);
        let mut data = vec![255u8; (width * height * 3) as usize];
        for py in y..y + side {
            for px in x..x + side {
                let index = ((py * width + px) * 3) as usize;
                data[index] = 0;
                data[index + 1] = 0;
                data[index + 2] = 0;
            }
        }
        FrameBuffer::from_raw_rgb(width, height, data).unwrap()
    }

    fn config(size_threshold: usize) -> DetectorConfig {
        DetectorConfig {
            size_threshold,
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn session_tracks_a_moving_square() {
        let mut analyzer = Analyzer::new(config(4));
        for step in 0..3 {
            analyzer.analyze_frame(square_frame(5 + step, 5, 3));
        }
        assert_eq!(analyzer.total_frames(), 3);
        assert_eq!(analyzer.flies().len(), 1);
        let fly = &analyzer.flies()[0];
        assert_eq!(fly.birth_frame(), 0);
        assert_eq!(fly.velocity_at(2).unwrap(), (1.0, 0.0));
    }

    #[test]
    fn threshold_change_rebuilds_the_fly_set() {
        // One large square plus one 2x2 speck per frame.
        let mut analyzer = Analyzer::new(config(1));
        for step in 0..2 {
            let mut frame = square_frame(5 + step, 5, 4);
            let speck = square_frame(30, 30, 2);
            // Merge the speck into the frame by re-detecting both squares in
            // a single buffer.
            frame = merge(frame, speck);
            analyzer.analyze_frame(frame);
        }
        assert_eq!(analyzer.flies().len(), 2);

        // Raising the threshold above the speck size drops it from every
        // frame and rebuilds tracks from frame 0.
        analyzer.set_size_threshold(10);
        assert_eq!(analyzer.flies().len(), 1);
        assert_eq!(analyzer.flies()[0].birth_frame(), 0);

        // Lowering it brings the speck back.
        analyzer.set_size_threshold(1);
        assert_eq!(analyzer.flies().len(), 2);
    }

    #[test]
    fn decode_failure_leaves_session_unchanged() {
        let mut analyzer = Analyzer::new(config(1));
        analyzer.analyze_frame(square_frame(5, 5, 3));
        let result = analyzer.analyze_file(Path::new("/nonexistent/frame.png"));
        assert!(matches!(result, Err(AnalysisError::Io { .. })));
        assert_eq!(analyzer.total_frames(), 1);
        assert_eq!(analyzer.flies().len(), 1);
    }

    #[test]
    fn frame_bookkeeping_reports_sources() {
        let mut analyzer = Analyzer::new(config(1));
        analyzer.analyze_frame(square_frame(5, 5, 3));
        assert_eq!(analyzer.frame_path(0), None);
        assert!(analyzer.frame(0).is_some());
        assert!(analyzer.frame(1).is_none());
    }

    /// Overlays the dark pixels of `b` onto `a`.
    fn merge(a: FrameBuffer, b: FrameBuffer) -> FrameBuffer {
        let (width, height) = (a.width(), a.height());
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let pa = a.pixel(x, y);
                let pb = b.pixel(x, y);
                let dark = if pb.luminance() < pa.luminance() { pb } else { pa };
                data.extend_from_slice(&[dark.red, dark.green, dark.blue]);
            }
        }
        FrameBuffer::from_raw_rgb(width, height, data).unwrap()
    }
}
