// THEORY:
// The `parallel_pipeline` module provides the concurrent replay path. The
// detector is a stateless per-call utility, so separate frames can be
// detected at the same time; only the tracker demands frame order. A
// parallel reanalysis therefore runs in two phases:
//
// 1.  **Fan out**: every stored frame is handed to a blocking worker task
//     that runs `find_blobs`. Concurrency is bounded by a semaphore sized to
//     the machine's CPU count, so a long movie does not flood the blocking
//     pool.
// 2.  **Fold in order**: the per-frame centroid lists are collected in frame
//     order and replayed through a scratch tracker sequentially. The scratch
//     set replaces the visible fly set only when every frame succeeded; a
//     failed worker leaves the previous fly set untouched.
//
// The result is bit-identical to the serial `Analyzer::reanalyze`.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::core_modules::blob_detector::blob_detector::{find_blobs, DetectorConfig};
use crate::core_modules::centroid::Centroid;
use crate::core_modules::frame::FrameBuffer;
use crate::core_modules::tracker::FlyTracker;
use crate::error::AnalysisError;
use crate::pipeline::Analyzer;

/// Detects blobs in every frame concurrently, returning one centroid list
/// per frame in frame order.
pub async fn detect_frames(
    frames: &[Arc<FrameBuffer>],
    config: DetectorConfig,
) -> Result<Vec<Vec<Centroid>>, AnalysisError> {
    let limit = Arc::new(Semaphore::new(num_cpus::get().max(1)));
    let mut handles = Vec::with_capacity(frames.len());

    for frame in frames {
        let permit = limit
            .clone()
            .acquire_owned()
            .await
            .map_err(|error| AnalysisError::Worker(error.to_string()))?;
        let frame = Arc::clone(frame);
        handles.push(tokio::task::spawn_blocking(move || {
            let centroids = find_blobs(&frame, &config);
            drop(permit);
            centroids
        }));
    }

    let joined = futures::future::join_all(handles).await;
    let mut results = Vec::with_capacity(joined.len());
    for outcome in joined {
        results.push(outcome.map_err(|error| AnalysisError::Worker(error.to_string()))?);
    }
    Ok(results)
}

impl Analyzer {
    /// Parallel counterpart of `reanalyze`: detection fans out across worker
    /// tasks, tracking replays serially, and the rebuilt fly set is swapped
    /// in atomically on success.
    pub async fn reanalyze_parallel(&mut self) -> Result<(), AnalysisError> {
        info!(frames = self.total_frames(), "parallel reanalysis");
        let per_frame = detect_frames(self.stored_frames(), self.config()).await?;

        let mut scratch = FlyTracker::new();
        for (frame_index, centroids) in per_frame.iter().enumerate() {
            scratch.update(centroids, frame_index);
        }
        debug!(flies = scratch.flies().len(), "parallel reanalysis complete");
        self.install_tracker(scratch);
        Ok(())
    }
}
