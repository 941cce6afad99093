// THEORY:
// A `Fly` is the persistent identity the tracker maintains for one object
// across frames. Where a `Centroid` is a snapshot in a single frame, a `Fly`
// is that object's existence over time: an append-only position history
// indexed by frame number.
//
// Key architectural principles:
// 1.  **Append-only growth**: history only ever gains entries, one per frame
//     in which the fly was matched to a blob. It is never overwritten or
//     truncated within an analysis pass; the whole fly set is rebuilt from
//     frame 0 when parameters change.
// 2.  **Gaps are real**: a fly that goes unmatched for a frame simply has no
//     entry for it. Queries against such a frame fail with `NotFound` rather
//     than returning a default, so callers can tell "not seen" from
//     "stationary".
// 3.  **Derived queries**: velocity is the finite difference of positions
//     between adjacent frames; range queries (average velocity, total
//     distance) operate over an inclusive frame range and reject ranges that
//     reach outside recorded history.

use std::collections::BTreeMap;

use crate::core_modules::centroid::Centroid;
use crate::error::AnalysisError;

/// A per-frame displacement vector, decomposed into x and y components.
pub type Velocity = (f64, f64);

/// One tracked object and its position history across frames.
#[derive(Debug, Clone)]
pub struct Fly {
    /// A unique, persistent id within one analysis pass.
    id: u64,
    /// The first frame index at which this fly has a position.
    birth_frame: usize,
    /// Recorded positions, keyed by frame index. Sparse: unmatched frames
    /// have no entry.
    history: BTreeMap<usize, Centroid>,
}

impl Fly {
    /// Creates a fly born at `birth_frame` with its first observed position.
    pub(crate) fn new(id: u64, birth_frame: usize, position: Centroid) -> Self {
        let mut history = BTreeMap::new();
        history.insert(birth_frame, position);
        Self {
            id,
            birth_frame,
            history,
        }
    }

    /// Records the fly's position for a frame. Frames arrive in increasing
    /// order and each frame is recorded at most once per pass.
    pub(crate) fn record(&mut self, frame: usize, position: Centroid) {
        debug_assert!(frame > self.last_frame());
        self.history.insert(frame, position);
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn birth_frame(&self) -> usize {
        self.birth_frame
    }

    /// The most recent frame with a recorded position.
    pub fn last_frame(&self) -> usize {
        // History is never empty: a fly is born with its first entry.
        *self.history.keys().next_back().unwrap_or(&self.birth_frame)
    }

    /// The most recent recorded position. This is the anchor the matcher
    /// measures distances from, whether or not the fly was seen in the
    /// immediately preceding frame.
    pub fn last_position(&self) -> Centroid {
        self.history
            .values()
            .next_back()
            .copied()
            .unwrap_or(Centroid::new(0.0, 0.0))
    }

    /// The fly's position at `frame`, or `NotFound` when it has no entry.
    pub fn position_at(&self, frame: usize) -> Result<Centroid, AnalysisError> {
        self.history
            .get(&frame)
            .copied()
            .ok_or(AnalysisError::NotFound {
                fly: self.id,
                frame,
            })
    }

    /// The fly's displacement between `frame - 1` and `frame`. Fails with
    /// `NotFound` when either endpoint has no recorded position — including
    /// the birth frame, which has no predecessor.
    pub fn velocity_at(&self, frame: usize) -> Result<Velocity, AnalysisError> {
        if frame == 0 {
            return Err(AnalysisError::NotFound { fly: self.id, frame });
        }
        let previous = self.position_at(frame - 1)?;
        let current = self.position_at(frame)?;
        Ok((current.x - previous.x, current.y - previous.y))
    }

    /// Mean per-frame velocity over the inclusive range `[start, end]`.
    /// An empty range (`start == end`) is a zero vector.
    pub fn average_velocity(&self, start: usize, end: usize) -> Result<Velocity, AnalysisError> {
        self.check_range(start, end)?;
        if start == end {
            return Ok((0.0, 0.0));
        }
        let mut sum = (0.0, 0.0);
        for frame in start + 1..=end {
            let (vx, vy) = self.velocity_at(frame)?;
            sum.0 += vx;
            sum.1 += vy;
        }
        let steps = (end - start) as f64;
        Ok((sum.0 / steps, sum.1 / steps))
    }

    /// Sum of per-frame Euclidean displacement magnitudes over the inclusive
    /// range `[start, end]`.
    pub fn total_distance(&self, start: usize, end: usize) -> Result<f64, AnalysisError> {
        self.check_range(start, end)?;
        let mut total = 0.0;
        for frame in start + 1..=end {
            let (vx, vy) = self.velocity_at(frame)?;
            total += vx.hypot(vy);
        }
        Ok(total)
    }

    /// Range queries never clamp: a reversed range or one reaching outside
    /// recorded history is an error.
    fn check_range(&self, start: usize, end: usize) -> Result<(), AnalysisError> {
        if end < start || start < self.birth_frame || end > self.last_frame() {
            return Err(AnalysisError::InvalidRange {
                fly: self.id,
                start,
                end,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fly_on_diagonal() -> Fly {
        // Born at frame 1, moving (2, 1) per frame through frame 4.
        let mut fly = Fly::new(7, 1, Centroid::new(10.0, 20.0));
        fly.record(2, Centroid::new(12.0, 21.0));
        fly.record(3, Centroid::new(14.0, 22.0));
        fly.record(4, Centroid::new(16.0, 23.0));
        fly
    }

    #[test]
    fn position_queries_distinguish_absent_frames() {
        let fly = fly_on_diagonal();
        assert!(fly.position_at(2).is_ok());
        assert!(matches!(
            fly.position_at(0),
            Err(AnalysisError::NotFound { fly: 7, frame: 0 })
        ));
        assert!(matches!(
            fly.position_at(5),
            Err(AnalysisError::NotFound { .. })
        ));
    }

    #[test]
    fn velocity_is_a_finite_difference() {
        let fly = fly_on_diagonal();
        assert_eq!(fly.velocity_at(3).unwrap(), (2.0, 1.0));
        // The birth frame has no predecessor.
        assert!(fly.velocity_at(1).is_err());
    }

    #[test]
    fn velocity_across_a_gap_is_not_found() {
        let mut fly = Fly::new(0, 0, Centroid::new(0.0, 0.0));
        fly.record(2, Centroid::new(5.0, 0.0)); // frame 1 missing
        assert!(matches!(
            fly.velocity_at(2),
            Err(AnalysisError::NotFound { frame: 1, .. })
        ));
    }

    #[test]
    fn average_velocity_over_full_range() {
        let fly = fly_on_diagonal();
        let (vx, vy) = fly.average_velocity(1, 4).unwrap();
        assert!((vx - 2.0).abs() < 1e-12);
        assert!((vy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_frame_range_has_zero_motion() {
        let fly = fly_on_diagonal();
        assert_eq!(fly.average_velocity(2, 2).unwrap(), (0.0, 0.0));
        assert_eq!(fly.total_distance(2, 2).unwrap(), 0.0);
    }

    #[test]
    fn total_distance_sums_step_magnitudes() {
        let fly = fly_on_diagonal();
        let expected = 3.0 * (5.0f64).sqrt(); // three steps of (2, 1)
        assert!((fly.total_distance(1, 4).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn ranges_never_clamp() {
        let fly = fly_on_diagonal();
        assert!(matches!(
            fly.total_distance(3, 2),
            Err(AnalysisError::InvalidRange { start: 3, end: 2, .. })
        ));
        // Before birth and past the last recorded frame are both invalid.
        assert!(fly.average_velocity(0, 4).is_err());
        assert!(fly.average_velocity(1, 5).is_err());
    }
}
