// THEORY:
// The `tracker` module is the heart of the temporal layer. Its responsibility
// is to add "object permanence" to the system: it takes the stateless list of
// centroids the detector found in a single frame and associates them with the
// flies it was tracking from previous frames.
//
// This module solves the data association problem — greedily.
//
// Key architectural principles:
// 1.  **Greedy nearest neighbor**: existing flies are walked in creation
//     order; each claims the unclaimed centroid closest to its most recent
//     recorded position (ties to the lowest index). This is O(E * U) per
//     frame, which is fine for fly counts in the tens.
// 2.  **No distance cutoff**: a fly always claims its closest remaining
//     centroid, however far away. This is a known, deliberate limitation: if
//     blobs merge or vanish elsewhere a fly can jump across the frame instead
//     of going unmatched. Downstream velocity consumers depend on this
//     behavior, so it is preserved rather than "fixed".
// 3.  **Lifecycle**: leftover centroids each birth a new fly; flies are never
//     deleted within a pass. An unmatched fly simply gains no history entry
//     for the frame, leaving a gap in its trajectory.
// 4.  **Frame 0 is a reset**: updating at frame index 0 clears the fly set
//     first. A fresh analysis pass always begins this way, which makes the
//     fly set a pure function of the ordered centroid lists.
//
// Updates must arrive in frame order — matching depends on the previous
// frames' positions — so callers serialize calls to `update`.

use tracing::{debug, trace};

use crate::core_modules::centroid::Centroid;
use crate::core_modules::fly::Fly;

/// Maintains the set of `Fly` identities from one frame to the next.
#[derive(Debug, Default)]
pub struct FlyTracker {
    /// Flies in creation order. The matching walk relies on this order being
    /// stable across frames.
    flies: Vec<Fly>,
    /// Counter handing each new fly a unique id within the pass.
    next_id: u64,
}

impl FlyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one frame's detections into the fly set.
    ///
    /// `frame_index == 0` resets the set to empty before processing, which is
    /// how a fresh analysis pass begins.
    pub fn update(&mut self, centroids: &[Centroid], frame_index: usize) {
        if frame_index == 0 {
            self.flies.clear();
            self.next_id = 0;
        }

        // Centroids not yet claimed by an existing fly.
        let mut unclaimed: Vec<Centroid> = centroids.to_vec();
        let mut matched = 0usize;

        // --- 1. Matching ---
        // Each existing fly, in creation order, claims its nearest remaining
        // centroid, measured from its last recorded position.
        for fly in &mut self.flies {
            if unclaimed.is_empty() {
                break;
            }
            let anchor = fly.last_position();
            let mut closest_index = 0;
            let mut closest_distance = anchor.distance_to(&unclaimed[0]);
            for (index, candidate) in unclaimed.iter().enumerate().skip(1) {
                let distance = anchor.distance_to(candidate);
                if distance < closest_distance {
                    closest_distance = distance;
                    closest_index = index;
                }
            }

            let position = unclaimed.remove(closest_index);
            trace!(
                fly = fly.id(),
                frame = frame_index,
                distance = closest_distance,
                "matched centroid to fly"
            );
            fly.record(frame_index, position);
            matched += 1;
        }

        // --- 2. Birth ---
        // Any centroid still unclaimed becomes a brand-new fly.
        let born = unclaimed.len();
        for position in unclaimed {
            self.flies.push(Fly::new(self.next_id, frame_index, position));
            self.next_id += 1;
        }

        debug!(
            frame = frame_index,
            detections = centroids.len(),
            matched,
            born,
            flies = self.flies.len(),
            "tracker updated"
        );
    }

    /// Read-only view of the current fly set.
    pub fn flies(&self) -> &[Fly] {
        &self.flies
    }

    pub fn is_empty(&self) -> bool {
        self.flies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Centroid {
        Centroid::new(x, y)
    }

    #[test]
    fn detections_at_frame_zero_birth_flies() {
        let mut tracker = FlyTracker::new();
        tracker.update(&[c(5.0, 5.0), c(50.0, 50.0)], 0);
        let flies = tracker.flies();
        assert_eq!(flies.len(), 2);
        assert!(flies.iter().all(|fly| fly.birth_frame() == 0));
    }

    #[test]
    fn frame_zero_resets_prior_tracks() {
        let mut tracker = FlyTracker::new();
        tracker.update(&[c(1.0, 1.0), c(2.0, 2.0)], 0);
        tracker.update(&[c(1.5, 1.5)], 1);
        assert_eq!(tracker.flies().len(), 2);

        tracker.update(&[c(9.0, 9.0)], 0);
        assert_eq!(tracker.flies().len(), 1);
        assert_eq!(tracker.flies()[0].id(), 0);
        assert_eq!(tracker.flies()[0].birth_frame(), 0);
    }

    #[test]
    fn greedy_matching_picks_closest_pairing() {
        let mut tracker = FlyTracker::new();
        tracker.update(&[c(0.0, 0.0), c(10.0, 10.0)], 0);
        tracker.update(&[c(1.0, 1.0), c(9.0, 9.0)], 1);

        let flies = tracker.flies();
        assert_eq!(flies.len(), 2);
        assert_eq!(flies[0].position_at(1).unwrap(), c(1.0, 1.0));
        assert_eq!(flies[1].position_at(1).unwrap(), c(9.0, 9.0));
    }

    #[test]
    fn surplus_detections_become_new_flies() {
        let mut tracker = FlyTracker::new();
        tracker.update(&[c(0.0, 0.0)], 0);
        tracker.update(&[c(0.5, 0.5), c(30.0, 30.0)], 1);

        let flies = tracker.flies();
        assert_eq!(flies.len(), 2);
        assert_eq!(flies[0].birth_frame(), 0);
        assert_eq!(flies[1].birth_frame(), 1);
        assert_eq!(flies[1].position_at(1).unwrap(), c(30.0, 30.0));
    }

    #[test]
    fn unmatched_fly_gets_a_gap_not_a_deletion() {
        let mut tracker = FlyTracker::new();
        tracker.update(&[c(0.0, 0.0), c(20.0, 20.0)], 0);
        // Only one detection: the nearer fly claims it, the other sits out.
        tracker.update(&[c(0.5, 0.5)], 1);

        let flies = tracker.flies();
        assert_eq!(flies.len(), 2);
        assert!(flies[0].position_at(1).is_ok());
        assert!(flies[1].position_at(1).is_err());

        // The gapped fly matches again from its last known position.
        tracker.update(&[c(1.0, 1.0), c(21.0, 21.0)], 2);
        assert_eq!(flies_position(&tracker, 1, 2), c(21.0, 21.0));
    }

    #[test]
    fn no_distance_cutoff_means_far_matches_still_happen() {
        let mut tracker = FlyTracker::new();
        tracker.update(&[c(0.0, 0.0)], 0);
        // The only detection is far away; the fly claims it anyway.
        tracker.update(&[c(500.0, 500.0)], 1);
        assert_eq!(tracker.flies().len(), 1);
        assert_eq!(flies_position(&tracker, 0, 1), c(500.0, 500.0));
    }

    #[test]
    fn distance_ties_go_to_the_first_candidate() {
        let mut tracker = FlyTracker::new();
        tracker.update(&[c(0.0, 0.0)], 0);
        tracker.update(&[c(1.0, 0.0), c(-1.0, 0.0)], 1);
        assert_eq!(flies_position(&tracker, 0, 1), c(1.0, 0.0));
    }

    #[test]
    fn empty_detection_list_changes_nothing() {
        let mut tracker = FlyTracker::new();
        tracker.update(&[c(3.0, 3.0)], 0);
        tracker.update(&[], 1);
        assert_eq!(tracker.flies().len(), 1);
        assert!(tracker.flies()[0].position_at(1).is_err());
    }

    fn flies_position(tracker: &FlyTracker, fly_index: usize, frame: usize) -> Centroid {
        tracker.flies()[fly_index].position_at(frame).unwrap()
    }
}
