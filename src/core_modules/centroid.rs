// THEORY:
// The `centroid` module holds the two coordinate types shared by the spatial
// layer. A `Point` is an integer pixel coordinate used while walking the
// grid; a `Centroid` is the floating-point mean position of one detected
// blob. A `Centroid` is a stateless, per-frame snapshot — it carries no
// identity of its own. Linking centroids across frames into persistent
// identities is the tracker's job.

/// An integer pixel coordinate on the frame grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// The pixel-mean position of one detected blob in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another centroid, the only metric the matcher
    /// uses.
    pub fn distance_to(&self, other: &Centroid) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::Centroid;

    #[test]
    fn distance_is_euclidean() {
        let a = Centroid::new(0.0, 0.0);
        let b = Centroid::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert!((b.distance_to(&a) - 5.0).abs() < 1e-12);
    }
}
