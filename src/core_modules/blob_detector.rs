// THEORY:
// The `BlobDetector` is the engine of the spatial grouping layer. It turns one
// decoded frame into the list of centroid positions of every sufficiently
// large dark region in that frame.
//
// Key architectural principles & algorithm steps:
// 1.  **Darkness test**: each pixel is classified as foreground or background
//     by comparing its rounded perceptual luminance against the contrast
//     threshold. The test is fixed per pass, not adaptive.
// 2.  **Single scan**: the frame is walked once in row-major order. Background
//     pixels are marked visited and skipped. An unvisited foreground pixel
//     seeds a new blob.
// 3.  **Region growing**: from each seed the detector performs an iterative,
//     stack-based 4-connected flood fill (up/down/left/right, bounds-checked).
//     An explicit stack avoids recursion depth limits on large regions.
//     Pixels are marked visited as they are pushed, so no pixel ever enters
//     the stack twice; every pixel in the frame is visited exactly once and
//     the whole pass is O(width * height).
// 4.  **Data aggregation**: the fill accumulates a coordinate sum and a pixel
//     count. When the stack empties, blobs meeting the size threshold emit a
//     centroid at the pixel-mean position; smaller regions are dropped as
//     noise, but their pixels stay visited.
// 5.  **Stateless utility**: `find_blobs` takes a frame and a configuration
//     and produces centroids for that frame only. The visited map and fill
//     stack are private per-call storage, so separate frames can be detected
//     concurrently by the caller. It has no memory of previous frames.

use crate::core_modules::centroid::{Centroid, Point};
use crate::core_modules::frame::FrameBuffer;

pub mod blob_detector {
    use super::*; // Make structs from parent module available.

    /// The two knobs the detector accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DetectorConfig {
        /// Minimum pixel count for a dark region to count as a real object
        /// rather than noise.
        pub size_threshold: usize,
        /// Luminance cutoff separating foreground from background. A pixel is
        /// foreground when its rounded luminance is at or below this value.
        pub contrast_threshold: u8,
    }

    impl Default for DetectorConfig {
        fn default() -> Self {
            Self {
                size_threshold: 0,
                contrast_threshold: 200,
            }
        }
    }

    /// The main function of the spatial analysis layer.
    /// Scans one frame and identifies the centroid of every dark region at
    /// least `size_threshold` pixels large.
    pub fn find_blobs(frame: &FrameBuffer, config: &DetectorConfig) -> Vec<Centroid> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;

        let mut visited = vec![false; width * height];
        let mut stack: Vec<Point> = Vec::new();
        let mut centroids: Vec<Centroid> = Vec::new();

        for y in 0..height {
            for x in 0..width {
                if visited[y * width + x] {
                    continue;
                }
                if !frame
                    .pixel(x as u32, y as u32)
                    .is_dark(config.contrast_threshold)
                {
                    // Background contributes to no blob.
                    visited[y * width + x] = true;
                    continue;
                }

                // An unvisited foreground pixel seeds a new blob.
                if let Some(centroid) = grow_blob(
                    Point {
                        x: x as u32,
                        y: y as u32,
                    },
                    frame,
                    config,
                    &mut visited,
                    &mut stack,
                ) {
                    centroids.push(centroid);
                }
            }
        }

        centroids
    }

    /// Flood-fills one 4-connected dark region starting at `seed` and returns
    /// its centroid, or `None` when the region is below the size threshold.
    fn grow_blob(
        seed: Point,
        frame: &FrameBuffer,
        config: &DetectorConfig,
        visited: &mut [bool],
        stack: &mut Vec<Point>,
    ) -> Option<Centroid> {
        let width = frame.width() as usize;
        let max_x = frame.width() - 1;
        let max_y = frame.height() - 1;

        let mut sum_x: u64 = 0;
        let mut sum_y: u64 = 0;
        let mut pixel_count: u64 = 0;

        stack.push(seed);
        visited[seed.y as usize * width + seed.x as usize] = true;

        while let Some(current) = stack.pop() {
            sum_x += current.x as u64;
            sum_y += current.y as u64;
            pixel_count += 1;

            // Check the 4 direct neighbors (not diagonals).
            let mut neighbors = [None; 4];
            if current.x > 0 {
                neighbors[0] = Some(Point {
                    x: current.x - 1,
                    y: current.y,
                });
            }
            if current.x < max_x {
                neighbors[1] = Some(Point {
                    x: current.x + 1,
                    y: current.y,
                });
            }
            if current.y > 0 {
                neighbors[2] = Some(Point {
                    x: current.x,
                    y: current.y - 1,
                });
            }
            if current.y < max_y {
                neighbors[3] = Some(Point {
                    x: current.x,
                    y: current.y + 1,
                });
            }

            for neighbor in neighbors.into_iter().flatten() {
                let index = neighbor.y as usize * width + neighbor.x as usize;
                if !visited[index] && frame.pixel(neighbor.x, neighbor.y).is_dark(config.contrast_threshold) {
                    visited[index] = true;
                    stack.push(neighbor);
                }
            }
        }

        if pixel_count as usize >= config.size_threshold {
            Some(Centroid::new(
                sum_x as f64 / pixel_count as f64,
                sum_y as f64 / pixel_count as f64,
            ))
        } else {
            None
        }
    }
}
