pub mod blob_detector;
pub mod centroid;
pub mod fly;
pub mod frame;
pub mod pixel;
pub mod tracker;
