//! File-system adapters for the `ctr_igt` binary: a frame-directory
//! [`FrameSource`](igt_scan::FrameSource) and a k-nearest-neighbour
//! [`DigitClassifier`](igt_scan::DigitClassifier).

pub mod frames;
pub mod knn;

pub use frames::{FrameDir, load_rgb};
pub use knn::{KnnClassifier, load_gray};
