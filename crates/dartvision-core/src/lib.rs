//! Core geometry and grayscale image utilities for dart strike detection.
//!
//! This crate is intentionally small and purely computational. It does *not*
//! depend on any concrete camera backend or corner detector.

mod geometry;
mod homography;
mod image;
mod linefit;
mod logger;

pub use geometry::{
    closest_point_on_line, intersect_line_circle, line_frame_intersection,
    point_to_line_distance, Circle, Line, LineCircleIntersection, VectorLine,
};
pub use homography::{homography_from_4pt, Homography};
pub use image::{
    absdiff, box_blur, count_nonzero, threshold_binary, FrameSize, GrayImage, GrayImageView,
};
pub use linefit::{fit_line_robust, RobustLoss};
pub use logger::init_with_level;
