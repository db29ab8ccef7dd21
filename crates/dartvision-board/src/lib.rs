//! Board model for camera-based dart scoring: the canonical board geometry,
//! the image-to-board perspective calibration with its persistence, and the
//! polar sector/ring scoring of projected impact points.

mod board;
mod calibration;
mod dart;
mod score;
mod store;

pub use board::{BoardGeometry, DEFAULT_RING_RADII, SECTOR_COUNT, SECTOR_ORDER};
pub use calibration::{
    ensure_calibration, CalibrationData, CalibrationError, CalibrationOperator,
};
pub use dart::{Dart, BASE_BULL, BASE_MISS, BASE_UNDETERMINED};
pub use score::score_position;
pub use store::{CalibrationStore, StoreError};
