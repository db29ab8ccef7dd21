use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Sector could not be determined (numerical edge case).
pub const BASE_UNDETERMINED: i32 = -1;
pub const BASE_MISS: i32 = 0;
pub const BASE_BULL: i32 = 25;

/// One detected (or manually corrected) throw, immutable once logged.
///
/// `correctly_detected` is tri-state: `Some(true)` for an accepted machine
/// detection, `Some(false)` after a manual correction, `None` for a
/// placeholder filling a turn that was cut short.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dart {
    pub base: i32,
    pub multiplier: u8,
    pub magnitude: f32,
    pub angle: f32,
    pub location: Point2<f32>,
    pub correctly_detected: Option<bool>,
}

impl Dart {
    pub fn new(base: i32, multiplier: u8, magnitude: f32, angle: f32, location: Point2<f32>) -> Self {
        Self {
            base,
            multiplier,
            magnitude,
            angle,
            location,
            correctly_detected: Some(true),
        }
    }

    /// Zero-score placeholder for a dart that was never thrown.
    pub fn placeholder() -> Self {
        Self {
            base: BASE_MISS,
            multiplier: 0,
            magnitude: -1.0,
            angle: -1.0,
            location: Point2::origin(),
            correctly_detected: None,
        }
    }

    #[inline]
    pub fn score(&self) -> i32 {
        self.base * i32::from(self.multiplier)
    }
}
