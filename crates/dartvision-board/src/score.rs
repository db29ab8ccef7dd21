use log::debug;
use nalgebra::{Point2, Vector2};

use crate::board::{BoardGeometry, SECTOR_ORDER};
use crate::dart::{Dart, BASE_BULL, BASE_MISS, BASE_UNDETERMINED};

/// Rotation between the board's atan2 frame and sector 0's wire boundary.
const ANGLE_REFERENCE_DEG: f32 = 81.0;

const SECTOR_WIDTH_DEG: f32 = 18.0;

/// Convert a board-coordinate impact point into a scored dart via polar
/// decomposition around the board center.
pub fn score_position(location: Point2<f32>, geometry: &BoardGeometry) -> Dart {
    // Flip y so angles run counter-clockwise in board-facing orientation.
    let v = Vector2::new(
        location.x - geometry.center.x,
        geometry.center.y - location.y,
    );
    let magnitude = v.norm();
    let angle = (v.y.atan2(v.x).to_degrees() + 360.0 - ANGLE_REFERENCE_DEG).rem_euclid(360.0);

    let sector = (angle / SECTOR_WIDTH_DEG) as usize;
    let mut base = SECTOR_ORDER
        .get(sector)
        .map_or(BASE_UNDETERMINED, |&b| i32::from(b));

    let mut multiplier = 0u8;
    let mut inside_board = false;
    for (ring, radius) in geometry.ring_radii.iter().enumerate() {
        if magnitude <= *radius {
            match ring {
                0 => {
                    base = BASE_BULL;
                    multiplier = 2;
                }
                1 => {
                    base = BASE_BULL;
                    multiplier = 1;
                }
                3 => multiplier = 3,
                5 => multiplier = 2,
                _ => multiplier = 1,
            }
            inside_board = true;
            break;
        }
    }

    if !inside_board {
        debug!("miss: magnitude {magnitude:.1} beyond the outer ring");
        base = BASE_MISS;
        multiplier = 0;
    }

    Dart::new(base, multiplier, magnitude, angle, location)
}
