use dartvision_core::FrameSize;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

pub const SECTOR_COUNT: usize = 20;

/// Base values around the board, sector 0 starting at the top and
/// proceeding clockwise.
pub const SECTOR_ORDER: [u8; SECTOR_COUNT] = [
    20, 5, 12, 9, 14, 11, 8, 16, 7, 19, 3, 17, 2, 15, 10, 6, 13, 4, 18, 1,
];

/// Ring radii of the reference 800px-high board, innermost first:
/// double bull, single bull, inner single, triple, outer single, double.
pub const DEFAULT_RING_RADII: [f32; 6] = [14.0, 32.0, 194.0, 214.0, 320.0, 340.0];

const REFERENCE_BOARD_HEIGHT: f32 = 800.0;

/// Canonical board constants scaled to one working frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub center: Point2<f32>,
    pub ring_radii: [f32; 6],
    pub sector_angle: f32,
}

impl BoardGeometry {
    /// Board constants for a frame: center at the frame midpoint, default
    /// ring radii scaled proportionally to the frame height.
    pub fn for_frame(frame: FrameSize) -> Self {
        let center = Point2::new((frame.width / 2) as f32, (frame.height / 2) as f32);
        let scale = frame.height as f32 / REFERENCE_BOARD_HEIGHT;
        let mut ring_radii = DEFAULT_RING_RADII;
        for r in &mut ring_radii {
            *r *= scale;
        }

        Self {
            center,
            ring_radii,
            sector_angle: 2.0 * std::f32::consts::PI / SECTOR_COUNT as f32,
        }
    }

    #[inline]
    pub fn outer_radius(&self) -> f32 {
        self.ring_radii[5]
    }

    /// Anchor point on the outer double ring at the middle of the sector
    /// wire boundary `i` counts from. Used as a calibration destination.
    pub fn destination_point(&self, sector: usize) -> Point2<f32> {
        let angle = (0.5 + sector as f32) * self.sector_angle;
        self.center + Vector2::new(angle.cos(), angle.sin()) * self.outer_radius()
    }

    /// Ring radii must increase strictly from bull outward.
    pub fn has_monotonic_radii(&self) -> bool {
        self.ring_radii.windows(2).all(|w| w[0] < w[1])
    }
}
