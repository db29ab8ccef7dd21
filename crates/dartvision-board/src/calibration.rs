use dartvision_core::{homography_from_4pt, FrameSize, Homography};
use log::{info, warn};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::board::BoardGeometry;
use crate::store::{CalibrationStore, StoreError};

#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("calibration transform has not been established")]
    NotCalibrated,
    #[error("reference points are degenerate; no perspective transform exists")]
    DegenerateReferencePoints,
    #[error("ring radii must increase monotonically")]
    InvalidRingRadii,
    #[error("operator aborted calibration before a transform was accepted")]
    Aborted,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Image-to-board mapping for one camera mount.
///
/// Created empty for a frame size, mutated only through `solve_transform`
/// during the calibration procedure, then persisted once an operator accepts
/// it. `project` is unavailable until a transform exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    pub frame: FrameSize,
    pub geometry: BoardGeometry,
    /// Perspective-transform source anchors at the frame's quadrant
    /// midpoints, in the order top-left, bottom-right, top-right,
    /// bottom-left.
    pub reference_points: [Point2<f32>; 4],
    /// Board sectors whose outer-ring anchors serve as transform
    /// destinations for the four reference points.
    pub dst_sectors: [usize; 4],
    pub offsets: [Vector2<f32>; 4],
    pub transform: Option<Homography>,
}

impl CalibrationData {
    pub fn new(frame: FrameSize) -> Self {
        let geometry = BoardGeometry::for_frame(frame);
        let quarter = frame.width.min(frame.height) as f32 / 4.0;
        let c = geometry.center;

        Self {
            frame,
            geometry,
            reference_points: [
                c + Vector2::new(-quarter, -quarter),
                c + Vector2::new(quarter, quarter),
                c + Vector2::new(quarter, -quarter),
                c + Vector2::new(-quarter, quarter),
            ],
            dst_sectors: [12, 2, 17, 7],
            offsets: [Vector2::zeros(); 4],
            transform: None,
        }
    }

    pub fn destination_points(&self) -> [Point2<f32>; 4] {
        self.dst_sectors.map(|i| self.geometry.destination_point(i))
    }

    /// Recompute the perspective transform for a set of operator-supplied
    /// pixel offsets against the reference points.
    pub fn solve_transform(
        &mut self,
        offsets: [Vector2<f32>; 4],
    ) -> Result<&Homography, CalibrationError> {
        let mut src = [Point2::origin(); 4];
        for (s, (p, o)) in src.iter_mut().zip(self.reference_points.iter().zip(&offsets)) {
            *s = p + o;
        }
        let dst = self.destination_points();

        let transform = homography_from_4pt(&src, &dst)
            .filter(|h| h.inverse().is_some())
            .ok_or(CalibrationError::DegenerateReferencePoints)?;

        self.offsets = offsets;
        Ok(self.transform.insert(transform))
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.transform.is_some()
    }

    /// Map one raw-image point into board coordinates.
    pub fn project(&self, point: Point2<f32>) -> Result<Point2<f32>, CalibrationError> {
        let transform = self.transform.as_ref().ok_or(CalibrationError::NotCalibrated)?;
        Ok(transform.apply(point))
    }

    /// Structural invariants checked when restoring a persisted snapshot.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !self.geometry.has_monotonic_radii() {
            return Err(CalibrationError::InvalidRingRadii);
        }
        if let Some(transform) = &self.transform {
            if transform.inverse().is_none() {
                return Err(CalibrationError::DegenerateReferencePoints);
            }
        }
        Ok(())
    }
}

/// The interactive adjustment surface (sliders, preview rendering) lives
/// outside this crate; the calibration procedure only needs these two
/// decisions from it.
pub trait CalibrationOperator {
    /// Propose the next offset set to try, or `None` to stop adjusting.
    fn adjust(&mut self, data: &CalibrationData) -> Option<[Vector2<f32>; 4]>;

    /// Final accept/reject of a proposed or restored calibration.
    fn confirm(&mut self, data: &CalibrationData) -> bool;
}

/// Establish a trusted calibration for this session.
///
/// A persisted snapshot is restored and re-confirmed by the operator against
/// the current frame first; on rejection (or no snapshot) the interactive
/// adjust/accept loop runs until the operator confirms a transform, which is
/// then persisted.
pub fn ensure_calibration(
    store: &CalibrationStore,
    key: &str,
    frame: FrameSize,
    operator: &mut dyn CalibrationOperator,
) -> Result<CalibrationData, CalibrationError> {
    if let Some(restored) = store.load(key) {
        if restored.frame == frame && restored.is_calibrated() && operator.confirm(&restored) {
            info!("restored calibration '{key}' confirmed");
            return Ok(restored);
        }
        info!("persisted calibration '{key}' rejected, re-calibrating");
    }

    loop {
        let mut data = CalibrationData::new(frame);

        while let Some(offsets) = operator.adjust(&data) {
            if let Err(err) = data.solve_transform(offsets) {
                warn!("offset set rejected: {err}");
            }
        }

        if !data.is_calibrated() {
            return Err(CalibrationError::Aborted);
        }

        if operator.confirm(&data) {
            store.save(key, &data)?;
            info!("calibration '{key}' accepted and persisted");
            return Ok(data);
        }
    }
}
