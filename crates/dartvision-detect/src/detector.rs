//! Motion-gated capture loop.
//!
//! The detector samples frame differences on a fixed interval and decides
//! between "no change", "dart landed" and "player in the throwing zone".
//! Detection failures are sentinels, not faults: a cycle without a dart is
//! the common case and keeps the loop watching.

use std::time::Duration;

use dartvision_board::{score_position, CalibrationData, Dart};
use dartvision_core::{absdiff, box_blur, count_nonzero, threshold_binary, GrayImage};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::features::FeatureExtractor;
use crate::resolver::{resolve, ResolverParams};
use crate::source::FrameSource;

/// Tunable thresholds of the watch/settle/resolve loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Changed-pixel count below which a frame difference is noise.
    pub min_changed_px: usize,
    /// Changed-pixel count at which a person, not a dart, moved.
    pub max_changed_px: usize,
    /// Pause between difference samples while watching.
    pub sample_interval: Duration,
    /// Pause after a trigger for camera vibrations to die down.
    pub settle_delay: Duration,
    /// Binary threshold applied to the blurred difference image.
    pub diff_threshold: u8,
    /// Box-blur radius for difference denoising.
    pub blur_radius: usize,
    /// Corner budget handed to the feature extractor.
    pub max_corners: usize,
    pub corner_quality: f32,
    pub corner_min_distance: f32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            min_changed_px: 100,
            max_changed_px: 100_000,
            sample_interval: Duration::from_millis(100),
            settle_delay: Duration::from_millis(200),
            diff_threshold: 60,
            blur_radius: 2,
            max_corners: 2000,
            corner_quality: 0.0008,
            corner_min_distance: 1.0,
        }
    }
}

/// Result of one wait on the capture loop.
#[derive(Clone, Debug, PartialEq)]
pub enum StrikeOutcome {
    /// A dart landed and was scored.
    Dart(Dart),
    /// The changed-pixel count exceeded the upper bound: a person entered
    /// the throwing area, no further dart this round.
    ZoneEntered,
    /// The cancellation token was observed.
    Cancelled,
}

pub struct StrikeDetector<E> {
    params: DetectorParams,
    resolver: ResolverParams,
    calibration: CalibrationData,
    extractor: E,
}

impl<E: FeatureExtractor> StrikeDetector<E> {
    /// A detector needs a confirmed calibration; without one no impact
    /// point could be scored.
    pub fn new(
        calibration: CalibrationData,
        extractor: E,
    ) -> Result<Self, dartvision_board::CalibrationError> {
        if !calibration.is_calibrated() {
            return Err(dartvision_board::CalibrationError::NotCalibrated);
        }
        Ok(Self {
            params: DetectorParams::default(),
            resolver: ResolverParams::default(),
            calibration,
            extractor,
        })
    }

    pub fn with_params(mut self, params: DetectorParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_resolver_params(mut self, resolver: ResolverParams) -> Self {
        self.resolver = resolver;
        self
    }

    /// Block until a dart lands, a person enters the zone or the token is
    /// cancelled.
    ///
    /// Frames are consumed in capture order: baseline before trigger before
    /// settle frame before resolution.
    pub fn wait_for_strike(
        &self,
        source: &dyn FrameSource,
        token: &CancellationToken,
    ) -> StrikeOutcome {
        let mut baseline = source.read();

        loop {
            if token.is_cancelled() {
                return StrikeOutcome::Cancelled;
            }
            std::thread::sleep(self.params.sample_interval);

            let next = source.read();
            let changed = self.changed_pixel_count(&baseline, &next);

            if changed < self.params.min_changed_px {
                // No event; the baseline advances with the scene.
                baseline = next;
                continue;
            }
            if changed >= self.params.max_changed_px {
                warn!("player entered the throwing zone ({changed} px changed)");
                return StrikeOutcome::ZoneEntered;
            }

            // Candidate strike. Wait out camera vibrations, then resolve
            // against a fresh frame.
            std::thread::sleep(self.params.settle_delay);
            let settled = source.read();
            let diff = box_blur(
                &absdiff(&baseline.view(), &settled.view()).view(),
                self.params.blur_radius,
            );

            let corners = self.extractor.corners(
                &diff.view(),
                self.params.max_corners,
                self.params.corner_quality,
                self.params.corner_min_distance,
            );
            if corners.is_empty() || corners.len() >= self.params.max_corners {
                info!(
                    "dart not detected: corner extraction returned {} points",
                    corners.len()
                );
                continue;
            }

            let Some(impact) = resolve(&corners, settled.size(), &self.resolver) else {
                continue;
            };

            // Re-verify the zone: a person may have entered during the
            // settle wait.
            let settled_changed =
                count_nonzero(&threshold_binary(&diff.view(), self.params.diff_threshold).view());
            if settled_changed >= self.params.max_changed_px {
                warn!("player entered the zone during settle ({settled_changed} px)");
                return StrikeOutcome::ZoneEntered;
            }

            let board_point = match self.calibration.project(impact) {
                Ok(p) => p,
                Err(err) => {
                    // Unreachable for a detector built via `new`.
                    error!("projection failed: {err}");
                    continue;
                }
            };
            let dart = score_position(board_point, &self.calibration.geometry);
            info!("dart detected: {}x{}", dart.multiplier, dart.base);
            return StrikeOutcome::Dart(dart);
        }
    }

    /// difference -> blur -> threshold -> non-zero count.
    fn changed_pixel_count(&self, a: &GrayImage, b: &GrayImage) -> usize {
        let diff = absdiff(&a.view(), &b.view());
        let blurred = box_blur(&diff.view(), self.params.blur_radius);
        let binary = threshold_binary(&blurred.view(), self.params.diff_threshold);
        count_nonzero(&binary.view())
    }
}
