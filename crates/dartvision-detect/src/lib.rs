//! Strike detection for camera-based dart scoring.
//!
//! A background capture worker exposes the most recent camera frame; the
//! [`StrikeDetector`] watches frame differences for motion events, settles,
//! resolves the impact point from extracted corner features and scores it
//! through the calibration transform. Corner extraction itself stays behind
//! the [`FeatureExtractor`] contract.

mod cancel;
mod detector;
mod features;
mod resolver;
mod source;

pub use cancel::CancellationToken;
pub use detector::{DetectorParams, StrikeDetector, StrikeOutcome};
pub use features::FeatureExtractor;
pub use resolver::{resolve, ResolverParams};
pub use source::{FrameGrabber, FrameSource, FrameStream, SourceError};
