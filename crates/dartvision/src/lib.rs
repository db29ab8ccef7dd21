//! High-level facade crate for the `dartvision-*` workspace.
//!
//! The pipeline turns a camera feed pointed at a dartboard into scored
//! throws: a capture worker exposes the latest frame, the strike detector
//! watches frame differences for landing darts, the corner resolver pins
//! the impact point, the calibration transform maps it into board
//! coordinates and the scoring mapper turns that into a sector/ring score.
//! A turn/game state machine accumulates scores per player under the
//! configured rule set.
//!
//! ## API map
//! - [`core`]: geometry kernel, grayscale image ops, homographies.
//! - [`board`]: board geometry, calibration model + store, scoring mapper.
//! - [`detect`]: frame source contract, corner resolver, strike detector.
//! - [`game`]: rule sets, game state, score log, game loop.

pub use dartvision_board as board;
pub use dartvision_core as core;
pub use dartvision_detect as detect;
pub use dartvision_game as game;

pub use dartvision_board::{score_position, BoardGeometry, CalibrationData, CalibrationStore, Dart};
pub use dartvision_core::FrameSize;
pub use dartvision_detect::{
    CancellationToken, DetectorParams, FeatureExtractor, FrameGrabber, FrameSource, FrameStream,
    ResolverParams, StrikeDetector, StrikeOutcome,
};
pub use dartvision_game::{
    dart_channel, run_game_loop, DetectorProvider, Game, GameLoopConfig, GameMode, Player,
};
