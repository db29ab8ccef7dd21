//! Turn and game state machine for dart scoring.
//!
//! A [`Game`] owns all player, capture and dart state and is driven by a
//! single game-loop thread. Rule sets are closed [`GameMode`] variants so
//! new modes extend the enum without touching the detector or resolver.

mod correction;
mod game_loop;
mod modes;
mod sink;
mod state;

pub use correction::{parse_score_token, CorrectionError};
pub use game_loop::{
    dart_channel, run_game_loop, DartDrain, DartPublisher, DetectorProvider, GameLoopConfig,
    StrikeProvider,
};
pub use modes::GameMode;
pub use sink::{CsvScoreLog, DartRecord, ScoreSink, SinkError};
pub use state::{Capture, Game, GameError, Player};
