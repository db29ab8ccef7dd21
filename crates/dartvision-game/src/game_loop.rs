//! The turn loop: collect strikes into captures, score them under the
//! active rule set and hand completed darts to the log sink and the
//! drain-once read surface.
//!
//! All game state is owned by the thread running [`run_game_loop`];
//! read-side consumers only ever see completed darts through the channel.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use dartvision_board::Dart;
use dartvision_detect::{
    CancellationToken, FeatureExtractor, FrameSource, StrikeDetector, StrikeOutcome,
};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::sink::{DartRecord, ScoreSink};
use crate::state::Game;

/// Anything that can block until the next strike outcome. Implemented by
/// the detector/source pairing below; scripted in tests.
pub trait StrikeProvider {
    fn next_strike(&mut self, token: &CancellationToken) -> StrikeOutcome;
}

pub struct DetectorProvider<E, S> {
    pub detector: StrikeDetector<E>,
    pub source: S,
}

impl<E: FeatureExtractor, S: FrameSource> StrikeProvider for DetectorProvider<E, S> {
    fn next_strike(&mut self, token: &CancellationToken) -> StrikeOutcome {
        self.detector.wait_for_strike(&self.source, token)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameLoopConfig {
    /// Pause after a logged turn so players can retrieve their darts.
    pub turn_cooldown: Duration,
}

impl Default for GameLoopConfig {
    fn default() -> Self {
        Self {
            turn_cooldown: Duration::from_secs(5),
        }
    }
}

/// Write side of the completed-dart surface. Publishing never blocks the
/// game loop.
pub struct DartPublisher {
    tx: Sender<Dart>,
}

impl DartPublisher {
    pub fn publish(&self, dart: Dart) {
        // A dropped drain only means nobody is listening anymore.
        let _ = self.tx.send(dart);
    }
}

/// Read side: each completed dart is read at most once.
pub struct DartDrain {
    rx: Receiver<Dart>,
}

impl DartDrain {
    pub fn drain(&self) -> Vec<Dart> {
        self.rx.try_iter().collect()
    }
}

pub fn dart_channel() -> (DartPublisher, DartDrain) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (DartPublisher { tx }, DartDrain { rx })
}

/// Drive a game to completion (or cancellation).
///
/// Per turn: open a capture, collect strikes until the rule set closes it
/// or the player enters the zone, pad cut-short turns with placeholders,
/// wait for the retrieval zone entry, apply the capture (busts are
/// discarded), then log and publish every dart of the turn.
pub fn run_game_loop<P, S>(
    game: &mut Game,
    provider: &mut P,
    sink: &mut S,
    publisher: &DartPublisher,
    token: &CancellationToken,
    config: &GameLoopConfig,
) where
    P: StrikeProvider,
    S: ScoreSink,
{
    while game.is_running && !game.is_game_finished() {
        game.begin_capture();

        loop {
            match provider.next_strike(token) {
                StrikeOutcome::Cancelled => {
                    game.is_running = false;
                    return;
                }
                StrikeOutcome::ZoneEntered => break,
                StrikeOutcome::Dart(dart) => {
                    info!("scored {}x{}", dart.multiplier, dart.base);
                    if game.add_dart(dart).is_err() {
                        break;
                    }
                    if game.is_capture_finished() {
                        break;
                    }
                }
            }
        }

        if game.is_capture_valid() && !game.is_capture_finished() {
            // The turn was cut short by a zone entry; placeholders keep the
            // capture's shape for logging and correction.
            if game.pad_capture().is_err() {
                break;
            }
        }

        // Players retrieve their darts now; scores can be corrected until
        // the zone is entered.
        if let StrikeOutcome::Cancelled = provider.next_strike(token) {
            game.is_running = false;
            return;
        }

        game.apply_capture_score();
        log_capture(game, sink, publisher);

        if game.is_game_finished() {
            break;
        }

        std::thread::sleep(config.turn_cooldown);
        game.next_player();
    }

    game.is_running = false;
    match game.winner() {
        Some(winner) => info!("game over, {} wins with {}", winner.name, winner.score),
        None => info!("game stopped"),
    }
}

fn log_capture<S: ScoreSink>(game: &Game, sink: &mut S, publisher: &DartPublisher) {
    let player = game.current_player();
    let Some(capture) = player.captures.last() else {
        return;
    };

    for dart in &capture.darts {
        let record = DartRecord::new(game.id, &player.name, dart);
        if let Err(err) = sink.append(&record) {
            error!("failed to log dart for {}: {err}", player.name);
        }
        publisher.publish(dart.clone());
    }
}
