use dartvision_board::Dart;
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::correction::{parse_score_token, CorrectionError};
use crate::modes::GameMode;

#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("a game needs at least one player")]
    NoPlayers,
    #[error("no capture is active for the current player")]
    NoActiveCapture,
    #[error("dart slot {0} is out of range (captures hold up to {max})", max = Capture::MAX_DARTS)]
    SlotOutOfRange(usize),
    #[error(transparent)]
    Correction(#[from] CorrectionError),
}

/// The darts thrown by one player in one turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub darts: Vec<Dart>,
}

impl Capture {
    pub const MAX_DARTS: usize = 3;

    pub fn score_sum(&self) -> i32 {
        self.darts.iter().map(Dart::score).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub score: i32,
    /// Double-in latch: set once the player's first double lands.
    pub is_in: bool,
    pub captures: Vec<Capture>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            is_in: false,
            captures: Vec::new(),
        }
    }

    pub fn num_darts(&self) -> usize {
        self.captures.iter().map(|c| c.darts.len()).sum()
    }
}

/// The authoritative owner of all player/capture/dart state for one match.
/// Mutated only by the single game-loop thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub mode: GameMode,
    pub players: Vec<Player>,
    pub current_player: usize,
    pub is_running: bool,
}

impl Game {
    pub fn new(mode: GameMode, mut players: Vec<Player>) -> Result<Self, GameError> {
        if players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        for player in &mut players {
            player.score = mode.start_score();
        }

        Ok(Self {
            id: Uuid::new_v4(),
            mode,
            players,
            current_player: 0,
            is_running: true,
        })
    }

    pub fn next_player(&mut self) {
        self.current_player = (self.current_player + 1) % self.players.len();
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player]
    }

    pub fn current_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.current_player]
    }

    /// Open a fresh capture for the current player's turn.
    pub fn begin_capture(&mut self) {
        self.current_player_mut().captures.push(Capture::default());
    }

    /// Append a detected dart to the active capture.
    pub fn add_dart(&mut self, dart: Dart) -> Result<(), GameError> {
        let capture = self
            .current_player_mut()
            .captures
            .last_mut()
            .ok_or(GameError::NoActiveCapture)?;
        capture.darts.push(dart);
        Ok(())
    }

    /// Pad a turn that was cut short with zero-score placeholders.
    pub fn pad_capture(&mut self) -> Result<(), GameError> {
        let capture = self
            .current_player_mut()
            .captures
            .last_mut()
            .ok_or(GameError::NoActiveCapture)?;
        while capture.darts.len() < Capture::MAX_DARTS {
            capture.darts.push(Dart::placeholder());
        }
        Ok(())
    }

    /// Overwrite one dart slot of the active capture from a textual score
    /// token such as `"D20"`, `"T19"`, `"5"` or `"0"`. The slot is marked
    /// as manually corrected.
    pub fn correct_dart(&mut self, slot: usize, token: &str) -> Result<(), GameError> {
        if slot >= Capture::MAX_DARTS {
            return Err(GameError::SlotOutOfRange(slot));
        }
        let (base, multiplier) = parse_score_token(token)?;

        let capture = self
            .current_player_mut()
            .captures
            .last_mut()
            .ok_or(GameError::NoActiveCapture)?;
        while capture.darts.len() <= slot {
            capture.darts.push(Dart::placeholder());
        }

        let dart = &mut capture.darts[slot];
        dart.base = base;
        dart.multiplier = multiplier;
        dart.correctly_detected = Some(false);
        Ok(())
    }

    pub fn is_game_finished(&self) -> bool {
        self.mode.is_game_finished(&self.players)
    }

    pub fn is_capture_finished(&self) -> bool {
        self.mode.is_capture_finished(self.current_player())
    }

    pub fn is_capture_valid(&self) -> bool {
        self.mode.is_capture_valid(self.current_player())
    }

    /// Score the current capture if it is valid; a bust leaves the
    /// player's pre-turn score untouched.
    pub fn apply_capture_score(&mut self) {
        if self.is_capture_valid() {
            let mode = self.mode;
            mode.update_player_score(self.current_player_mut());
        } else {
            info!("bust: capture discarded for {}", self.current_player().name);
        }
    }

    pub fn winner(&self) -> Option<&Player> {
        match self.mode {
            GameMode::X01 { .. } => self.players.iter().find(|p| p.score == 0),
            GameMode::FromZero { target } => self.players.iter().find(|p| p.score >= target),
        }
    }
}
