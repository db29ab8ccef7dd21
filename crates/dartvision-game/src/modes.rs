use serde::{Deserialize, Serialize};

use crate::state::{Capture, Player};

/// Rule policy of a match. Stateless apart from its configuration; every
/// variant answers the same five questions so the game loop never needs to
/// know which rules are active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Classic countdown from a fixed start (301, 501, ...), optionally
    /// requiring a double to open and/or close the game.
    X01 {
        start: i32,
        double_in: bool,
        double_out: bool,
    },
    /// Count upward from zero; the game ends on the turn that reaches the
    /// target, overshoot included.
    FromZero { target: i32 },
}

impl GameMode {
    pub fn x01(start: i32) -> Self {
        Self::X01 {
            start,
            double_in: false,
            double_out: false,
        }
    }

    pub fn start_score(&self) -> i32 {
        match self {
            Self::X01 { start, .. } => *start,
            Self::FromZero { .. } => 0,
        }
    }

    /// A countdown ends at exactly zero. Since invalid captures are never
    /// applied, a zero score can only have been reached through a valid
    /// (double-out honoring) capture.
    pub fn is_game_finished(&self, players: &[Player]) -> bool {
        match self {
            Self::X01 { .. } => players.iter().any(|p| p.score == 0),
            Self::FromZero { target } => players.iter().any(|p| p.score >= *target),
        }
    }

    /// Whether the player's current capture takes no further darts.
    pub fn is_capture_finished(&self, player: &Player) -> bool {
        let Some(capture) = player.captures.last() else {
            return false;
        };
        if capture.darts.len() >= Capture::MAX_DARTS {
            return true;
        }

        let sum = capture.score_sum();
        match self {
            Self::X01 { double_out, .. } => {
                // Below the minimum legal remainder no dart can help.
                let remainder = player.score - sum;
                remainder < if *double_out { 2 } else { 1 }
            }
            Self::FromZero { target } => player.score + sum >= *target,
        }
    }

    /// Whether the capture's score may be applied. An invalid capture is a
    /// bust: its score is discarded entirely.
    pub fn is_capture_valid(&self, player: &Player) -> bool {
        match self {
            Self::X01 { double_out, .. } => {
                let Some(capture) = player.captures.last() else {
                    return true;
                };
                let Some(latest) = capture.darts.last() else {
                    return true;
                };
                let remainder = player.score - capture.score_sum();
                if *double_out {
                    remainder > 1 || (remainder == 0 && latest.multiplier == 2)
                } else {
                    remainder >= 0
                }
            }
            Self::FromZero { .. } => true,
        }
    }

    /// Apply the current capture to the player's score. Callers check
    /// `is_capture_valid` first; busts are never applied.
    pub fn update_player_score(&self, player: &mut Player) {
        match self {
            Self::X01 { double_in, .. } => {
                let Some(capture) = player.captures.last() else {
                    return;
                };
                let (sum, is_in) = if *double_in && !player.is_in {
                    // Darts before the opening double are worth zero.
                    let mut sum = 0;
                    let mut is_in = false;
                    for dart in &capture.darts {
                        if !is_in {
                            if dart.multiplier == 2 {
                                is_in = true;
                            } else {
                                continue;
                            }
                        }
                        sum += dart.score();
                    }
                    (sum, is_in)
                } else {
                    (capture.score_sum(), player.is_in)
                };
                player.is_in = is_in;
                player.score -= sum;
            }
            Self::FromZero { .. } => {
                let sum = player.captures.last().map_or(0, Capture::score_sum);
                player.score += sum;
            }
        }
    }
}
