//! Rule and geometry configuration
//!
//! Plain serde structs with `Default` impls taken from [`crate::constants`].
//! The backend fills them from its command line; tests build them inline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::*;

/// Thresholds used once, when the neighbor graph and jump map are built
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub neighbor_radius: f32,
    pub jump_alignment: f32,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            neighbor_radius: NEIGHBOR_RADIUS,
            jump_alignment: JUMP_ALIGNMENT,
        }
    }
}

/// Score deltas reported to the stats collaborator when a match ends
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub win: i64,
    pub loss: i64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            win: WIN_SCORE_DELTA,
            loss: LOSS_SCORE_DELTA,
        }
    }
}

/// Everything the Match Authority needs to know about the rules
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    pub topology: TopologyConfig,
    /// Moves longer than this are captures
    pub capture_distance: f32,
    /// Length of one turn on the Turn Clock
    pub turn_limit: Duration,
    /// Opponent interactable count at or below which a capture wins
    pub win_threshold: usize,
    pub score: ScoreConfig,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            topology: TopologyConfig::default(),
            capture_distance: CAPTURE_DISTANCE,
            turn_limit: DEFAULT_TURN_LIMIT,
            win_threshold: WIN_THRESHOLD,
            score: ScoreConfig::default(),
        }
    }
}

impl RulesConfig {
    pub fn with_turn_limit(mut self, turn_limit: Duration) -> Self {
        self.turn_limit = turn_limit;
        self
    }
}
