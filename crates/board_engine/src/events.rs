//! Replicated events and match records
//!
//! [`MatchEvent`] is the only thing a remote participant needs to rebuild
//! the board: apply the events in order and the result matches the
//! authority's state exactly. Everything else in this module describes the
//! match for resynchronization ([`MatchSnapshot`]), history ([`MoveRecord`])
//! or the external stats service ([`MatchSummary`]).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::board::{BoardSnapshot, PieceChange};
use crate::moves::MoveKind;
use crate::types::{CellId, MatchId, MatchPlayers, Owner, PlayerId, TurnNumber};

/// Why a match ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// The loser ran out of interactable pieces
    NormalWin,
    /// The loser left the match
    Disconnect,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    #[default]
    InProgress,
    Decided { winner: PlayerId, reason: WinReason },
}

impl MatchResult {
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            MatchResult::InProgress => None,
            MatchResult::Decided { winner, .. } => Some(*winner),
        }
    }
}

/// State change broadcast by the authority
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    MatchStarted {
        board: BoardSnapshot,
        first_turn: PlayerId,
        turn: TurnNumber,
        /// Time left on the first turn
        deadline: Duration,
    },
    PieceChanged {
        cell: CellId,
        owner: Owner,
        interactable: bool,
    },
    TurnChanged {
        player: PlayerId,
        turn: TurnNumber,
        deadline: Duration,
    },
    MatchOver {
        winner: PlayerId,
        reason: WinReason,
    },
}

impl From<PieceChange> for MatchEvent {
    fn from(change: PieceChange) -> Self {
        MatchEvent::PieceChanged {
            cell: change.cell,
            owner: change.owner,
            interactable: change.interactable,
        }
    }
}

/// Where the authority's state machine is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    #[default]
    AwaitingFirstTurn,
    TurnActive,
    MatchOver,
}

/// Full authoritative state, for participants that need to resynchronize
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_id: MatchId,
    pub players: MatchPlayers,
    pub phase: MatchPhase,
    /// `None` until the match has begun
    pub board: Option<BoardSnapshot>,
    pub current_player: Option<PlayerId>,
    pub turn: TurnNumber,
    pub time_remaining: Duration,
    pub result: MatchResult,
}

/// One accepted move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub player: PlayerId,
    pub from: CellId,
    pub to: CellId,
    pub kind: MoveKind,
    /// Turn during which the move was made
    pub turn: TurnNumber,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
}

/// Per-player result handed to the stats collaborator when a match ends
///
/// The deltas mirror what the account service adds to its running totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub player: PlayerId,
    pub outcome: Outcome,
    pub reason: WinReason,
    pub score_delta: i64,
    pub games_played_delta: u32,
    pub games_won_delta: u32,
}

/// Transport used by the authority to reach every participant
///
/// Implementations must deliver events to each participant in the order they
/// were broadcast.
pub trait ReplicationChannel {
    fn broadcast(&mut self, event: MatchEvent);
}

/// Sink for end-of-match summaries; the authority never waits on it
pub trait StatsReporter {
    fn report(&mut self, summary: MatchSummary);
}

impl ReplicationChannel for Vec<MatchEvent> {
    fn broadcast(&mut self, event: MatchEvent) {
        self.push(event);
    }
}

impl StatsReporter for Vec<MatchSummary> {
    fn report(&mut self, summary: MatchSummary) {
        self.push(summary);
    }
}
