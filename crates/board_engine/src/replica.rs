//! Participant-side board rebuilt from events
//!
//! A [`BoardReplica`] never decides anything. It applies [`MatchEvent`]s in
//! the order received and, after a lost event, can be reset from a
//! [`MatchSnapshot`]. Piece changes go through [`Board::apply`], the same
//! code the authority uses.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::board::{Board, BoardSnapshot, PieceChange};
use crate::config::TopologyConfig;
use crate::error::ReplicaError;
use crate::events::{MatchEvent, MatchResult, MatchSnapshot};
use crate::moves;
use crate::types::{CellId, PlayerId, TurnNumber};

#[derive(Clone, Debug, Default)]
pub struct BoardReplica {
    config: TopologyConfig,
    board: Option<Board>,
    current_player: Option<PlayerId>,
    turn: TurnNumber,
    deadline: Duration,
    result: MatchResult,
}

impl BoardReplica {
    /// A replica that has not seen `MatchStarted` yet
    pub fn new(config: TopologyConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Apply one event from the authority
    pub fn apply(&mut self, event: &MatchEvent) -> Result<(), ReplicaError> {
        match event {
            MatchEvent::MatchStarted {
                board,
                first_turn,
                turn,
                deadline,
            } => {
                self.board = Some(Board::from_snapshot(board, &self.config)?);
                self.current_player = Some(*first_turn);
                self.turn = *turn;
                self.deadline = *deadline;
                self.result = MatchResult::InProgress;
            }
            MatchEvent::PieceChanged {
                cell,
                owner,
                interactable,
            } => {
                let board = self.board.as_mut().ok_or(ReplicaError::NotStarted {
                    event: "PieceChanged",
                })?;
                board.apply(PieceChange {
                    cell: *cell,
                    owner: *owner,
                    interactable: *interactable,
                })?;
            }
            MatchEvent::TurnChanged {
                player,
                turn,
                deadline,
            } => {
                if self.board.is_none() {
                    return Err(ReplicaError::NotStarted {
                        event: "TurnChanged",
                    });
                }
                self.current_player = Some(*player);
                self.turn = *turn;
                self.deadline = *deadline;
            }
            MatchEvent::MatchOver { winner, reason } => {
                self.current_player = None;
                self.result = MatchResult::Decided {
                    winner: *winner,
                    reason: *reason,
                };
            }
        }
        Ok(())
    }

    /// Replace everything with the authority's snapshot
    pub fn resync(&mut self, snapshot: &MatchSnapshot) -> Result<(), ReplicaError> {
        self.board = snapshot
            .board
            .as_ref()
            .map(|b| Board::from_snapshot(b, &self.config))
            .transpose()?;
        self.current_player = snapshot.current_player;
        self.turn = snapshot.turn;
        self.deadline = snapshot.time_remaining;
        self.result = snapshot.result;
        Ok(())
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn board_snapshot(&self) -> Option<BoardSnapshot> {
        self.board.as_ref().map(Board::snapshot)
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.current_player
    }

    pub fn turn(&self) -> TurnNumber {
        self.turn
    }

    /// Turn time left as of the last turn event
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn result(&self) -> MatchResult {
        self.result
    }

    /// Move hints computed locally; the authority still has the final say
    pub fn legal_destinations(&self, cell: CellId) -> BTreeSet<CellId> {
        self.board
            .as_ref()
            .map(|board| moves::legal_destinations(board, cell))
            .unwrap_or_default()
    }
}
