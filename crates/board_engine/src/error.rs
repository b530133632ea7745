//! Error types for the match engine
//!
//! Every error here is a local validation failure: it is returned to the
//! caller and never corrupts state or reaches other participants as an
//! event. The enums derive serde so that the host can send a rejection back
//! to the participant that caused it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CellId, PlayerId};

/// Problems with a starting layout or a snapshot being loaded
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutError {
    #[error("layout contains no cells")]
    EmptyLayout,

    #[error("cell {cell} appears more than once")]
    DuplicateCell { cell: CellId },

    #[error("cell {cell} is unowned but marked interactable")]
    UnownedInteractable { cell: CellId },

    #[error("cell {cell} is owned by {player}, who is not in this match")]
    UnknownOwner { cell: CellId, player: PlayerId },

    #[error("cell {cell} is not on the board")]
    UnknownCell { cell: CellId },

    /// A step between neighbors would be classified as a capture
    #[error("neighbors {a} and {b} are further apart than the capture distance")]
    StepTooLong { a: CellId, b: CellId },

    /// A jump would be classified as a simple move
    #[error("jump {from} -> {to} is within the capture distance")]
    JumpTooShort { from: CellId, to: CellId },
}

/// Errors returned by the Match Authority
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineError {
    /// The requester is not the current turn holder
    #[error("not your turn: {requester} moved while it is {current}'s turn")]
    NotYourTurn {
        requester: PlayerId,
        current: PlayerId,
    },

    /// The origin cell holds no owned piece
    #[error("no piece at cell {cell}")]
    NoPieceAtCell { cell: CellId },

    /// The origin piece belongs to someone else
    #[error("piece at cell {cell} does not belong to {requester}")]
    NotOwner { cell: CellId, requester: PlayerId },

    /// The origin piece spent its move and has not been reactivated
    #[error("piece at cell {cell} is not interactable")]
    PieceInactive { cell: CellId },

    /// The destination is not in the origin piece's legal destination set
    #[error("illegal destination: {from} cannot move to {to}")]
    IllegalDestination { from: CellId, to: CellId },

    #[error("match has already been started")]
    MatchAlreadyStarted,

    #[error("match is not active")]
    MatchNotActive,

    #[error("{player} is not a participant in this match")]
    NotAParticipant { player: PlayerId },

    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
}

/// Problems applying replicated events on a participant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplicaError {
    #[error("received {event} before the match started")]
    NotStarted { event: &'static str },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
