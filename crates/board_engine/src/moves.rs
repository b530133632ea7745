//! Move resolution
//!
//! Pure functions over a [`Board`]: which cells a piece may move to, and
//! whether a given move is a simple relocation or a capture.
//!
//! # Rules
//!
//! From an interactable piece owned by player `p`, for every neighbor `n`:
//!
//! - `n` unowned: `n` is a simple destination
//! - `n` owned by the opponent: every unowned landing cell of the jump
//!   `from → n` is a capture destination
//! - `n` owned by `p`: never a destination
//!
//! A jump with no landing cell on the board simply contributes nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::board::Board;
use crate::types::{CellId, Owner, PlayerId};

/// How an accepted move is applied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// One step onto an adjacent empty cell
    Simple,
    /// Jump over `captured` onto the cell beyond it
    Capture { captured: CellId },
}

impl MoveKind {
    pub fn is_capture(&self) -> bool {
        matches!(self, MoveKind::Capture { .. })
    }

    pub fn captured(&self) -> Option<CellId> {
        match self {
            MoveKind::Simple => None,
            MoveKind::Capture { captured } => Some(*captured),
        }
    }
}

/// Every cell the piece on `from` may move to this turn
///
/// Empty when `from` is unknown, unowned or not interactable.
///
/// # Example
///
/// ```rust,ignore
/// let targets = legal_destinations(&board, CellId(4));
/// if targets.is_empty() {
///     // piece cannot move this turn
/// }
/// ```
pub fn legal_destinations(board: &Board, from: CellId) -> BTreeSet<CellId> {
    let mut destinations = BTreeSet::new();

    let Some(piece) = board.state(from) else {
        return destinations;
    };
    let Owner::Player(mover) = piece.owner else {
        return destinations;
    };
    if !piece.interactable {
        return destinations;
    }

    let topology = board.topology();
    for &neighbor in topology.neighbors(from) {
        match board.owner(neighbor) {
            Some(Owner::Unowned) => {
                destinations.insert(neighbor);
            }
            Some(owner) if owner.is_opponent_of(mover) => {
                destinations.extend(
                    topology
                        .landings(from, neighbor)
                        .iter()
                        .copied()
                        .filter(|&landing| board.owner(landing) == Some(Owner::Unowned)),
                );
            }
            _ => {}
        }
    }

    destinations
}

/// Classify a move already known to be legal
///
/// Moves longer than `capture_distance` are captures; the captured piece is
/// the lowest-id neighbor of `from` owned by an opponent of `mover` whose jump
/// lands on `to`. Returns `None` when a long move has no such neighbor, which
/// cannot happen for a destination returned by [`legal_destinations`].
pub fn classify(
    board: &Board,
    mover: PlayerId,
    from: CellId,
    to: CellId,
    capture_distance: f32,
) -> Option<MoveKind> {
    let topology = board.topology();
    let distance = topology.distance(from, to)?;
    if distance <= capture_distance {
        return Some(MoveKind::Simple);
    }

    topology
        .jumps_from(from)
        .filter(|&(_, landing)| landing == to)
        .map(|(over, _)| over)
        .filter(|&over| {
            board
                .owner(over)
                .is_some_and(|owner| owner.is_opponent_of(mover))
        })
        .min()
        .map(|captured| MoveKind::Capture { captured })
}
