//! # Core Types - Identifiers, Owners and Positions
//!
//! ## Overview
//!
//! Everything the engine passes around is built from a handful of small
//! `Copy` types defined here:
//!
//! - [`CellId`] - stable identity of a board cell, supplied by the layout
//! - [`PlayerId`] - identity of a participant, assigned by the host
//! - [`TurnNumber`] - monotonically increasing turn counter
//! - [`MatchId`] - UUID tagging one live match
//! - [`Owner`] - who holds the piece on a cell (`Unowned` or a player)
//! - [`Position`] - 3-D coordinates, used only to derive topology
//!
//! ## Why Newtypes?
//!
//! Cell ids and player ids are both small integers on the wire. Wrapping them
//! keeps `request_move(requester, from, to)` from silently accepting its
//! arguments in the wrong order.
//!
//! All types derive `Serialize`/`Deserialize` so that snapshots and events can
//! be sent to remote participants unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Layout-assigned cell identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-assigned participant identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Turn counter, bumped on every turn transition (move or timeout)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurnNumber(pub u64);

impl TurnNumber {
    pub fn next(self) -> Self {
        TurnNumber(self.0 + 1)
    }
}

/// The two participants of a match, in turn order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPlayers {
    /// Holds the first turn
    pub first: PlayerId,
    pub second: PlayerId,
}

impl MatchPlayers {
    pub fn new(first: PlayerId, second: PlayerId) -> Self {
        Self { first, second }
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        player == self.first || player == self.second
    }

    /// The other participant, `None` if `player` is not in the match
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if player == self.first {
            Some(self.second)
        } else if player == self.second {
            Some(self.first)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = PlayerId> {
        [self.first, self.second].into_iter()
    }
}

/// Identity of a single match, used to correlate logs and stats reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    pub fn new() -> Self {
        MatchId(Uuid::new_v4())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who holds the piece on a cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    #[default]
    Unowned,
    Player(PlayerId),
}

impl Owner {
    /// The owning player, if any
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Owner::Unowned => None,
            Owner::Player(id) => Some(id),
        }
    }

    pub fn is_unowned(self) -> bool {
        matches!(self, Owner::Unowned)
    }

    /// True when the cell belongs to a player other than `player`
    pub fn is_opponent_of(self, player: PlayerId) -> bool {
        matches!(self, Owner::Player(id) if id != player)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Unowned => f.write_str("unowned"),
            Owner::Player(id) => id.fmt(f),
        }
    }
}

/// Point in layout space
///
/// Only topology construction looks at positions; gameplay works purely on
/// the resulting neighbor graph and jump map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Vector from `self` to `other`
    pub fn to(self, other: Position) -> Position {
        Position::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Position) -> f32 {
        self.to(other).length()
    }

    pub fn dot(self, other: Position) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Unit vector in the same direction, `None` for a zero-length vector
    pub fn normalized(self) -> Option<Position> {
        let len = self.length();
        if len <= f32::EPSILON {
            return None;
        }
        Some(Position::new(self.x / len, self.y / len, self.z / len))
    }
}
