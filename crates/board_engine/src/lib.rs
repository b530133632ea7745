//! # Board Engine - rules and authority for the Tessellaction capture game
//!
//! Two players move pieces across a graph of cells. A piece steps onto an
//! empty neighbor, or jumps an adjacent opponent piece onto the empty cell
//! beyond it and flips the jumped piece to its own side. A player who can
//! no longer move more than one piece loses.
//!
//! ## Module Organization
//!
//! - `types` / `constants` / `config` - identifiers, thresholds, rule settings
//! - `layout` - starting configurations, including the default hex board
//! - `topology` - neighbor graph and jump map, built once per match
//! - `board` - per-cell owner and interactability
//! - `moves` - legal destinations and move classification
//! - `clock` - per-turn countdown
//! - `events` - replicated events, snapshots, stats summaries and the
//!   collaborator traits
//! - `authority` - the single-writer match state machine
//! - `replica` - participant-side board driven by events
//!
//! The crate does no I/O. Transport and stats delivery are supplied by the
//! caller through [`ReplicationChannel`] and [`StatsReporter`].

pub mod authority;
pub mod board;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod layout;
pub mod moves;
pub mod replica;
pub mod topology;
pub mod types;


pub use authority::MatchAuthority;
pub use board::{Board, BoardSnapshot, PieceChange, PieceState};
pub use clock::{ClockTick, TurnClock};
pub use config::{RulesConfig, ScoreConfig, TopologyConfig};
pub use error::{EngineError, EngineResult, LayoutError, ReplicaError};
pub use events::{
    MatchEvent, MatchPhase, MatchResult, MatchSnapshot, MatchSummary, MoveRecord, Outcome,
    ReplicationChannel, StatsReporter, WinReason,
};
pub use layout::{hex_board, CellSpec, Layout};
pub use moves::{classify, legal_destinations, MoveKind};
pub use replica::BoardReplica;
pub use topology::Topology;
pub use types::{CellId, MatchId, MatchPlayers, Owner, PlayerId, Position, TurnNumber};
