//! Board state
//!
//! The [`Board`] pairs the immutable [`Topology`] with one [`PieceState`] per
//! cell. Every cell always has a state; an empty cell is simply
//! `Owner::Unowned`. The only way to change a state is [`Board::apply`],
//! which is also what replicas use, so the authority and every participant
//! go through the same code path.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::TopologyConfig;
use crate::error::LayoutError;
use crate::layout::{CellSpec, Layout};
use crate::topology::Topology;
use crate::types::{CellId, MatchPlayers, Owner, PlayerId};

/// Owner and interactability of the piece on one cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceState {
    pub owner: Owner,
    pub interactable: bool,
}

impl PieceState {
    /// Build a state, clearing `interactable` for unowned cells
    pub fn new(owner: Owner, interactable: bool) -> Self {
        Self {
            owner,
            interactable: interactable && !owner.is_unowned(),
        }
    }

    /// True when `player` could start a move from this cell
    pub fn is_movable_by(&self, player: PlayerId) -> bool {
        self.interactable && self.owner == Owner::Player(player)
    }
}

/// One cell's new state, as produced by a move and replicated to participants
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceChange {
    pub cell: CellId,
    pub owner: Owner,
    pub interactable: bool,
}

impl PieceChange {
    pub fn state(&self) -> PieceState {
        PieceState::new(self.owner, self.interactable)
    }
}

/// Full board contents, enough to rebuild topology and state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub cells: Vec<CellSpec>,
}

#[derive(Clone, Debug)]
pub struct Board {
    topology: Topology,
    states: HashMap<CellId, PieceState>,
}

impl Board {
    /// Build a board from a starting layout
    ///
    /// # Errors
    ///
    /// Topology errors, plus [`LayoutError::UnownedInteractable`] for an
    /// empty cell flagged interactable.
    pub fn from_layout(layout: &Layout, config: &TopologyConfig) -> Result<Self, LayoutError> {
        Self::from_cells(&layout.cells, config)
    }

    /// Rebuild a board from a snapshot received over the wire
    pub fn from_snapshot(
        snapshot: &BoardSnapshot,
        config: &TopologyConfig,
    ) -> Result<Self, LayoutError> {
        Self::from_cells(&snapshot.cells, config)
    }

    fn from_cells(cells: &[CellSpec], config: &TopologyConfig) -> Result<Self, LayoutError> {
        if let Some(bad) = cells.iter().find(|c| c.owner.is_unowned() && c.interactable) {
            return Err(LayoutError::UnownedInteractable { cell: bad.id });
        }

        let topology = Topology::build(cells.iter().map(|c| (c.id, c.position)), config)?;
        let states = cells
            .iter()
            .map(|c| (c.id, PieceState::new(c.owner, c.interactable)))
            .collect();

        Ok(Self { topology, states })
    }

    /// Check that every owned cell belongs to one of `players`
    pub fn validate_owners(&self, players: &MatchPlayers) -> Result<(), LayoutError> {
        for &cell in self.topology.cells() {
            if let Some(player) = self.states[&cell].owner.player() {
                if !players.contains(player) {
                    return Err(LayoutError::UnknownOwner { cell, player });
                }
            }
        }
        Ok(())
    }

    /// Check that move length alone tells steps from jumps
    ///
    /// Every neighbor pair must be at most `capture_distance` apart and
    /// every jump landing strictly further, otherwise a legal jump could be
    /// classified as a simple move (or the reverse).
    pub fn validate_move_lengths(&self, capture_distance: f32) -> Result<(), LayoutError> {
        let topology = &self.topology;
        for &a in topology.cells() {
            for &b in topology.neighbors(a) {
                if topology.distance(a, b).is_some_and(|d| d > capture_distance) {
                    return Err(LayoutError::StepTooLong { a, b });
                }
            }
        }
        for &from in topology.cells() {
            for (_, to) in topology.jumps_from(from) {
                if topology.distance(from, to).is_some_and(|d| d <= capture_distance) {
                    return Err(LayoutError::JumpTooShort { from, to });
                }
            }
        }
        Ok(())
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn state(&self, cell: CellId) -> Option<PieceState> {
        self.states.get(&cell).copied()
    }

    pub fn owner(&self, cell: CellId) -> Option<Owner> {
        self.state(cell).map(|s| s.owner)
    }

    /// Overwrite one cell's state
    pub fn apply(&mut self, change: PieceChange) -> Result<(), LayoutError> {
        let slot = self
            .states
            .get_mut(&change.cell)
            .ok_or(LayoutError::UnknownCell { cell: change.cell })?;
        *slot = change.state();
        Ok(())
    }

    /// Number of pieces `player` can still move
    pub fn interactable_count(&self, player: PlayerId) -> usize {
        self.states
            .values()
            .filter(|s| s.is_movable_by(player))
            .count()
    }

    /// Number of cells owned by `player`, interactable or not
    pub fn owned_count(&self, player: PlayerId) -> usize {
        self.states
            .values()
            .filter(|s| s.owner == Owner::Player(player))
            .count()
    }

    /// Cells in layout order with their current state
    pub fn cells(&self) -> impl Iterator<Item = (CellId, PieceState)> + '_ {
        self.topology
            .cells()
            .iter()
            .map(move |&id| (id, self.states[&id]))
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let cells = self
            .cells()
            .filter_map(|(id, state)| {
                Some(CellSpec {
                    id,
                    position: self.topology.position(id)?,
                    owner: state.owner,
                    interactable: state.interactable,
                })
            })
            .collect();
        BoardSnapshot { cells }
    }
}
