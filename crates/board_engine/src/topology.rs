//! Board topology: neighbor graph and jump map
//!
//! Built once per match from cell positions and immutable afterwards.
//!
//! ## Neighbor Graph
//!
//! Two cells are neighbors when their distance is below
//! [`TopologyConfig::neighbor_radius`]. The relation is symmetric by
//! construction. A cell with no neighbors is legal; nothing can ever move
//! onto or off it.
//!
//! ## Jump Map
//!
//! For every ordered neighbor pair `(from, over)` the map stores the cells a
//! piece on `from` would land on when jumping `over`: the neighbors `c` of
//! `over` (other than `from`) whose direction continues the jump,
//!
//! ```text
//! dot(normalize(over - from), normalize(c - over)) > jump_alignment
//! ```
//!
//! Doing the geometry here keeps move resolution a pure graph lookup.

use smallvec::SmallVec;
use std::collections::HashMap;

use crate::config::TopologyConfig;
use crate::error::LayoutError;
use crate::types::{CellId, Position};

/// Neighbor list of one cell; hex boards have at most six
pub type Neighbors = SmallVec<[CellId; 8]>;

/// Landing cells for one `(from, over)` pair; almost always zero or one
pub type Landings = SmallVec<[CellId; 2]>;

#[derive(Clone, Debug)]
pub struct Topology {
    /// Cells in layout order
    order: Vec<CellId>,
    positions: HashMap<CellId, Position>,
    neighbors: HashMap<CellId, Neighbors>,
    jumps: HashMap<(CellId, CellId), Landings>,
}

impl Topology {
    /// Build the neighbor graph and jump map from cell positions
    ///
    /// # Errors
    ///
    /// [`LayoutError::EmptyLayout`] for no cells, [`LayoutError::DuplicateCell`]
    /// when an id appears twice.
    pub fn build<I>(cells: I, config: &TopologyConfig) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = (CellId, Position)>,
    {
        let mut order = Vec::new();
        let mut positions = HashMap::new();
        for (id, position) in cells {
            if positions.insert(id, position).is_some() {
                return Err(LayoutError::DuplicateCell { cell: id });
            }
            order.push(id);
        }
        if order.is_empty() {
            return Err(LayoutError::EmptyLayout);
        }

        let mut neighbors: HashMap<CellId, Neighbors> =
            order.iter().map(|&id| (id, Neighbors::new())).collect();
        for (i, &a) in order.iter().enumerate() {
            for &b in &order[i + 1..] {
                if positions[&a].distance(positions[&b]) < config.neighbor_radius {
                    neighbors.entry(a).or_default().push(b);
                    neighbors.entry(b).or_default().push(a);
                }
            }
        }
        for list in neighbors.values_mut() {
            list.sort_unstable();
        }

        let mut jumps = HashMap::new();
        for &from in &order {
            for &over in &neighbors[&from] {
                let Some(direction) = positions[&from].to(positions[&over]).normalized() else {
                    continue;
                };
                let landings: Landings = neighbors[&over]
                    .iter()
                    .copied()
                    .filter(|&c| c != from)
                    .filter(|c| {
                        positions[&over]
                            .to(positions[c])
                            .normalized()
                            .is_some_and(|d| direction.dot(d) > config.jump_alignment)
                    })
                    .collect();
                if !landings.is_empty() {
                    jumps.insert((from, over), landings);
                }
            }
        }

        tracing::debug!(
            "[TOPOLOGY] Built {} cells, {} jump paths",
            order.len(),
            jumps.len()
        );

        Ok(Self {
            order,
            positions,
            neighbors,
            jumps,
        })
    }

    /// Cells in layout order
    pub fn cells(&self) -> &[CellId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.positions.contains_key(&cell)
    }

    pub fn position(&self, cell: CellId) -> Option<Position> {
        self.positions.get(&cell).copied()
    }

    /// Neighbors of `cell` in ascending id order; empty for unknown cells
    pub fn neighbors(&self, cell: CellId) -> &[CellId] {
        self.neighbors.get(&cell).map(|n| n.as_slice()).unwrap_or(&[])
    }

    pub fn are_neighbors(&self, a: CellId, b: CellId) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Cells a piece on `from` lands on when jumping `over`
    pub fn landings(&self, from: CellId, over: CellId) -> &[CellId] {
        self.jumps
            .get(&(from, over))
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }

    /// Euclidean distance between two cells, `None` if either is unknown
    pub fn distance(&self, a: CellId, b: CellId) -> Option<f32> {
        Some(self.position(a)?.distance(self.position(b)?))
    }

    /// Every cell reachable from `cell` by one jump, with the cell jumped over
    pub fn jumps_from(&self, cell: CellId) -> impl Iterator<Item = (CellId, CellId)> + '_ {
        self.neighbors(cell).iter().flat_map(move |&over| {
            self.landings(cell, over)
                .iter()
                .map(move |&landing| (over, landing))
        })
    }
}
