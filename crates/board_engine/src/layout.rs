//! Starting layouts
//!
//! A [`Layout`] is the declarative starting configuration handed to
//! [`crate::authority::MatchAuthority::begin_match`]: one [`CellSpec`] per
//! cell with its position and initial piece state. Layouts normally come
//! from a scene export (JSON, loaded by the backend); [`hex_board`] builds
//! the default tessellated board when none is supplied.
//!
//! # Hex Board
//!
//! Cells sit on an axial hex grid `(q, r)` with `|q|, |r|, |q + r| <= radius`,
//! spaced one unit apart so every interior cell has six neighbors and every
//! straight line of three cells is a possible jump:
//!
//! ```text
//!        o o o o          r = -3   second player
//!       o o o o o         r = -2   second player
//!      . . . . . .        r = -1
//!     . . . . . . .       r =  0
//!      . . . . . .        r =  1
//!       o o o o o         r =  2   first player
//!        o o o o          r =  3   first player
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{CellId, MatchPlayers, Owner, Position};

/// Initial state of one cell
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    pub id: CellId,
    pub position: Position,
    pub owner: Owner,
    pub interactable: bool,
}

impl CellSpec {
    /// An empty cell
    pub fn empty(id: u32, position: Position) -> Self {
        Self {
            id: CellId(id),
            position,
            owner: Owner::Unowned,
            interactable: false,
        }
    }

    /// A cell holding an interactable piece of `owner`
    pub fn owned(id: u32, position: Position, owner: Owner) -> Self {
        Self {
            id: CellId(id),
            position,
            owner,
            interactable: !owner.is_unowned(),
        }
    }
}

/// Ordered list of cell specs making up a board
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub cells: Vec<CellSpec>,
}

impl Layout {
    pub fn new(cells: Vec<CellSpec>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Build the default hex board of the given radius
///
/// The first player owns the `home` rows at positive `r`, the second player
/// the mirrored rows at negative `r`. With `radius >= 2` the home depth is
/// two rows; every owned piece starts interactable.
pub fn hex_board(radius: u32, players: MatchPlayers) -> Layout {
    let radius = radius as i32;
    let home = (radius - 1).max(1);
    let row_height = 3f32.sqrt() / 2.0;

    let mut cells = Vec::new();
    let mut next_id = 0u32;

    for r in -radius..=radius {
        let q_min = (-radius).max(-radius - r);
        let q_max = radius.min(radius - r);
        for q in q_min..=q_max {
            let position = Position::new(q as f32 + r as f32 / 2.0, 0.0, r as f32 * row_height);
            let owner = if r >= home {
                Owner::Player(players.first)
            } else if r <= -home {
                Owner::Player(players.second)
            } else {
                Owner::Unowned
            };
            cells.push(CellSpec::owned(next_id, position, owner));
            next_id += 1;
        }
    }

    Layout::new(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerId;

    fn players() -> MatchPlayers {
        MatchPlayers::new(PlayerId(1), PlayerId(2))
    }

    #[test]
    fn test_hex_board_cell_count() {
        //! A hex of radius n has 3n(n+1) + 1 cells
        assert_eq!(hex_board(0, players()).len(), 1);
        assert_eq!(hex_board(2, players()).len(), 19);
        assert_eq!(hex_board(3, players()).len(), 37);
    }

    #[test]
    fn test_hex_board_home_rows_are_mirrored() {
        let layout = hex_board(3, players());
        let count = |owner: Owner| layout.cells.iter().filter(|c| c.owner == owner).count();

        assert_eq!(count(Owner::Player(PlayerId(1))), 9, "rows of 5 and 4 cells");
        assert_eq!(count(Owner::Player(PlayerId(2))), 9);
        assert_eq!(count(Owner::Unowned), 19);
    }

    #[test]
    fn test_hex_board_pieces_start_interactable_only_when_owned() {
        for cell in hex_board(3, players()).cells {
            assert_eq!(cell.interactable, !cell.owner.is_unowned());
        }
    }

    #[test]
    fn test_layout_json_shape() {
        let layout = Layout::new(vec![CellSpec::owned(
            4,
            Position::new(1.0, 0.0, 0.0),
            Owner::Player(PlayerId(2)),
        )]);
        let json = serde_json::to_string(&layout).expect("Should serialize");
        assert!(json.contains(r#""owner":{"Player":2}"#), "{json}");

        let decoded: Layout = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(decoded, layout);
    }
}
