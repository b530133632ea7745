//! Starting layout for hosted matches
//!
//! The host always seats the first connection as [`FIRST_SEAT`] and the
//! second as [`SECOND_SEAT`], so layout files refer to those ids as owners.

use anyhow::Context;
use board_engine::{hex_board, Board, Layout, MatchPlayers, PlayerId, RulesConfig};
use std::path::Path;

/// Seat of the first participant to join; moves first
pub const FIRST_SEAT: PlayerId = PlayerId(1);
pub const SECOND_SEAT: PlayerId = PlayerId(2);

pub fn seats() -> MatchPlayers {
    MatchPlayers::new(FIRST_SEAT, SECOND_SEAT)
}

/// Load the layout file at `path`, or build the hex board of `radius`
///
/// The result is checked once here so that a broken file fails at startup
/// instead of when the second player joins.
pub fn load_layout(
    path: Option<&Path>,
    radius: u32,
    rules: &RulesConfig,
) -> anyhow::Result<Layout> {
    let layout = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read layout {}", path.display()))?;
            serde_json::from_str::<Layout>(&text)
                .with_context(|| format!("failed to parse layout {}", path.display()))?
        }
        None => hex_board(radius, seats()),
    };

    let board =
        Board::from_layout(&layout, &rules.topology).context("layout is not a valid board")?;
    board
        .validate_owners(&seats())
        .context("layout owners must be players 1 and 2")?;
    board
        .validate_move_lengths(rules.capture_distance)
        .context("layout spacing does not match the capture distance")?;

    tracing::info!(
        "[BACKEND] Layout ready: {} cells, {} + {} pieces",
        layout.len(),
        board.interactable_count(FIRST_SEAT),
        board.interactable_count(SECOND_SEAT)
    );
    Ok(layout)
}
