//! # Engine Constants - Geometry Thresholds & Rule Defaults
//!
//! ## Geometry
//!
//! Layouts place neighboring cells one unit apart. The thresholds below are
//! the defaults of [`crate::config::TopologyConfig`] and
//! [`crate::config::RulesConfig`]:
//!
//! - **Neighbor radius** (`1.1`): cells closer than this are adjacent. A
//!   little slack over `1.0` absorbs float noise from scene exports.
//! - **Capture distance** (`1.5`): a move longer than this is a jump. Simple
//!   moves are at most `NEIGHBOR_RADIUS` long and jumps are about `2.0`, so
//!   the two never overlap.
//! - **Jump alignment** (`0.95`): minimum cosine between the `from → over`
//!   and `over → landing` directions, roughly 18 degrees of tolerance.
//!
//! ## Rules
//!
//! - A turn lasts 30 seconds unless configured otherwise.
//! - A player holding this many interactable pieces or fewer after a capture
//!   has lost.

use std::time::Duration;

pub const NEIGHBOR_RADIUS: f32 = 1.1;
pub const CAPTURE_DISTANCE: f32 = 1.5;
pub const JUMP_ALIGNMENT: f32 = 0.95;

pub const DEFAULT_TURN_LIMIT: Duration = Duration::from_secs(30);
pub const WIN_THRESHOLD: usize = 1;

/// Score credited to the winner in the stats summary
pub const WIN_SCORE_DELTA: i64 = 10;
/// Score credited to the loser in the stats summary
pub const LOSS_SCORE_DELTA: i64 = -5;
