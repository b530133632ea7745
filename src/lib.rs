//! Tessellaction terminal participant
//!
//! The rules live in `board_engine` and the wire format in `shared`; this
//! crate only connects, mirrors the board and relays typed commands.

pub mod client;

pub use client::{parse_command, ClientArgs, Command, CommandError, Session};
