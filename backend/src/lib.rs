//! Authoritative match host
//!
//! Seats two participants connecting over TCP, runs one
//! [`board_engine::MatchAuthority`] per match inside a single task, and
//! fans the authority's events out to every connection.
//!
//! - `config` - command line and environment settings
//! - `layout` - starting layout loading and the fixed seat ids
//! - `replication` - broadcast-backed replication channel
//! - `stats` - end-of-match stats reporters
//! - `host` - the single-writer match loop
//! - `server` - TCP accept loop and per-connection tasks

pub mod config;
pub mod host;
pub mod layout;
pub mod replication;
pub mod server;
pub mod stats;
