//! Host configuration
//!
//! Every flag can also come from the environment; `main` loads `.env` with
//! `dotenvy` before parsing, so a `.env` file next to the binary works too.

use anyhow::ensure;
use board_engine::RulesConfig;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Largest built-in hex board; radius 64 is already about 12k cells
pub const MAX_BOARD_RADIUS: u32 = 64;

#[derive(Parser, Debug, Clone)]
#[command(name = "backend", about = "Authoritative Tessellaction match host")]
pub struct ServerArgs {
    /// Address to accept participant connections on
    #[arg(long, env = "TESSELLACTION_BIND", default_value = "127.0.0.1:7777")]
    pub bind: SocketAddr,

    /// Seconds a player has for one turn
    #[arg(long, env = "TESSELLACTION_TURN_SECS", default_value_t = 30)]
    pub turn_secs: u64,

    /// Turn clock tick interval, in milliseconds
    #[arg(long, env = "TESSELLACTION_TICK_MS", default_value_t = 1000)]
    pub tick_ms: u64,

    /// JSON layout file; the built-in hex board is used when absent
    #[arg(long, env = "TESSELLACTION_LAYOUT")]
    pub layout: Option<PathBuf>,

    /// Radius of the built-in hex board
    #[arg(long, env = "TESSELLACTION_BOARD_RADIUS", default_value_t = 3)]
    pub board_radius: u32,

    /// Endpoint that receives end-of-match stats as JSON
    #[arg(long, env = "TESSELLACTION_STATS_URL")]
    pub stats_url: Option<String>,
}

/// Settings the match host runs with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostConfig {
    pub rules: RulesConfig,
    /// How often the turn clock is advanced
    pub tick: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            tick: Duration::from_secs(1),
        }
    }
}

impl ServerArgs {
    pub fn host_config(&self) -> anyhow::Result<HostConfig> {
        ensure!(self.turn_secs > 0, "--turn-secs must be at least 1");
        ensure!(self.tick_ms > 0, "--tick-ms must be at least 1");
        ensure!(
            (1..=MAX_BOARD_RADIUS).contains(&self.board_radius),
            "--board-radius must be between 1 and {MAX_BOARD_RADIUS}"
        );

        Ok(HostConfig {
            rules: RulesConfig::default().with_turn_limit(Duration::from_secs(self.turn_secs)),
            tick: Duration::from_millis(self.tick_ms),
        })
    }
}
