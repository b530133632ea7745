//! # Match Host - the single task that owns the authority
//!
//! ## Overview
//!
//! Connection tasks never touch match state. They turn what they read into
//! [`HostEvent`]s and send them over an `mpsc` channel. [`MatchHost::run`]
//! consumes that channel and a clock interval in one `select!` loop, so a
//! move request, a clock tick and a disconnect are each handled to
//! completion before the next one is looked at.
//!
//! ## Room Lifecycle
//!
//! ```text
//! Waiting (0-1 seated) ──second join──► Playing ──MatchOver──► Finished
//!        ▲                                                        │
//!        └──────────────── last seated participant leaves ────────┘
//! ```
//!
//! While a room is Playing or Finished, further joins are refused. Once
//! everyone has left a finished room, a fresh room with a new match id
//! takes its place.

use board_engine::{CellId, Layout, MatchAuthority, MatchEvent, MatchId, MatchPhase, PlayerId};
use shared::ServerMessage;
use std::collections::BTreeMap;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use crate::config::HostConfig;
use crate::layout::seats;
use crate::replication::BroadcastChannel;
use crate::stats::StatsSink;

/// Per-connection queue for messages addressed to one participant only
pub type DirectSender = mpsc::UnboundedSender<ServerMessage>;

/// Everything a connection may ask of the host
#[derive(Debug)]
pub enum HostEvent {
    Join {
        name: String,
        direct: DirectSender,
        reply: oneshot::Sender<Result<Seat, String>>,
    },
    Move {
        player: PlayerId,
        from: CellId,
        to: CellId,
    },
    Snapshot {
        player: PlayerId,
    },
    Left {
        player: PlayerId,
    },
}

/// Handed back to a connection that was seated
#[derive(Debug)]
pub struct Seat {
    pub player: PlayerId,
    pub match_id: MatchId,
    /// Subscribed before any event of the match was sent
    pub events: broadcast::Receiver<MatchEvent>,
}

struct Participant {
    name: String,
    direct: DirectSender,
}

type Authority = MatchAuthority<BroadcastChannel, StatsSink>;

struct Room {
    authority: Authority,
    seated: BTreeMap<PlayerId, Participant>,
}

pub struct MatchHost {
    config: HostConfig,
    layout: Layout,
    stats: StatsSink,
    room: Room,
}

impl MatchHost {
    pub fn new(config: HostConfig, layout: Layout, stats: StatsSink) -> Self {
        let room = Self::open_room(&config, stats.clone());
        Self {
            config,
            layout,
            stats,
            room,
        }
    }

    fn open_room(config: &HostConfig, stats: StatsSink) -> Room {
        let authority =
            MatchAuthority::new(seats(), config.rules, BroadcastChannel::default(), stats);
        tracing::info!("[HOST] Room open for match {}", authority.match_id());
        Room {
            authority,
            seated: BTreeMap::new(),
        }
    }

    pub fn match_id(&self) -> MatchId {
        self.room.authority.match_id()
    }

    /// Serve events until every sender is dropped
    pub async fn run(mut self, mut events: mpsc::Receiver<HostEvent>) {
        let mut ticker = tokio::time::interval(self.config.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
                _ = ticker.tick() => {
                    self.room.authority.tick(self.config.tick);
                }
            }
        }

        tracing::info!("[HOST] All connections closed, host stopping");
    }

    /// Apply one event to the room
    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Join {
                name,
                direct,
                reply,
            } => {
                let outcome = self.seat(name, direct);
                if let Err(Ok(seat)) = reply.send(outcome) {
                    // Connection gave up before hearing back
                    self.leave(seat.player);
                }
            }
            HostEvent::Move { player, from, to } => {
                if let Err(error) = self.room.authority.request_move(player, from, to) {
                    self.send_direct(player, ServerMessage::MoveRejected { from, to, error });
                }
            }
            HostEvent::Snapshot { player } => {
                let snapshot = self.room.authority.snapshot();
                self.send_direct(player, ServerMessage::Snapshot(snapshot));
            }
            HostEvent::Left { player } => self.leave(player),
        }
    }

    fn seat(&mut self, name: String, direct: DirectSender) -> Result<Seat, String> {
        if self.room.authority.phase() != MatchPhase::AwaitingFirstTurn {
            return Err("match already in progress".to_string());
        }
        let Some(player) = seats().iter().find(|p| !self.room.seated.contains_key(p)) else {
            return Err("match is full".to_string());
        };

        let events = self.room.authority.channel().subscribe();
        tracing::info!("[HOST] {name} seated as {player}");
        self.room.seated.insert(player, Participant { name, direct });

        if self.room.seated.len() == 2 {
            if let Err(e) = self.room.authority.begin_match(&self.layout) {
                tracing::error!("[HOST] Could not start match: {e}");
            }
        }

        Ok(Seat {
            player,
            match_id: self.room.authority.match_id(),
            events,
        })
    }

    fn leave(&mut self, player: PlayerId) {
        let Some(participant) = self.room.seated.remove(&player) else {
            return;
        };
        tracing::info!("[HOST] {} ({player}) left", participant.name);

        if self.room.authority.is_active() {
            if let Err(e) = self.room.authority.on_participant_left(player) {
                tracing::warn!("[HOST] Could not end match for {player}: {e}");
            }
        }

        if self.room.authority.phase() == MatchPhase::MatchOver && self.room.seated.is_empty() {
            self.room = Self::open_room(&self.config, self.stats.clone());
        }
    }

    fn send_direct(&self, player: PlayerId, msg: ServerMessage) {
        let Some(participant) = self.room.seated.get(&player) else {
            tracing::debug!("[HOST] Dropping reply for unseated {player}");
            return;
        };
        if participant.direct.send(msg).is_err() {
            tracing::debug!("[HOST] Connection for {player} already closed");
        }
    }
}
