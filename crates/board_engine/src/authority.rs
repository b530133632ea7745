//! # Match Authority - the single writer of match state
//!
//! ## Overview
//!
//! [`MatchAuthority`] owns the canonical [`Board`], the turn pointer and the
//! [`TurnClock`]. Every mutation goes through one of its methods, and every
//! mutation is announced on the [`ReplicationChannel`] before the method
//! returns, so participants applying the events in order end up with the
//! same board.
//!
//! ## State Machine
//!
//! ```text
//! AwaitingFirstTurn ──begin_match──► TurnActive(first)
//! TurnActive(p) ──move / timeout──► TurnActive(opponent)
//! TurnActive(p) ──winning capture / participant left──► MatchOver
//! ```
//!
//! ## Concurrency
//!
//! The authority is a plain `&mut self` state machine. Callers serialize
//! access (the backend runs it inside one task), so a request is validated,
//! applied and broadcast to completion before the next is looked at. Clock
//! expiries carry the [`TurnNumber`] they belong to, and an expiry for a turn
//! that has already ended is ignored.
//!
//! ## Example
//!
//! ```rust,ignore
//! let players = MatchPlayers::new(PlayerId(1), PlayerId(2));
//! let mut authority = MatchAuthority::new(players, RulesConfig::default(), Vec::new(), Vec::new());
//! authority.begin_match(&hex_board(3, players))?;
//! authority.request_move(PlayerId(1), CellId(30), CellId(23))?;
//! ```

use std::collections::BTreeSet;
use std::time::Duration;

use crate::board::{Board, PieceChange};
use crate::clock::{ClockTick, TurnClock};
use crate::config::RulesConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::{
    MatchEvent, MatchPhase, MatchResult, MatchSnapshot, MatchSummary, MoveRecord, Outcome,
    ReplicationChannel, StatsReporter, WinReason,
};
use crate::layout::Layout;
use crate::moves::{self, MoveKind};
use crate::types::{CellId, MatchId, MatchPlayers, Owner, PlayerId, TurnNumber};

pub struct MatchAuthority<R, S> {
    match_id: MatchId,
    players: MatchPlayers,
    rules: RulesConfig,
    channel: R,
    stats: S,
    board: Option<Board>,
    phase: MatchPhase,
    current: PlayerId,
    turn: TurnNumber,
    clock: TurnClock,
    result: MatchResult,
    history: Vec<MoveRecord>,
}

impl<R: ReplicationChannel, S: StatsReporter> MatchAuthority<R, S> {
    /// Create an authority for `players`; `players.first` takes the first turn
    pub fn new(players: MatchPlayers, rules: RulesConfig, channel: R, stats: S) -> Self {
        Self {
            match_id: MatchId::new(),
            players,
            rules,
            channel,
            stats,
            board: None,
            phase: MatchPhase::AwaitingFirstTurn,
            current: players.first,
            turn: TurnNumber::default(),
            clock: TurnClock::new(rules.turn_limit),
            result: MatchResult::InProgress,
            history: Vec::new(),
        }
    }

    /// Set up the board from `layout`, start the clock and broadcast
    /// [`MatchEvent::MatchStarted`]
    ///
    /// # Errors
    ///
    /// - [`EngineError::MatchAlreadyStarted`] on any call after the first
    ///   successful one
    /// - [`EngineError::Layout`] for a malformed layout, including one whose
    ///   spacing makes steps and jumps indistinguishable by length; the
    ///   authority stays in `AwaitingFirstTurn`
    pub fn begin_match(&mut self, layout: &Layout) -> EngineResult<()> {
        if self.phase != MatchPhase::AwaitingFirstTurn {
            return Err(EngineError::MatchAlreadyStarted);
        }

        let board = Board::from_layout(layout, &self.rules.topology)?;
        board.validate_owners(&self.players)?;
        board.validate_move_lengths(self.rules.capture_distance)?;
        let snapshot = board.snapshot();

        self.board = Some(board);
        self.phase = MatchPhase::TurnActive;
        self.current = self.players.first;
        self.turn = TurnNumber(1);
        self.clock.restart();

        tracing::info!(
            "[AUTHORITY] Match {} started: {} cells, {} moves first",
            self.match_id,
            snapshot.cells.len(),
            self.current
        );

        self.channel.broadcast(MatchEvent::MatchStarted {
            board: snapshot,
            first_turn: self.current,
            turn: self.turn,
            deadline: self.clock.remaining(),
        });
        Ok(())
    }

    /// Validate and apply a move, broadcasting the resulting changes
    ///
    /// On success the broadcast is, in order: the captured piece (if any),
    /// the destination, the origin, then either `TurnChanged` or `MatchOver`.
    /// A rejected request changes nothing and broadcasts nothing, so it can
    /// be resent safely and gets the same answer.
    pub fn request_move(
        &mut self,
        requester: PlayerId,
        from: CellId,
        to: CellId,
    ) -> EngineResult<MoveKind> {
        let kind = match self.validate_move(requester, from, to) {
            Ok(kind) => kind,
            Err(err) => {
                tracing::debug!("[AUTHORITY] Rejected {requester} {from} -> {to}: {err}");
                return Err(err);
            }
        };

        let mover = Owner::Player(requester);
        let mut changes = Vec::with_capacity(3);
        if let Some(captured) = kind.captured() {
            changes.push(PieceChange {
                cell: captured,
                owner: mover,
                interactable: false,
            });
        }
        changes.push(PieceChange {
            cell: to,
            owner: mover,
            interactable: true,
        });
        changes.push(PieceChange {
            cell: from,
            owner: mover,
            interactable: false,
        });

        let board = self.board.as_mut().ok_or(EngineError::MatchNotActive)?;
        for change in changes {
            board.apply(change)?;
            self.channel.broadcast(change.into());
        }

        self.history.push(MoveRecord {
            player: requester,
            from,
            to,
            kind,
            turn: self.turn,
        });
        tracing::info!("[AUTHORITY] {requester} moved {from} -> {to} ({kind:?})");

        let opponent = self
            .players
            .opponent_of(requester)
            .ok_or(EngineError::NotAParticipant { player: requester })?;

        if kind.is_capture() {
            let remaining = board.interactable_count(opponent);
            if remaining <= self.rules.win_threshold {
                tracing::info!(
                    "[AUTHORITY] {opponent} is down to {remaining} interactable pieces"
                );
                self.finish(requester, WinReason::NormalWin);
                return Ok(kind);
            }
        }

        self.switch_turn(opponent);
        Ok(kind)
    }

    fn validate_move(
        &self,
        requester: PlayerId,
        from: CellId,
        to: CellId,
    ) -> EngineResult<MoveKind> {
        let board = match (&self.board, self.phase) {
            (Some(board), MatchPhase::TurnActive) => board,
            _ => return Err(EngineError::MatchNotActive),
        };
        if requester != self.current {
            return Err(EngineError::NotYourTurn {
                requester,
                current: self.current,
            });
        }

        let piece = board
            .state(from)
            .filter(|s| !s.owner.is_unowned())
            .ok_or(EngineError::NoPieceAtCell { cell: from })?;
        if piece.owner != Owner::Player(requester) {
            return Err(EngineError::NotOwner {
                cell: from,
                requester,
            });
        }
        if !piece.interactable {
            return Err(EngineError::PieceInactive { cell: from });
        }
        if !moves::legal_destinations(board, from).contains(&to) {
            return Err(EngineError::IllegalDestination { from, to });
        }

        moves::classify(board, requester, from, to, self.rules.capture_distance)
            .ok_or(EngineError::IllegalDestination { from, to })
    }

    /// Advance the turn clock by `elapsed`
    ///
    /// Returns `true` when the tick expired the current turn and play passed
    /// to the opponent.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if self.phase != MatchPhase::TurnActive {
            return false;
        }
        match self.clock.tick(elapsed) {
            ClockTick::Expired => self.on_turn_timeout(self.turn),
            ClockTick::Running(_) | ClockTick::Idle => false,
        }
    }

    /// Pass the turn to the opponent without touching the board
    ///
    /// `turn` identifies the turn that ran out. Returns `false` and does
    /// nothing when the match is not active or `turn` has already ended.
    pub fn on_turn_timeout(&mut self, turn: TurnNumber) -> bool {
        if self.phase != MatchPhase::TurnActive || turn != self.turn {
            tracing::debug!(
                "[AUTHORITY] Ignoring stale timeout for turn {} (current {})",
                turn.0,
                self.turn.0
            );
            return false;
        }

        let Some(opponent) = self.players.opponent_of(self.current) else {
            return false;
        };
        tracing::info!("[AUTHORITY] {} ran out of time", self.current);
        self.switch_turn(opponent);
        true
    }

    /// End the match in favor of whoever is left
    ///
    /// # Errors
    ///
    /// [`EngineError::MatchNotActive`] when the match is not in progress,
    /// [`EngineError::NotAParticipant`] when `player` is not in it.
    pub fn on_participant_left(&mut self, player: PlayerId) -> EngineResult<PlayerId> {
        if self.phase != MatchPhase::TurnActive {
            return Err(EngineError::MatchNotActive);
        }
        let winner = self
            .players
            .opponent_of(player)
            .ok_or(EngineError::NotAParticipant { player })?;

        tracing::info!("[AUTHORITY] {player} left the match");
        self.finish(winner, WinReason::Disconnect);
        Ok(winner)
    }

    fn switch_turn(&mut self, next: PlayerId) {
        self.current = next;
        self.turn = self.turn.next();
        self.clock.restart();
        self.channel.broadcast(MatchEvent::TurnChanged {
            player: next,
            turn: self.turn,
            deadline: self.clock.remaining(),
        });
    }

    fn finish(&mut self, winner: PlayerId, reason: WinReason) {
        self.phase = MatchPhase::MatchOver;
        self.clock.stop();
        self.result = MatchResult::Decided { winner, reason };

        tracing::info!(
            "[AUTHORITY] Match {} over: {winner} wins ({reason:?})",
            self.match_id
        );
        self.channel.broadcast(MatchEvent::MatchOver { winner, reason });

        let score = self.rules.score;
        for player in self.players.iter() {
            let won = player == winner;
            self.stats.report(MatchSummary {
                match_id: self.match_id,
                player,
                outcome: if won { Outcome::Win } else { Outcome::Lose },
                reason,
                score_delta: if won { score.win } else { score.loss },
                games_played_delta: 1,
                games_won_delta: u32::from(won),
            });
        }
    }

    /// Legal destinations for the piece on `cell` on the current board
    pub fn legal_destinations(&self, cell: CellId) -> BTreeSet<CellId> {
        self.board
            .as_ref()
            .map(|board| moves::legal_destinations(board, cell))
            .unwrap_or_default()
    }

    /// Everything a participant needs to resynchronize
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            match_id: self.match_id,
            players: self.players,
            phase: self.phase,
            board: self.board.as_ref().map(Board::snapshot),
            current_player: (self.phase == MatchPhase::TurnActive).then_some(self.current),
            turn: self.turn,
            time_remaining: self.clock.remaining(),
            result: self.result,
        }
    }
}

impl<R, S> MatchAuthority<R, S> {
    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn players(&self) -> MatchPlayers {
        self.players
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == MatchPhase::TurnActive
    }

    /// Current turn holder while the match is active
    pub fn current_player(&self) -> Option<PlayerId> {
        self.is_active().then_some(self.current)
    }

    pub fn turn(&self) -> TurnNumber {
        self.turn
    }

    pub fn time_remaining(&self) -> Duration {
        self.clock.remaining()
    }

    pub fn result(&self) -> MatchResult {
        self.result
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn channel(&self) -> &R {
        &self.channel
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }
}
