//! Headless terminal participant
//!
//! Connects to a match host, keeps a [`BoardReplica`] from the events it
//! receives and turns lines typed on stdin into requests:
//!
//! ```text
//! move <from> <to>   request a move
//! hints <cell>       legal destinations of a piece, from the local replica
//! board              print the board
//! sync               ask the host for a full snapshot
//! quit               leave the match
//! ```
//!
//! The client never decides anything. Hints are only a preview; the host
//! answers every move with events or a rejection.

use anyhow::{bail, Context};
use board_engine::{
    BoardReplica, CellId, MatchEvent, MatchId, MatchResult, Owner, PlayerId, TopologyConfig,
    WinReason,
};
use clap::Parser;
use shared::{read_frame, write_frame, ClientMessage, FrameError, ServerMessage, PROTOCOL_VERSION};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

#[derive(Parser, Debug, Clone)]
#[command(name = "tessellaction", about = "Play a Tessellaction match from the terminal")]
pub struct ClientArgs {
    /// Match host address
    #[arg(long, env = "TESSELLACTION_SERVER", default_value = "127.0.0.1:7777")]
    pub server: String,

    /// Name shown in the host's logs
    #[arg(long, env = "TESSELLACTION_NAME", default_value = "player")]
    pub name: String,
}

/// One line of user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(CellId, CellId),
    Hints(CellId),
    Board,
    Sync,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try move, hints, board, sync, quit)")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{0}' is not a cell id")]
    BadCell(String),
}

fn parse_cell(
    token: Option<&str>,
    command: &'static str,
    argument: &'static str,
) -> Result<CellId, CommandError> {
    let token = token.ok_or(CommandError::MissingArgument { command, argument })?;
    token
        .trim_start_matches('#')
        .parse()
        .map(CellId)
        .map_err(|_| CommandError::BadCell(token.to_string()))
}

/// Parse a line typed by the user
///
/// Cell ids may be written with or without the leading `#`.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(CommandError::Empty);
    };

    match verb.to_ascii_lowercase().as_str() {
        "move" | "m" => {
            let from = parse_cell(words.next(), "move", "a source cell")?;
            let to = parse_cell(words.next(), "move", "a destination cell")?;
            Ok(Command::Move(from, to))
        }
        "hints" | "h" => Ok(Command::Hints(parse_cell(words.next(), "hints", "a cell")?)),
        "board" | "b" => Ok(Command::Board),
        "sync" => Ok(Command::Sync),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Participant-side view of one match
pub struct Session {
    player: PlayerId,
    match_id: MatchId,
    replica: BoardReplica,
    needs_resync: bool,
}

impl Session {
    pub fn new(player: PlayerId, match_id: MatchId) -> Self {
        Self {
            player,
            match_id,
            replica: BoardReplica::new(TopologyConfig::default()),
            needs_resync: false,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn replica(&self) -> &BoardReplica {
        &self.replica
    }

    /// True once after an event failed to apply; the caller should send
    /// `RequestSnapshot`
    pub fn take_resync(&mut self) -> bool {
        std::mem::take(&mut self.needs_resync)
    }

    /// Apply a message from the host, returning lines to show the user
    pub fn handle(&mut self, msg: ServerMessage) -> Vec<String> {
        match msg {
            ServerMessage::Event(event) => {
                if let Err(e) = self.replica.apply(&event) {
                    tracing::warn!("[CLIENT] Replica out of sync: {e}");
                    self.needs_resync = true;
                    return vec![format!("out of sync ({e}), requesting snapshot")];
                }
                self.describe(&event)
            }
            ServerMessage::MoveRejected { from, to, error } => {
                vec![format!("move {from} -> {to} rejected: {error}")]
            }
            ServerMessage::Snapshot(snapshot) => match self.replica.resync(&snapshot) {
                Ok(()) => vec!["board resynchronized".to_string(), self.render()],
                Err(e) => vec![format!("snapshot could not be applied: {e}")],
            },
            ServerMessage::Welcome { player, .. } => {
                vec![format!("already seated, ignoring second welcome as {player}")]
            }
            ServerMessage::Rejected { reason } => vec![format!("host: {reason}")],
        }
    }

    fn describe(&self, event: &MatchEvent) -> Vec<String> {
        match event {
            MatchEvent::MatchStarted { first_turn, .. } => vec![
                format!("match {} started, you are {}", self.match_id, self.player),
                self.render(),
                self.turn_line(*first_turn, self.replica.deadline().as_secs()),
            ],
            MatchEvent::PieceChanged { .. } => Vec::new(),
            MatchEvent::TurnChanged {
                player, deadline, ..
            } => vec![self.render(), self.turn_line(*player, deadline.as_secs())],
            MatchEvent::MatchOver { winner, reason } => {
                let verdict = if *winner == self.player { "you win" } else { "you lose" };
                let why = match reason {
                    WinReason::NormalWin => "no interactable pieces left",
                    WinReason::Disconnect => "a player left",
                };
                vec![self.render(), format!("{verdict} ({why})")]
            }
        }
    }

    fn turn_line(&self, player: PlayerId, secs: u64) -> String {
        if player == self.player {
            format!("your turn, {secs}s")
        } else {
            format!("waiting for {player}, {secs}s")
        }
    }

    /// Hint line for `cell` computed on the local replica
    pub fn hints(&self, cell: CellId) -> String {
        let targets = self.replica.legal_destinations(cell);
        if targets.is_empty() {
            return format!("{cell} cannot move");
        }
        let list: Vec<String> = targets.iter().map(ToString::to_string).collect();
        format!("{cell} -> {}", list.join(" "))
    }

    /// Text picture of the board
    ///
    /// Cells are grouped into rows by depth and placed by their x
    /// coordinate, each shown as its id plus a marker:
    /// `.` empty, `*` yours, `+` yours but spent, `o` theirs, `x` theirs
    /// but spent.
    pub fn render(&self) -> String {
        let Some(snapshot) = self.replica.board_snapshot() else {
            return "(no board yet)".to_string();
        };

        let min_x = snapshot
            .cells
            .iter()
            .map(|c| c.position.x)
            .fold(f32::INFINITY, f32::min);

        let mut rows: Vec<(i64, Vec<(usize, String)>)> = Vec::new();
        for cell in &snapshot.cells {
            let row_key = (cell.position.z * 100.0).round() as i64;
            let column = ((cell.position.x - min_x) * 4.0).round() as usize;
            let mark = match cell.owner {
                Owner::Unowned => '.',
                Owner::Player(p) if p == self.player && cell.interactable => '*',
                Owner::Player(p) if p == self.player => '+',
                Owner::Player(_) if cell.interactable => 'o',
                Owner::Player(_) => 'x',
            };
            let token = format!("{:>3}{mark}", cell.id.0);
            match rows.iter_mut().find(|(key, _)| *key == row_key) {
                Some((_, tokens)) => tokens.push((column, token)),
                None => rows.push((row_key, vec![(column, token)])),
            }
        }
        rows.sort_by_key(|(key, _)| *key);

        let mut out = String::new();
        for (_, mut tokens) in rows {
            tokens.sort_by_key(|(column, _)| *column);
            let mut line = String::new();
            for (column, token) in tokens {
                while line.len() < column {
                    line.push(' ');
                }
                line.push_str(&token);
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }

        if let MatchResult::Decided { winner, .. } = self.replica.result() {
            out.push_str(&format!("winner: {winner}\n"));
        }
        out
    }
}

/// Open a connection and get seated
pub async fn connect(
    server: &str,
    name: &str,
) -> anyhow::Result<(OwnedReadHalf, OwnedWriteHalf, Session)> {
    let stream = TcpStream::connect(server)
        .await
        .with_context(|| format!("failed to connect to {server}"))?;
    stream.set_nodelay(true).ok();
    let (mut reader, mut writer) = stream.into_split();

    write_frame(
        &mut writer,
        &ClientMessage::Hello {
            protocol_version: PROTOCOL_VERSION,
            player_name: name.to_string(),
        },
    )
    .await?;

    match read_frame::<_, ServerMessage>(&mut reader).await? {
        Some(ServerMessage::Welcome { player, match_id }) => {
            tracing::info!("[CLIENT] Seated as {player} in match {match_id}");
            Ok((reader, writer, Session::new(player, match_id)))
        }
        Some(ServerMessage::Rejected { reason }) => bail!("host refused the connection: {reason}"),
        Some(other) => bail!("unexpected first message from host: {other:?}"),
        None => bail!("host closed the connection"),
    }
}

/// Play until the user quits or the host goes away
pub async fn run(args: ClientArgs) -> anyhow::Result<()> {
    let (mut reader, mut writer, mut session) = connect(&args.server, &args.name).await?;
    println!("connected as {}, waiting for the match to start", session.player());

    let (tx, mut inbox) = mpsc::channel::<Result<ServerMessage, FrameError>>(64);
    tokio::spawn(async move {
        loop {
            let msg = match read_frame(&mut reader).await {
                Ok(Some(msg)) => Ok(msg),
                Ok(None) => break,
                Err(e) => Err(e),
            };
            let failed = msg.is_err();
            if tx.send(msg).await.is_err() || failed {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            msg = inbox.recv() => match msg {
                Some(Ok(msg)) => {
                    for line in session.handle(msg) {
                        println!("{line}");
                    }
                    if session.take_resync() {
                        write_frame(&mut writer, &ClientMessage::RequestSnapshot).await?;
                    }
                }
                Some(Err(e)) => return Err(e).context("lost connection to host"),
                None => {
                    println!("host closed the connection");
                    return Ok(());
                }
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    write_frame(&mut writer, &ClientMessage::Goodbye).await.ok();
                    return Ok(());
                };
                match parse_command(&line) {
                    Ok(Command::Move(from, to)) => {
                        write_frame(&mut writer, &ClientMessage::MoveRequest { from, to }).await?;
                    }
                    Ok(Command::Hints(cell)) => println!("{}", session.hints(cell)),
                    Ok(Command::Board) => print!("{}", session.render()),
                    Ok(Command::Sync) => {
                        write_frame(&mut writer, &ClientMessage::RequestSnapshot).await?;
                    }
                    Ok(Command::Quit) => {
                        write_frame(&mut writer, &ClientMessage::Goodbye).await.ok();
                        return Ok(());
                    }
                    Err(CommandError::Empty) => {}
                    Err(e) => println!("{e}"),
                }
            }
        }
    }
}
