//! TCP transport
//!
//! [`serve`] spawns the [`MatchHost`] task and accepts connections. Each
//! connection runs a reader (the calling task) and a writer (spawned):
//!
//! - the reader decodes [`ClientMessage`] frames into [`HostEvent`]s
//! - the writer forwards broadcast events and direct replies as
//!   [`ServerMessage`] frames, in the order it receives them
//!
//! Once seated, a connection is reported to the host as having left however
//! it ends: a failed Welcome, a read or write error, EOF or `Goodbye`. When
//! the writer fails the reader is stopped too.

use anyhow::Context;
use shared::{read_frame, write_frame, ClientMessage, FrameError, ServerMessage, PROTOCOL_VERSION};
use std::net::SocketAddr;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};

use board_engine::{MatchEvent, PlayerId};

use crate::host::{HostEvent, MatchHost, Seat};

/// Host inbox depth; connections wait when it is full
const HOST_QUEUE: usize = 256;

/// Run the host and accept participants on `listener` until it fails
pub async fn serve(listener: TcpListener, host: MatchHost) -> anyhow::Result<()> {
    let (host_tx, host_rx) = mpsc::channel(HOST_QUEUE);
    tokio::spawn(host.run(host_rx));

    loop {
        let (stream, peer) = listener.accept().await.context("accept failed")?;
        let host_tx = host_tx.clone();
        tokio::spawn(async move {
            tracing::debug!("[SERVER] Connection from {peer}");
            if let Err(e) = handle_connection(stream, peer, host_tx).await {
                tracing::warn!("[SERVER] Connection {peer} ended with error: {e:#}");
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    host: mpsc::Sender<HostEvent>,
) -> anyhow::Result<()> {
    stream.set_nodelay(true).ok();
    let (mut reader, mut writer) = stream.into_split();

    let name = match read_frame::<_, ClientMessage>(&mut reader).await? {
        Some(ClientMessage::Hello {
            protocol_version,
            player_name,
        }) if protocol_version == PROTOCOL_VERSION => player_name,
        Some(ClientMessage::Hello {
            protocol_version, ..
        }) => {
            let reason = format!(
                "protocol version {protocol_version} not supported, expected {PROTOCOL_VERSION}"
            );
            return reject(&mut writer, reason).await;
        }
        Some(_) => return reject(&mut writer, "expected Hello".to_string()).await,
        None => return Ok(()),
    };

    let (direct_tx, direct_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = oneshot::channel();
    host.send(HostEvent::Join {
        name: name.clone(),
        direct: direct_tx,
        reply: reply_tx,
    })
    .await
    .context("host stopped")?;

    let seat = match reply_rx.await.context("host dropped join request")? {
        Ok(seat) => seat,
        Err(reason) => {
            tracing::info!("[SERVER] Refused {name} from {peer}: {reason}");
            return reject(&mut writer, reason).await;
        }
    };
    let player = seat.player;

    let result = run_seat(reader, writer, seat, direct_rx, &host).await;

    // Seated connections always report leaving, whatever ended them
    host.send(HostEvent::Left { player }).await.ok();
    result
}

/// Greet a seated participant and pump frames until either side stops
async fn run_seat(
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    seat: Seat,
    direct: mpsc::UnboundedReceiver<ServerMessage>,
    host: &mpsc::Sender<HostEvent>,
) -> anyhow::Result<()> {
    let player = seat.player;
    write_frame(
        &mut writer,
        &ServerMessage::Welcome {
            player,
            match_id: seat.match_id,
        },
    )
    .await
    .context("failed to send Welcome")?;

    let mut writer_task = tokio::spawn(write_loop(
        writer,
        seat.events,
        direct,
        host.clone(),
        player,
    ));
    tokio::select! {
        result = read_loop(&mut reader, host, player) => {
            writer_task.abort();
            result
        }
        joined = &mut writer_task => match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e).context("failed to write to participant"),
            Err(e) => Err(e).context("writer task stopped"),
        },
    }
}

async fn reject(writer: &mut OwnedWriteHalf, reason: String) -> anyhow::Result<()> {
    write_frame(writer, &ServerMessage::Rejected { reason }).await?;
    Ok(())
}

async fn read_loop(
    reader: &mut OwnedReadHalf,
    host: &mpsc::Sender<HostEvent>,
    player: PlayerId,
) -> anyhow::Result<()> {
    loop {
        let event = match read_frame::<_, ClientMessage>(reader).await? {
            Some(ClientMessage::MoveRequest { from, to }) => HostEvent::Move { player, from, to },
            Some(ClientMessage::RequestSnapshot) => HostEvent::Snapshot { player },
            Some(ClientMessage::Goodbye) | None => return Ok(()),
            Some(ClientMessage::Hello { .. }) => {
                tracing::debug!("[SERVER] Ignoring repeated Hello from {player}");
                continue;
            }
        };
        host.send(event).await.context("host stopped")?;
    }
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut events: broadcast::Receiver<MatchEvent>,
    mut direct: mpsc::UnboundedReceiver<ServerMessage>,
    host: mpsc::Sender<HostEvent>,
    player: PlayerId,
) -> Result<(), FrameError> {
    loop {
        let msg = tokio::select! {
            event = events.recv() => match event {
                Ok(event) => ServerMessage::Event(event),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("[SERVER] {player} missed {missed} events, sending snapshot");
                    if host.send(HostEvent::Snapshot { player }).await.is_err() {
                        break;
                    }
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
            msg = direct.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };
        write_frame(&mut writer, &msg).await?;
    }
    Ok(())
}
