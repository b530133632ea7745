//! Match host pipeline tests
//!
//! Runs the real TCP server on an ephemeral port and drives it with raw
//! framed clients, each keeping a replica board built only from the events
//! it receives.

use std::net::SocketAddr;
use std::time::Duration;

use backend::config::HostConfig;
use backend::host::MatchHost;
use backend::layout::seats;
use backend::server;
use backend::stats::StatsSink;
use board_engine::{
    hex_board, BoardReplica, CellId, EngineError, MatchEvent, PlayerId, RulesConfig,
    TopologyConfig, WinReason,
};
use shared::{read_frame, write_frame, ClientMessage, ServerMessage, PROTOCOL_VERSION};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

const WAIT: Duration = Duration::from_secs(5);

/// Start a server on 127.0.0.1 with a radius-2 hex board
async fn start_server(config: HostConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let host = MatchHost::new(config, hex_board(2, seats()), StatsSink::from_url(None));
    tokio::spawn(server::serve(listener, host));
    addr
}

struct TestClient {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    player: PlayerId,
    replica: BoardReplica,
}

/// Connect and say hello, returning the halves and the host's first answer
async fn hello(
    addr: SocketAddr,
    name: &str,
    version: u32,
) -> (OwnedReadHalf, OwnedWriteHalf, ServerMessage) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut reader, mut writer) = stream.into_split();
    write_frame(
        &mut writer,
        &ClientMessage::Hello {
            protocol_version: version,
            player_name: name.to_string(),
        },
    )
    .await
    .unwrap();
    let reply = recv(&mut reader).await;
    (reader, writer, reply)
}

async fn recv(reader: &mut OwnedReadHalf) -> ServerMessage {
    tokio::time::timeout(WAIT, read_frame(reader))
        .await
        .expect("Timed out waiting for the host")
        .expect("Frame should decode")
        .expect("Connection should stay open")
}

impl TestClient {
    async fn join(addr: SocketAddr, name: &str) -> Self {
        let (reader, writer, reply) = hello(addr, name, PROTOCOL_VERSION).await;
        let ServerMessage::Welcome { player, .. } = reply else {
            panic!("Expected Welcome, got {reply:?}");
        };
        Self {
            reader,
            writer,
            player,
            replica: BoardReplica::new(TopologyConfig::default()),
        }
    }

    async fn send(&mut self, msg: ClientMessage) {
        write_frame(&mut self.writer, &msg).await.unwrap();
    }

    /// Next message, applying events to the replica on the way
    async fn next(&mut self) -> ServerMessage {
        let msg = recv(&mut self.reader).await;
        if let ServerMessage::Event(event) = &msg {
            self.replica.apply(event).expect("Event should apply");
        }
        msg
    }

    /// Read until an event matching `pred` arrives
    async fn until(&mut self, pred: impl Fn(&MatchEvent) -> bool) -> MatchEvent {
        loop {
            match self.next().await {
                ServerMessage::Event(event) if pred(&event) => return event,
                ServerMessage::Event(_) => {}
                other => panic!("Unexpected message {other:?}"),
            }
        }
    }

    /// Some legal move for this client according to its replica
    fn any_move(&self) -> (CellId, CellId) {
        let board = self.replica.board().expect("Match should have started");
        board
            .cells()
            .filter(|(_, s)| s.is_movable_by(self.player))
            .find_map(|(from, _)| {
                self.replica
                    .legal_destinations(from)
                    .into_iter()
                    .next()
                    .map(|to| (from, to))
            })
            .expect("Opening position always has a move")
    }
}

/// Send Hello and reset the connection without reading the reply
#[allow(deprecated)]
async fn hello_then_reset(addr: SocketAddr, name: &str) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    write_frame(
        &mut stream,
        &ClientMessage::Hello {
            protocol_version: PROTOCOL_VERSION,
            player_name: name.to_string(),
        },
    )
    .await
    .unwrap();
    // Zero linger turns the close into a reset
    stream.set_linger(Some(Duration::ZERO)).unwrap();
    drop(stream);
}

fn is_started(event: &MatchEvent) -> bool {
    matches!(event, MatchEvent::MatchStarted { .. })
}

#[tokio::test]
async fn test_move_replicates_to_both_participants() {
    //! A move by the first seat reaches both replicas before the turn
    //! change, and both replicas match the authority's snapshot
    let addr = start_server(HostConfig::default()).await;
    let mut ada = TestClient::join(addr, "ada").await;
    let mut bob = TestClient::join(addr, "bob").await;
    assert_eq!(ada.player, PlayerId(1));
    assert_eq!(bob.player, PlayerId(2));

    ada.until(is_started).await;
    bob.until(is_started).await;

    let (from, to) = ada.any_move();
    ada.send(ClientMessage::MoveRequest { from, to }).await;

    for client in [&mut ada, &mut bob] {
        let event = client
            .until(|e| matches!(e, MatchEvent::TurnChanged { .. }))
            .await;
        assert!(matches!(
            event,
            MatchEvent::TurnChanged {
                player: PlayerId(2),
                ..
            }
        ));
    }

    bob.send(ClientMessage::RequestSnapshot).await;
    let ServerMessage::Snapshot(snapshot) = bob.next().await else {
        panic!("Expected a snapshot");
    };
    assert_eq!(snapshot.board, ada.replica.board_snapshot());
    assert_eq!(snapshot.board, bob.replica.board_snapshot());
    assert_eq!(snapshot.current_player, Some(PlayerId(2)));
}

#[tokio::test]
async fn test_out_of_turn_move_is_rejected_privately() {
    let addr = start_server(HostConfig::default()).await;
    let mut ada = TestClient::join(addr, "ada").await;
    let mut bob = TestClient::join(addr, "bob").await;
    ada.until(is_started).await;
    bob.until(is_started).await;

    let (from, to) = bob.any_move();
    bob.send(ClientMessage::MoveRequest { from, to }).await;

    match bob.next().await {
        ServerMessage::MoveRejected { error, .. } => assert_eq!(
            error,
            EngineError::NotYourTurn {
                requester: PlayerId(2),
                current: PlayerId(1)
            }
        ),
        other => panic!("Expected MoveRejected, got {other:?}"),
    }

    // Ada's next message is her own snapshot, so nothing was broadcast
    ada.send(ClientMessage::RequestSnapshot).await;
    assert!(matches!(ada.next().await, ServerMessage::Snapshot(_)));
}

#[tokio::test]
async fn test_goodbye_awards_the_match_to_the_other_player() {
    let addr = start_server(HostConfig::default()).await;
    let mut ada = TestClient::join(addr, "ada").await;
    let mut bob = TestClient::join(addr, "bob").await;
    ada.until(is_started).await;

    bob.send(ClientMessage::Goodbye).await;

    let event = ada
        .until(|e| matches!(e, MatchEvent::MatchOver { .. }))
        .await;
    assert_eq!(
        event,
        MatchEvent::MatchOver {
            winner: PlayerId(1),
            reason: WinReason::Disconnect
        }
    );
}

#[tokio::test]
async fn test_turn_times_out_over_the_network() {
    let config = HostConfig {
        rules: RulesConfig::default().with_turn_limit(Duration::from_millis(200)),
        tick: Duration::from_millis(50),
    };
    let addr = start_server(config).await;
    let mut ada = TestClient::join(addr, "ada").await;
    let mut bob = TestClient::join(addr, "bob").await;
    bob.until(is_started).await;
    let before = bob.replica.board_snapshot();

    let event = bob
        .until(|e| matches!(e, MatchEvent::TurnChanged { .. }))
        .await;

    assert!(matches!(
        event,
        MatchEvent::TurnChanged {
            player: PlayerId(2),
            ..
        }
    ));
    assert_eq!(bob.replica.board_snapshot(), before, "Timeout leaves the board alone");
    ada.until(is_started).await;
}

#[tokio::test]
async fn test_third_participant_and_bad_versions_are_refused() {
    let addr = start_server(HostConfig::default()).await;
    let _ada = TestClient::join(addr, "ada").await;

    let (_, _, reply) = hello(addr, "old", PROTOCOL_VERSION + 1).await;
    assert!(matches!(reply, ServerMessage::Rejected { .. }), "{reply:?}");

    let _bob = TestClient::join(addr, "bob").await;
    let (_, _, reply) = hello(addr, "eve", PROTOCOL_VERSION).await;
    match reply {
        ServerMessage::Rejected { reason } => assert_eq!(reason, "match already in progress"),
        other => panic!("Expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reset_after_hello_frees_the_seat() {
    //! A participant that vanishes right after Hello is seated and then
    //! reported as left, so it cannot hold a seat against real players
    let addr = start_server(HostConfig::default()).await;
    for attempt in 0..3 {
        hello_then_reset(addr, &format!("ghost{attempt}")).await;
    }
    tokio::time::sleep(Duration::from_millis(500)).await;

    let mut ada = TestClient::join(addr, "ada").await;
    let mut bob = TestClient::join(addr, "bob").await;
    assert_eq!(ada.player, PlayerId(1), "Vanished connections left no seat behind");
    assert_eq!(bob.player, PlayerId(2));
    ada.until(is_started).await;
    bob.until(is_started).await;
}
