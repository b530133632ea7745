//! Integration tests for the terminal participant
//!
//! The first group feeds a [`Session`] the events of a local authority.
//! The last test runs the real match host and seats two clients through
//! [`client::connect`].

use board_engine::{
    hex_board, CellId, EngineError, MatchAuthority, MatchEvent, MatchId, MatchPlayers,
    MatchSummary, PlayerId, RulesConfig,
};
use shared::ServerMessage;
use tessellaction::client::{self, Session};

type LocalAuthority = MatchAuthority<Vec<MatchEvent>, Vec<MatchSummary>>;

fn players() -> MatchPlayers {
    MatchPlayers::new(PlayerId(1), PlayerId(2))
}

fn started() -> LocalAuthority {
    let mut authority =
        MatchAuthority::new(players(), RulesConfig::default(), Vec::new(), Vec::new());
    authority
        .begin_match(&hex_board(2, players()))
        .expect("Hex board is a valid layout");
    authority
}

/// Deliver every event from `sent` onward, returning the printed lines
fn deliver(session: &mut Session, authority: &LocalAuthority, sent: &mut usize) -> Vec<String> {
    let events = &authority.channel()[*sent..];
    *sent = authority.channel().len();
    events
        .iter()
        .flat_map(|e| session.handle(ServerMessage::Event(e.clone())))
        .collect()
}

fn first_move(authority: &LocalAuthority, player: PlayerId) -> (CellId, CellId) {
    let board = authority.board().expect("Match started");
    board
        .cells()
        .filter(|(_, s)| s.is_movable_by(player))
        .find_map(|(from, _)| {
            authority
                .legal_destinations(from)
                .into_iter()
                .next()
                .map(|to| (from, to))
        })
        .expect("Opening position has a move")
}

#[test]
fn test_session_follows_authority() {
    //! Both sessions end up with the authority's board after a move and
    //! each announces whose turn it is from its own point of view
    let mut authority = started();
    let mut ada = Session::new(PlayerId(1), authority.match_id());
    let mut bob = Session::new(PlayerId(2), authority.match_id());
    let (mut ada_sent, mut bob_sent) = (0, 0);

    let lines = deliver(&mut ada, &authority, &mut ada_sent);
    assert!(lines.iter().any(|l| l.starts_with("your turn")), "{lines:?}");
    let lines = deliver(&mut bob, &authority, &mut bob_sent);
    assert!(lines.iter().any(|l| l.starts_with("waiting for")), "{lines:?}");

    let (from, to) = first_move(&authority, PlayerId(1));
    authority.request_move(PlayerId(1), from, to).unwrap();
    deliver(&mut ada, &authority, &mut ada_sent);
    let lines = deliver(&mut bob, &authority, &mut bob_sent);
    assert!(lines.iter().any(|l| l.starts_with("your turn")), "{lines:?}");

    let truth = authority.snapshot().board;
    assert_eq!(ada.replica().board_snapshot(), truth);
    assert_eq!(bob.replica().board_snapshot(), truth);
    assert_eq!(bob.replica().current_player(), Some(PlayerId(2)));
}

#[test]
fn test_render_marks_each_side() {
    let authority = started();
    let mut ada = Session::new(PlayerId(1), authority.match_id());
    deliver(&mut ada, &authority, &mut 0);

    let picture = ada.render();
    assert_eq!(picture.lines().count(), 5, "Radius-2 hex board has five rows");
    assert_eq!(picture.matches('*').count(), 7);
    assert_eq!(picture.matches('o').count(), 7);
    assert_eq!(picture.matches('.').count(), 5);
}

#[test]
fn test_hints_use_local_replica() {
    let authority = started();
    let mut ada = Session::new(PlayerId(1), authority.match_id());
    deliver(&mut ada, &authority, &mut 0);

    let (from, to) = first_move(&authority, PlayerId(1));
    let hint = ada.hints(from);
    assert!(hint.contains(&to.to_string()), "{hint}");
    assert!(ada.hints(CellId(999)).ends_with("cannot move"));
}

#[test]
fn test_rejection_is_reported() {
    let mut session = Session::new(PlayerId(2), MatchId::new());
    let lines = session.handle(ServerMessage::MoveRejected {
        from: CellId(1),
        to: CellId(2),
        error: EngineError::NotYourTurn {
            requester: PlayerId(2),
            current: PlayerId(1),
        },
    });
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("rejected"), "{lines:?}");
}

#[test]
fn test_out_of_order_event_asks_for_snapshot() {
    //! An event the replica cannot apply flags one resync, and the
    //! snapshot that follows restores the board
    let authority = started();
    let mut session = Session::new(PlayerId(1), authority.match_id());

    session.handle(ServerMessage::Event(MatchEvent::PieceChanged {
        cell: CellId(0),
        owner: board_engine::Owner::Unowned,
        interactable: false,
    }));
    assert!(session.take_resync());
    assert!(!session.take_resync(), "Flag clears once taken");

    let lines = session.handle(ServerMessage::Snapshot(authority.snapshot()));
    assert_eq!(lines[0], "board resynchronized");
    assert_eq!(session.replica().board_snapshot(), authority.snapshot().board);
}

#[test]
fn test_disconnect_verdict() {
    let mut authority = started();
    let mut ada = Session::new(PlayerId(1), authority.match_id());
    let mut sent = 0;
    deliver(&mut ada, &authority, &mut sent);

    authority.on_participant_left(PlayerId(2)).unwrap();
    let lines = deliver(&mut ada, &authority, &mut sent);
    assert_eq!(lines.last().map(String::as_str), Some("you win (a player left)"));
    assert!(ada.render().contains("winner: P"), "{}", ada.render());
}

#[tokio::test]
async fn test_connect_seats_both_clients() {
    use backend::config::HostConfig;
    use backend::host::MatchHost;
    use backend::layout::seats;
    use backend::stats::StatsSink;
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let host = MatchHost::new(
        HostConfig::default(),
        hex_board(2, seats()),
        StatsSink::from_url(None),
    );
    tokio::spawn(backend::server::serve(listener, host));

    let (_r1, _w1, ada) = client::connect(&addr, "ada").await.unwrap();
    let (_r2, _w2, bob) = client::connect(&addr, "bob").await.unwrap();
    assert_eq!(ada.player(), PlayerId(1));
    assert_eq!(bob.player(), PlayerId(2));
    assert_eq!(ada.match_id(), bob.match_id());

    let refused = client::connect(&addr, "eve").await;
    let message = format!("{:#}", refused.err().expect("Third client is refused"));
    assert!(message.contains("match already in progress"), "{message}");
}
