//! Frames over an in-memory duplex pipe, the way the host and client use them

use board_engine::{hex_board, MatchPlayers, PlayerId, RulesConfig};
use board_engine::{MatchAuthority, MatchEvent, MatchSummary};
use shared::{read_frame, write_frame, ServerMessage};

#[tokio::test]
async fn test_snapshot_of_full_board_fits_in_one_frame() {
    //! A started match snapshot crosses the pipe intact
    let players = MatchPlayers::new(PlayerId(1), PlayerId(2));
    let mut authority: MatchAuthority<Vec<MatchEvent>, Vec<MatchSummary>> =
        MatchAuthority::new(players, RulesConfig::default(), Vec::new(), Vec::new());
    authority.begin_match(&hex_board(6, players)).unwrap();
    let snapshot = authority.snapshot();

    let (mut host, mut client) = tokio::io::duplex(64 * 1024);
    let sent = ServerMessage::Snapshot(snapshot.clone());
    let writer = tokio::spawn(async move {
        write_frame(&mut host, &sent).await.unwrap();
    });

    let received: Option<ServerMessage> = read_frame(&mut client).await.unwrap();
    writer.await.unwrap();

    assert_eq!(received, Some(ServerMessage::Snapshot(snapshot)));
}
