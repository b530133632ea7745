//! Messages exchanged between the match host and participants
//!
//! Participants never touch match state. They say hello, submit move
//! requests and may ask for a snapshot; the host answers with events from the
//! authority, per-request rejections and snapshots.

use board_engine::{CellId, EngineError, MatchEvent, MatchId, MatchSnapshot, PlayerId};
use serde::{Deserialize, Serialize};

/// Bumped whenever a message layout changes
pub const PROTOCOL_VERSION: u32 = 1;

/// Participant → host
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ClientMessage {
    /// First message on every connection
    Hello {
        protocol_version: u32,
        player_name: String,
    },
    MoveRequest {
        from: CellId,
        to: CellId,
    },
    /// Ask for the full authoritative state, e.g. after missing events
    RequestSnapshot,
    /// Leave the match; counts as a disconnect
    Goodbye,
}

/// Host → participant
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ServerMessage {
    /// Seat assigned; `player` is this connection's id for the match
    Welcome { player: PlayerId, match_id: MatchId },
    /// Connection refused, the host closes it after sending this
    Rejected { reason: String },
    /// Replicated state change, in authority order
    Event(MatchEvent),
    /// Sent only to the requester
    MoveRejected {
        from: CellId,
        to: CellId,
        error: EngineError,
    },
    Snapshot(MatchSnapshot),
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_engine::{Owner, WinReason};

    #[test]
    fn test_client_hello_serialization() {
        let msg = ClientMessage::Hello {
            protocol_version: PROTOCOL_VERSION,
            player_name: "ada".to_string(),
        };
        let bytes = bincode::serialize(&msg).expect("Should serialize");
        let decoded: ClientMessage = bincode::deserialize(&bytes).expect("Should deserialize");

        match decoded {
            ClientMessage::Hello {
                protocol_version,
                player_name,
            } => {
                assert_eq!(protocol_version, PROTOCOL_VERSION);
                assert_eq!(player_name, "ada");
            }
            _ => panic!("Wrong message type after deserialization"),
        }
    }

    #[test]
    fn test_move_rejected_carries_engine_error() {
        let msg = ServerMessage::MoveRejected {
            from: CellId(1),
            to: CellId(5),
            error: EngineError::NotYourTurn {
                requester: PlayerId(2),
                current: PlayerId(1),
            },
        };
        let bytes = bincode::serialize(&msg).expect("Should serialize");
        let decoded: ServerMessage = bincode::deserialize(&bytes).expect("Should deserialize");
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_event_messages() {
        let events = [
            MatchEvent::PieceChanged {
                cell: CellId(3),
                owner: Owner::Player(PlayerId(1)),
                interactable: true,
            },
            MatchEvent::MatchOver {
                winner: PlayerId(2),
                reason: WinReason::Disconnect,
            },
        ];
        for event in events {
            let msg = ServerMessage::Event(event);
            let bytes = bincode::serialize(&msg).expect("Should serialize");
            let decoded: ServerMessage = bincode::deserialize(&bytes).expect("Should deserialize");
            assert_eq!(decoded, msg);
        }
    }
}
