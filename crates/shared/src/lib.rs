//! Wire protocol shared by the match host and its participants
//!
//! - `protocol` - the messages each side may send
//! - `framing` - length-delimited bincode frames over any tokio stream

pub mod framing;
pub mod protocol;

pub use framing::{read_frame, write_frame, FrameError, MAX_FRAME_SIZE};
pub use protocol::{ClientMessage, ServerMessage, PROTOCOL_VERSION};
