//! Length-delimited framing over async streams
//!
//! A frame is a 4-byte big-endian payload length followed by the bincode
//! encoding of one message. [`MAX_FRAME_SIZE`] caps the length so that a bad
//! prefix cannot make the reader allocate without bound. Snapshots of large
//! boards are the biggest messages and stay far below it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest accepted payload, in bytes
pub const MAX_FRAME_SIZE: u32 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("frame too large: {len} bytes (max {MAX_FRAME_SIZE})")]
    TooLarge { len: usize },

    #[error("connection closed mid-frame")]
    Truncated,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Encode `msg` and write it as one frame
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = bincode::serialize(msg)?;
    let len = payload.len();
    if len > MAX_FRAME_SIZE as usize {
        return Err(FrameError::TooLarge { len });
    }

    writer.write_u32(len as u32).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read and decode one frame
///
/// Returns `Ok(None)` when the peer closed the stream cleanly between
/// frames, [`FrameError::Truncated`] when it closed inside one.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, FrameError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        let n = reader.read(&mut len_buf[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                Err(FrameError::Truncated)
            };
        }
        filled += n;
    }

    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge { len: len as usize });
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            FrameError::Truncated
        } else {
            FrameError::Io(e)
        }
    })?;

    Ok(Some(bincode::deserialize(&payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ClientMessage;
    use board_engine::CellId;

    #[tokio::test]
    async fn test_frames_in_sequence() {
        let messages = vec![
            ClientMessage::MoveRequest {
                from: CellId(1),
                to: CellId(2),
            },
            ClientMessage::RequestSnapshot,
            ClientMessage::Goodbye,
        ];
        let mut buf = Vec::new();
        for msg in &messages {
            write_frame(&mut buf, msg).await.unwrap();
        }

        let mut reader = buf.as_slice();
        for expected in &messages {
            let got: Option<ClientMessage> = read_frame(&mut reader).await.unwrap();
            assert_eq!(got.as_ref(), Some(expected));
        }
        let end: Option<ClientMessage> = read_frame(&mut reader).await.unwrap();
        assert!(end.is_none(), "Clean EOF between frames");
    }

    #[tokio::test]
    async fn test_rejects_oversized_prefix() {
        let fake = (MAX_FRAME_SIZE + 1).to_be_bytes();
        let mut reader = &fake[..];
        let err = read_frame::<_, ClientMessage>(&mut reader).await.unwrap_err();
        assert!(matches!(err, FrameError::TooLarge { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_truncated_frames() {
        let mut short_prefix: &[u8] = &[0, 1];
        let err = read_frame::<_, ClientMessage>(&mut short_prefix)
            .await
            .unwrap_err();
        assert!(matches!(err, FrameError::Truncated));

        let mut buf = Vec::new();
        write_frame(&mut buf, &ClientMessage::Goodbye).await.unwrap();
        let mut cut: &[u8] = &buf[..buf.len() - 1];
        let err = read_frame::<_, ClientMessage>(&mut cut).await.unwrap_err();
        assert!(matches!(err, FrameError::Truncated));
    }
}
