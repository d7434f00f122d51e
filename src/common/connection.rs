//! # TCP Connection Abstraction
//!
//! Provides a wrapper around TCP streams with message framing for the relay
//! protocol.
//!
//! ## Wire Protocol
//!
//! Messages are sent with a 4-byte length prefix (big-endian) followed by
//! JSON data:
//! ```text
//! [4 bytes: message length] [N bytes: JSON message data]
//! ```
//!
//! The length prefix gives the decoder reliable message boundaries over a
//! continuous TCP stream, and handles variable-length messages (file
//! transfers can be large).

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::messages::Message;

/// Sanity cap on a single frame, well above any legal message, to avoid
/// allocating attacker-controlled amounts of memory.
const MAX_FRAME_SIZE: usize = 100 * 1024 * 1024;

/// TCP connection wrapper with message framing support.
///
/// Handles serialization, deserialization, and length-prefixed framing of
/// messages over a TCP stream. Owns the stream; dropping the `Connection`
/// closes the underlying socket.
pub struct Connection {
    stream: TcpStream,
}

impl Connection {
    /// Wrap an already-established TCP stream.
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Connect to a remote address and wrap the resulting stream.
    pub async fn connect(address: &str) -> Result<Self> {
        let stream = TcpStream::connect(address)
            .await
            .with_context(|| format!("failed to connect to {}", address))?;
        Ok(Self::new(stream))
    }

    /// Read the next message from the connection.
    ///
    /// # Returns
    /// - `Ok(Some(Message))`: a complete frame was read and decoded
    /// - `Ok(None)`: the peer closed the connection cleanly between messages
    /// - `Err`: the stream ended mid-frame, an I/O error occurred, the frame
    ///   exceeded the sanity cap, or the payload failed to decode
    ///
    /// A clean end-of-stream while waiting for a length prefix is a normal
    /// disconnect, not an error. Anything that breaks off in the middle of a
    /// frame is a decode failure and terminates the caller's read loop.
    pub async fn read_message(&mut self) -> Result<Option<Message>> {
        let mut length_buf = [0u8; 4];

        // EOF here means the peer hung up between messages.
        match self.stream.read_exact(&mut length_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e).context("failed to read message length"),
        }

        let length = u32::from_be_bytes(length_buf) as usize;
        if length > MAX_FRAME_SIZE {
            return Err(anyhow!(
                "message too large: {} bytes (max: {} bytes)",
                length,
                MAX_FRAME_SIZE
            ));
        }

        let mut data = vec![0u8; length];
        self.stream
            .read_exact(&mut data)
            .await
            .context("stream ended mid-message")?;

        let msg = Message::from_bytes(&data).context("failed to deserialize message")?;
        Ok(Some(msg))
    }

    /// Write a message to the connection.
    ///
    /// Serializes the message to JSON, writes the 4-byte length prefix and
    /// the payload, then flushes the stream to ensure delivery.
    pub async fn write_message(&mut self, message: &Message) -> Result<()> {
        let data = message.to_bytes()?;
        let length = data.len() as u32;

        self.stream.write_all(&length.to_be_bytes()).await?;
        self.stream.write_all(&data).await?;
        self.stream.flush().await?;

        Ok(())
    }
}
