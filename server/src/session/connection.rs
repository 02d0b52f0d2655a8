//! Individual client session handling

use crate::command::CommandDispatcher;
use devctl_shared::codec::{self, CodecError, LineDecoder};
use devctl_shared::Response;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// One client connection and its line framing state
///
/// Commands are handled strictly one at a time in arrival order.
pub struct ClientSession<S> {
    id: u64,
    peer: String,
    stream: S,
    decoder: LineDecoder,
    read_buf: Vec<u8>,
}

impl<S> ClientSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a new client session over an accepted stream
    pub fn new(id: u64, peer: impl Into<String>, stream: S, max_line_len: usize) -> Self {
        Self {
            id,
            peer: peer.into(),
            stream,
            decoder: LineDecoder::with_max_line_len(max_line_len),
            read_buf: vec![0u8; 4096],
        }
    }

    /// Read the next line from this session
    ///
    /// Returns `Ok(None)` when the peer closes the connection.
    pub async fn recv(&mut self) -> Result<Option<String>, CodecError> {
        loop {
            // First try to decode from existing buffer
            if let Some(line) = self.decoder.decode_next()? {
                return Ok(Some(line));
            }

            // Read more data
            match self.stream.read(&mut self.read_buf).await? {
                0 => return Ok(None),
                n => self.decoder.extend(&self.read_buf[..n]),
            }
        }
    }

    /// Write one response to the client
    pub async fn send(&mut self, response: &Response) -> io::Result<()> {
        let encoded = codec::encode(response);
        self.stream.write_all(&encoded).await?;
        self.stream.flush().await
    }

    /// Serve commands until the peer disconnects or the connection fails
    pub async fn run(mut self, dispatcher: CommandDispatcher) {
        info!(session = self.id, peer = %self.peer, "Accepted connection");

        loop {
            let line = match self.recv().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!(session = self.id, "Client disconnected");
                    break;
                }
                Err(e) => {
                    warn!(session = self.id, peer = %self.peer, error = %e, "Closing connection");
                    break;
                }
            };

            // Blank lines are not commands and get no response
            if line.is_empty() {
                continue;
            }

            let response = dispatcher.dispatch_line(&line).await;
            if let Err(e) = self.send(&response).await {
                warn!(session = self.id, peer = %self.peer, error = %e, "Write failed");
                break;
            }
        }

        let _ = self.stream.shutdown().await;
        info!(session = self.id, peer = %self.peer, "Closed connection");
    }
}
