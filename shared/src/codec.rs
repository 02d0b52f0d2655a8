//! Newline-delimited codec for TCP framing
//!
//! Requests are framed as:
//! ```text
//! [ N bytes: command text ][ optional '\r' ]['\n']
//! ```
//!
//! Responses are one or more newline-terminated lines; see [`encode`].

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::defaults::MAX_LINE_LEN;
use crate::Response;

/// Errors that can occur while framing a connection
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Line too long: {len} bytes without newline (max: {max})")]
    LineTooLong { len: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode a response into its wire bytes
pub fn encode(response: &Response) -> Bytes {
    let mut buf = BytesMut::with_capacity(64);
    encode_into(response, &mut buf);
    buf.freeze()
}

/// Encode a response directly into a provided buffer
pub fn encode_into(response: &Response, buf: &mut BytesMut) {
    match response {
        Response::Mode(mode) => {
            buf.put_slice(b"OK MODE ");
            buf.put_slice(mode.as_str().as_bytes());
            buf.put_u8(b'\n');
        }
        Response::Output(output) => {
            buf.put_slice(b"OK OUTPUT ");
            buf.put_slice(output.as_str().as_bytes());
            buf.put_u8(b'\n');
        }
        Response::Records(records) => {
            buf.reserve(8 + records.iter().map(|r| r.len() + 1).sum::<usize>());
            buf.put_slice(b"OK\n");
            for record in records {
                buf.put_slice(record.as_bytes());
                // A torn final write must not swallow the END marker
                if !record.ends_with('\n') {
                    buf.put_u8(b'\n');
                }
            }
            buf.put_slice(b"END\n");
        }
        Response::InvalidState(message) => put_error(buf, "INVALID_STATE", message),
        Response::InvalidArgument(message) => put_error(buf, "INVALID_ARGUMENT", message),
        Response::UnknownCommand => buf.put_slice(b"ERR UNKNOWN_COMMAND\n"),
        Response::Io(message) => put_error(buf, "IO", message),
    }
}

fn put_error(buf: &mut BytesMut, code: &str, message: &str) {
    buf.put_slice(b"ERR ");
    buf.put_slice(code.as_bytes());
    buf.put_slice(b" \"");
    buf.put_slice(message.as_bytes());
    buf.put_slice(b"\"\n");
}

/// Trim trailing CR, LF, space and tab from a line
pub fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n', ' ', '\t'])
}

/// Decoder state machine for streaming line framing
#[derive(Debug)]
pub struct LineDecoder {
    /// Partial line data being accumulated
    buffer: BytesMut,
    /// Longest partial line tolerated before failing
    max_line_len: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    /// Create a new line decoder with the default line limit
    pub fn new() -> Self {
        Self::with_max_line_len(MAX_LINE_LEN)
    }

    /// Create a new line decoder that rejects lines of `max_line_len` bytes or more
    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(max_line_len),
            max_line_len,
        }
    }

    /// Add data to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next line from the buffer
    ///
    /// Returns:
    /// - `Ok(Some(line))` with trailing whitespace trimmed (may be empty)
    /// - `Ok(None)` if more data is needed
    /// - `Err(LineTooLong)` if the pending line exceeds the limit
    ///
    /// Call this repeatedly until it returns `Ok(None)` to drain all complete lines
    pub fn decode_next(&mut self) -> Result<Option<String>, CodecError> {
        match self.buffer.iter().position(|&b| b == b'\n') {
            Some(pos) if pos < self.max_line_len => {
                let raw = self.buffer.split_to(pos + 1);
                let text = String::from_utf8_lossy(&raw);
                Ok(Some(trim_line(&text).to_string()))
            }
            Some(pos) => Err(CodecError::LineTooLong {
                len: pos,
                max: self.max_line_len,
            }),
            None if self.buffer.len() >= self.max_line_len => Err(CodecError::LineTooLong {
                len: self.buffer.len(),
                max: self.max_line_len,
            }),
            None => Ok(None),
        }
    }

    /// Get the current buffer length (for debugging)
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}
