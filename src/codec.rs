//! NETCONF message framing (RFC 6242)
//!
//! Inbound bytes are split on whichever terminator appears first: the legacy
//! end-of-message marker `]]>]]>` or the end-of-chunks marker `\n##\n`. Chunk
//! headers (`\n#<len>\n`) inside a chunked message are removed before the
//! message is handed on. Outbound replies are always chunk-framed; only the
//! server `hello` goes out with the end-of-message marker, since framing is
//! not negotiated until both hellos have been exchanged.
//!
//! ```rust
//! use bytes::BytesMut;
//! use netconf_bridge::codec::FrameCodec;
//! use tokio_util::codec::Decoder;
//!
//! let mut codec = FrameCodec::new();
//! let mut buf = BytesMut::from("<hello/>]]>]]>\n#5\n<rpc/");
//! assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("<hello/>"));
//! assert_eq!(codec.decode(&mut buf).unwrap(), None);
//! ```

use bytes::{Buf, BufMut, BytesMut};
use std::fmt::Write;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

use crate::{NetconfError, Result};

/// Legacy NETCONF 1.0 message terminator.
pub const END_OF_MESSAGE: &str = "]]>]]>";

/// Terminator closing a chunk-framed message.
pub const END_OF_CHUNKS: &str = "\n##\n";

/// Bytes of an already scanned buffer that are scanned again, so a terminator
/// split across reads is still found.
const TERMINATOR_OVERLAP: usize = END_OF_MESSAGE.len() - 1;

/// Upper bound on buffered bytes without a terminator.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// Framing applied to an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Payload followed by `]]>]]>`
    EndOfMessage,
    /// Single chunk: `\n#<len>\n<payload>\n##\n`
    Chunked,
}

/// A serialized message waiting to be framed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub payload: String,
    pub framing: Framing,
}

impl OutboundMessage {
    /// Message written with chunked framing.
    pub fn chunked(payload: impl Into<String>) -> Self {
        Self { payload: payload.into(), framing: Framing::Chunked }
    }

    /// Message written with the legacy end-of-message marker.
    pub fn end_of_message(payload: impl Into<String>) -> Self {
        Self { payload: payload.into(), framing: Framing::EndOfMessage }
    }
}

/// Decoder/encoder pair for a NETCONF session stream.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_length: usize,
    // Buffered bytes already searched for a terminator
    next_index: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec {
    /// Create a codec with the default frame length limit.
    pub fn new() -> Self {
        Self { max_frame_length: DEFAULT_MAX_FRAME_LENGTH, next_index: 0 }
    }

    /// Create a codec that rejects messages longer than `max_frame_length` bytes.
    pub fn with_max_frame_length(max_frame_length: usize) -> Self {
        Self { max_frame_length, next_index: 0 }
    }

    fn take_token(&mut self, src: &mut BytesMut, at: usize, delimiter_len: usize) -> String {
        self.next_index = 0;
        let token = src.split_to(at);
        src.advance(delimiter_len);
        decode_token(&token)
    }
}

impl Decoder for FrameCodec {
    type Item = String;
    type Error = NetconfError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        if is_blank(src) {
            return Ok(None);
        }

        let from = self.next_index.saturating_sub(TERMINATOR_OVERLAP);
        let end_of_message = find(&src[from..], END_OF_MESSAGE.as_bytes()).map(|at| from + at);
        let end_of_chunks = find(&src[from..], END_OF_CHUNKS.as_bytes()).map(|at| from + at);

        let split = match (end_of_message, end_of_chunks) {
            (Some(eom), Some(eoc)) if eoc < eom => Some((eoc, END_OF_CHUNKS.len())),
            (Some(eom), _) => Some((eom, END_OF_MESSAGE.len())),
            (None, Some(eoc)) => Some((eoc, END_OF_CHUNKS.len())),
            (None, None) => None,
        };

        match split {
            Some((at, delimiter_len)) => {
                trace!(bytes = at, "Frame delimiter found");
                Ok(Some(self.take_token(src, at, delimiter_len)))
            }
            None if src.len() > self.max_frame_length => Err(NetconfError::Framing {
                details: format!(
                    "{} bytes buffered without a message terminator (limit {})",
                    src.len(),
                    self.max_frame_length
                ),
            }),
            None => {
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        if is_blank(src) {
            src.clear();
            self.next_index = 0;
            return Ok(None);
        }

        // Unterminated residue at end of stream still counts as a message
        let len = src.len();
        Ok(Some(self.take_token(src, len, 0)))
    }
}

impl Encoder<OutboundMessage> for FrameCodec {
    type Error = NetconfError;

    fn encode(&mut self, item: OutboundMessage, dst: &mut BytesMut) -> Result<()> {
        let payload = item.payload.as_bytes();
        match item.framing {
            Framing::EndOfMessage => {
                dst.reserve(payload.len() + END_OF_MESSAGE.len());
                dst.put_slice(payload);
                dst.put_slice(END_OF_MESSAGE.as_bytes());
            }
            Framing::Chunked => {
                dst.reserve(payload.len() + END_OF_CHUNKS.len() + 16);
                write!(dst, "\n#{}\n", payload.len())
                    .map_err(|e| NetconfError::Framing { details: e.to_string() })?;
                dst.put_slice(payload);
                dst.put_slice(END_OF_CHUNKS.as_bytes());
            }
        }
        Ok(())
    }
}

/// Render a payload as one chunk-framed message.
pub fn chunked_frame(payload: &str) -> String {
    format!("\n#{}\n{}{}", payload.len(), payload, END_OF_CHUNKS)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| matches!(b, b' ' | b'\n' | b'\r' | b'\t'))
}

/// Turn the bytes before a terminator into message text.
///
/// Leading whitespace is dropped. A token whose first remaining byte is `#` is
/// treated as a run of chunks; anything that does not parse as chunks is
/// passed through unchanged.
fn decode_token(token: &[u8]) -> String {
    let start = token.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(token.len());
    if token.get(start) == Some(&b'#') {
        match decode_chunks(&token[start..]) {
            Some(body) => return String::from_utf8_lossy(&body).into_owned(),
            None => warn!("Chunk headers did not parse, passing message through verbatim"),
        }
    }
    String::from_utf8_lossy(&token[start..]).into_owned()
}

fn decode_chunks(mut rest: &[u8]) -> Option<Vec<u8>> {
    let mut body = Vec::with_capacity(rest.len());
    loop {
        rest = rest.strip_prefix(b"\n").unwrap_or(rest);
        if rest.is_empty() {
            return Some(body);
        }

        rest = rest.strip_prefix(b"#")?;
        let newline = rest.iter().position(|&b| b == b'\n')?;
        let size: usize = std::str::from_utf8(&rest[..newline]).ok()?.parse().ok()?;
        if size == 0 {
            return None;
        }
        rest = &rest[newline + 1..];

        if rest.len() < size {
            return None;
        }
        body.extend_from_slice(&rest[..size]);
        rest = &rest[size..];
    }
}
