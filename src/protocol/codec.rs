//! Line framing for the wire protocol. Built like tokio-util's `LinesCodec`,
//! but lossy on invalid UTF-8, and a line over the length limit is skipped
//! instead of failing the stream.

use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

pub const LINE_TERMINATOR: &[u8] = b"\r\n";
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Decodes `\n`-terminated lines (dropping a trailing `\r`) and encodes
/// lines terminated with `\r\n`.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// bytes of the buffer already searched for `\n`
    next_index: usize,
    /// longest accepted line, not counting the `\n`
    max_length: usize,
    /// inside an oversized line, dropping bytes up to its `\n`
    is_discarding: bool,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            next_index: 0,
            max_length,
            is_discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        loop {
            let read_to = src.len().min(self.max_length.saturating_add(1));
            let newline = src[self.next_index..read_to]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.next_index + offset);

            match (self.is_discarding, newline) {
                (true, Some(newline)) => {
                    src.advance(newline + 1);
                    self.is_discarding = false;
                    self.next_index = 0;
                }
                (true, None) => {
                    src.advance(read_to);
                    self.next_index = 0;
                    if src.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(newline)) => {
                    self.next_index = 0;

                    let mut line = src.split_to(newline + 1);
                    line.truncate(newline);
                    if line.last() == Some(&b'\r') {
                        line.truncate(newline - 1);
                    }

                    return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
                }
                (false, None) if src.len() > self.max_length => {
                    warn!("skipping line longer than {} bytes", self.max_length);
                    self.is_discarding = true;
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    /// An unterminated fragment left at disconnect is discarded
    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        let line = self.decode(src)?;
        if line.is_none() {
            src.clear();
            self.next_index = 0;
            self.is_discarding = false;
        }
        Ok(line)
    }
}

impl Encoder<String> for LineCodec {
    type Error = io::Error;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> io::Result<()> {
        dst.reserve(line.len() + LINE_TERMINATOR.len());
        dst.put_slice(line.as_bytes());
        dst.put_slice(LINE_TERMINATOR);
        Ok(())
    }
}
