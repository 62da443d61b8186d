/*
 * chunked.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Feedfetch, a command-line feed reader.
 *
 * Feedfetch is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Feedfetch is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Feedfetch.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Incremental decoder for the chunked transfer-coding.
//!
//! Each chunk is `size-token [ext] LF data LF`, where LF may be CRLF or a bare LF. The size token
//! is hexadecimal and ends at the first SP, HTAB, `;` or line terminator. A zero-size chunk ends
//! the body; trailer fields after it are ignored.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Longest size line accepted before its terminator is found.
const MAX_SIZE_LINE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    Size,
    Data,
    DataEnd,
    Done,
}

/// Push decoder: feed bytes via `decode`; decoded data is appended to the output buffer.
#[derive(Debug)]
pub struct ChunkedDecoder {
    state: ChunkState,
    remaining: u64,
}

fn parse_chunk_size(line: &[u8]) -> Result<u64> {
    let end = line
        .iter()
        .position(|b| matches!(b, b' ' | b'\t' | b';' | b'\r'))
        .unwrap_or(line.len());
    let token = &line[..end];
    if token.is_empty() || !token.iter().all(u8::is_ascii_hexdigit) {
        return Err(Error::Protocol(format!(
            "invalid chunk size {:?}",
            String::from_utf8_lossy(token)
        )));
    }
    // Hex digits only; overflow is the remaining failure.
    let token = std::str::from_utf8(token).unwrap_or_default();
    u64::from_str_radix(token, 16)
        .map_err(|_| Error::Protocol(format!("chunk size {} is too large", token)))
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self {
            state: ChunkState::Size,
            remaining: 0,
        }
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ChunkState::Done
    }

    /// Consume as much of `buf` as possible, appending chunk data to `out`.
    /// Returns true once the last chunk has been seen. Partial input stays in `buf`.
    pub fn decode(&mut self, buf: &mut BytesMut, out: &mut BytesMut) -> Result<bool> {
        loop {
            match self.state {
                ChunkState::Size => {
                    let lf = match buf.iter().position(|&b| b == b'\n') {
                        Some(n) => n,
                        None if buf.len() > MAX_SIZE_LINE => {
                            return Err(Error::Protocol("chunk size line too long".to_string()));
                        }
                        None => return Ok(false),
                    };
                    let size = parse_chunk_size(&buf[..lf])?;
                    buf.advance(lf + 1);
                    if size == 0 {
                        self.state = ChunkState::Done;
                    } else {
                        self.remaining = size;
                        self.state = ChunkState::Data;
                    }
                }
                ChunkState::Data => {
                    let take = self.remaining.min(buf.len() as u64) as usize;
                    out.extend_from_slice(&buf[..take]);
                    buf.advance(take);
                    self.remaining -= take as u64;
                    if self.remaining > 0 {
                        return Ok(false);
                    }
                    self.state = ChunkState::DataEnd;
                }
                ChunkState::DataEnd => {
                    if buf.starts_with(b"\r\n") {
                        buf.advance(2);
                    } else if buf.starts_with(b"\n") {
                        buf.advance(1);
                    } else if buf.is_empty() || &buf[..] == b"\r" {
                        return Ok(false);
                    } else {
                        return Err(Error::Protocol("missing chunk terminator".to_string()));
                    }
                    self.state = ChunkState::Size;
                }
                ChunkState::Done => return Ok(true),
            }
        }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a complete chunked body.
pub fn decode_chunked(raw: &[u8]) -> Result<Bytes> {
    let mut buf = BytesMut::from(raw);
    let mut out = BytesMut::with_capacity(raw.len());
    if ChunkedDecoder::new().decode(&mut buf, &mut out)? {
        Ok(out.freeze())
    } else {
        Err(Error::Protocol("chunked body truncated".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn wikipedia_example() {
        let body = decode_chunked(b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n").unwrap();
        assert_eq!(&body[..], b"Wikipedia");
    }

    #[test]
    fn extensions_and_hex_case() {
        let body = decode_chunked(b"4;name=value\r\nWiki\r\nA \t ext\r\n0123456789\r\n0\r\n\r\n").unwrap();
        assert_eq!(&body[..], b"Wiki0123456789");
        let body = decode_chunked(b"a\r\nabcdefghij\r\n0\r\n\r\n").unwrap();
        assert_eq!(body.len(), 10);
    }

    #[test]
    fn bare_lf_terminators() {
        let body = decode_chunked(b"4\nWiki\n5\npedia\n0\n\n").unwrap();
        assert_eq!(&body[..], b"Wikipedia");
    }

    #[test]
    fn data_may_contain_line_breaks() {
        let body = decode_chunked(b"6\r\na\r\nb\r\n\r\n0\r\n\r\n").unwrap();
        assert_eq!(&body[..], b"a\r\nb\r\n");
    }

    #[test]
    fn trailers_are_ignored() {
        let body = decode_chunked(b"3\r\nabc\r\n0\r\nExpires: never\r\n\r\n").unwrap();
        assert_eq!(&body[..], b"abc");
    }

    #[test]
    fn byte_at_a_time() {
        let raw = b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
        let mut decoder = ChunkedDecoder::new();
        let mut buf = BytesMut::new();
        let mut out = BytesMut::new();
        let mut done_at = None;
        for (i, b) in raw.iter().enumerate() {
            buf.extend_from_slice(&[*b]);
            if decoder.decode(&mut buf, &mut out).unwrap() {
                done_at = Some(i);
                break;
            }
        }
        assert_eq!(&out[..], b"Wikipedia");
        // Done as soon as the zero-size line is complete.
        assert_eq!(done_at, Some(raw.len() - 3));
        assert!(decoder.is_done());
    }

    #[test]
    fn split_between_cr_and_lf() {
        let mut decoder = ChunkedDecoder::new();
        let mut out = BytesMut::new();
        let mut buf = BytesMut::from(&b"3\r\nabc\r"[..]);
        assert!(!decoder.decode(&mut buf, &mut out).unwrap());
        assert_eq!(decoder.state(), ChunkState::DataEnd);
        buf.extend_from_slice(b"\n0\r\n");
        assert!(decoder.decode(&mut buf, &mut out).unwrap());
        assert_eq!(&out[..], b"abc");
    }

    #[test]
    fn malformed_input_is_a_protocol_error() {
        for raw in [
            &b"zz\r\nabc\r\n0\r\n\r\n"[..],
            &b"\r\nabc\r\n0\r\n\r\n"[..],
            &b"3\r\nabcX\r\n0\r\n\r\n"[..],
            &b"ffffffffffffffffff\r\n"[..],
        ] {
            let err = decode_chunked(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Protocol);
        }
    }

    #[test]
    fn truncated_body() {
        let err = decode_chunked(b"5\r\npedi").unwrap_err();
        assert_eq!(err.message(), "chunked body truncated");
    }
}
