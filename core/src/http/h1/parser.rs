/*
 * parser.rs
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

//! HTTP/1.1 response push parser: header block, then a chunked, length-delimited or
//! close-delimited body.

use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::h1::chunked::ChunkedDecoder;
use crate::http::response::{HttpResponse, ResponseHead};

/// Largest header block accepted.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

const NOT_HTTP: &str = "response is not a valid HTTP response";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Waiting for the header terminator.
    Head,
    /// Head parsed; caller must check the status and call `set_body_mode()`.
    HeadersComplete,
    /// Length-delimited body.
    Body,
    Chunked,
    /// Body ends when the stream ends.
    UntilClose,
    Done,
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Offset and length of the header terminator.
///
/// The first `\r\n\r\n` ends the head. A `\n\n` ends it instead only when no `\r\n` precedes it
/// (a bare-LF head), or, once `complete` input holds no `\r\n\r\n` at all, as the fallback.
pub fn find_head_end(buf: &[u8], complete: bool) -> Option<(usize, usize)> {
    let lf = find(buf, b"\n\n");
    if let Some(l) = lf {
        if find(&buf[..l], b"\r\n").is_none() {
            return Some((l, 2));
        }
    }
    if let Some(c) = find(buf, b"\r\n\r\n") {
        return Some((c, 4));
    }
    match lf {
        Some(l) if complete => Some((l, 2)),
        _ => None,
    }
}

fn trim(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\t' || c == '\r')
}

/// `HTTP/x.y SP 3DIGIT [SP reason]`
fn parse_status_line(line: &str, head: &mut ResponseHead) -> Result<()> {
    let malformed = || Error::Protocol(format!("malformed status line: {}", line));
    let code_start = line.find(' ').ok_or_else(malformed)? + 1;
    let code = line.get(code_start..code_start + 3).ok_or_else(malformed)?;
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    head.status_code = code.parse().map_err(|_| malformed())?;
    head.status_reason = trim(&line[code_start + 3..]).to_string();
    Ok(())
}

/// Parse a header block (without its terminator). Header names match case-sensitively;
/// unknown headers are ignored.
pub fn parse_head(block: &[u8]) -> Result<ResponseHead> {
    let text = String::from_utf8_lossy(block);
    let mut head = ResponseHead::default();
    let mut have_status = false;
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.starts_with("HTTP/") {
            if !have_status {
                parse_status_line(line, &mut head)?;
                have_status = true;
            }
        } else if let Some(value) = line.strip_prefix("Content-Type:") {
            let value = value.split(';').next().unwrap_or(value);
            head.content_type = trim(value).to_string();
        } else if let Some(value) = line.strip_prefix("Content-Length:") {
            let value = trim(value);
            let len = value
                .parse::<u64>()
                .map_err(|_| Error::Protocol(format!("invalid Content-Length: {}", value)))?;
            head.content_length = Some(len);
        } else if let Some(value) = line.strip_prefix("Transfer-Encoding:") {
            head.transfer_coding = Some(trim(value).to_string());
        }
    }
    if !have_status {
        return Err(Error::Protocol(NOT_HTTP.to_string()));
    }
    Ok(head)
}

/// Push parser for one HTTP/1.1 response. Feed bytes via `receive`; call `finish` at end of stream
/// or once `Done` is reached.
#[derive(Debug)]
pub struct ResponseParser {
    state: ParseState,
    head: Option<ResponseHead>,
    /// Bytes still expected for a length-delimited body.
    remaining: u64,
    chunked: ChunkedDecoder,
    body: BytesMut,
    input_complete: bool,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::Head,
            head: None,
            remaining: 0,
            chunked: ChunkedDecoder::new(),
            body: BytesMut::new(),
            input_complete: false,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn head(&self) -> Option<&ResponseHead> {
        self.head.as_ref()
    }

    /// No more input will arrive; the head may now end at a `\n\n` that follows `\r\n` lines.
    pub fn end_of_input(&mut self) {
        self.input_complete = true;
    }

    /// Consume as much of `buf` as possible and return the resulting state.
    /// Stops at `HeadersComplete` until `set_body_mode` is called. Partial input stays in `buf`.
    pub fn receive(&mut self, buf: &mut BytesMut) -> Result<ParseState> {
        loop {
            match self.state {
                ParseState::Head => {
                    let (offset, len) = match find_head_end(buf, self.input_complete) {
                        Some(found) => found,
                        None if buf.len() > MAX_HEAD_SIZE => {
                            return Err(Error::Protocol("response header block too large".to_string()));
                        }
                        None => return Ok(self.state),
                    };
                    if offset > MAX_HEAD_SIZE {
                        return Err(Error::Protocol("response header block too large".to_string()));
                    }
                    let block = buf.split_to(offset + len);
                    self.head = Some(parse_head(&block[..offset])?);
                    self.state = ParseState::HeadersComplete;
                    return Ok(self.state);
                }
                ParseState::HeadersComplete => return Ok(self.state),
                ParseState::Body => {
                    let take = self.remaining.min(buf.len() as u64) as usize;
                    self.body.extend_from_slice(&buf[..take]);
                    buf.advance(take);
                    self.remaining -= take as u64;
                    if self.remaining > 0 {
                        return Ok(self.state);
                    }
                    self.state = ParseState::Done;
                }
                ParseState::Chunked => {
                    if !self.chunked.decode(buf, &mut self.body)? {
                        return Ok(self.state);
                    }
                    self.state = ParseState::Done;
                }
                ParseState::UntilClose => {
                    self.body.extend_from_slice(buf);
                    buf.clear();
                    return Ok(self.state);
                }
                ParseState::Done => return Ok(self.state),
            }
        }
    }

    /// Choose body framing from the parsed head: chunked, then Content-Length > 0, else until close.
    pub fn set_body_mode(&mut self) {
        if self.state != ParseState::HeadersComplete {
            return;
        }
        let head = match &self.head {
            Some(head) => head,
            None => return,
        };
        self.state = if head.is_chunked() {
            ParseState::Chunked
        } else {
            match head.content_length {
                Some(len) if len > 0 => {
                    self.remaining = len;
                    ParseState::Body
                }
                _ => ParseState::UntilClose,
            }
        };
        debug!(mode = ?self.state, "response body framing");
    }

    /// Complete the response. Valid once `Done`, or at end of stream for a close-delimited body.
    pub fn finish(mut self) -> Result<HttpResponse> {
        self.set_body_mode();
        match self.state {
            ParseState::Head | ParseState::HeadersComplete => {
                Err(Error::Protocol(NOT_HTTP.to_string()))
            }
            ParseState::Body | ParseState::Chunked => {
                Err(Error::Protocol("response body truncated".to_string()))
            }
            ParseState::UntilClose | ParseState::Done => {
                let head = self.head.ok_or_else(|| Error::Protocol(NOT_HTTP.to_string()))?;
                Ok(HttpResponse::from_head(head, self.body.freeze()))
            }
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a fully buffered response: split head and body, apply the status policy, decode the body.
pub fn parse_response(raw: &[u8]) -> Result<HttpResponse> {
    let mut buf = BytesMut::from(raw);
    let mut parser = ResponseParser::new();
    parser.end_of_input();
    if parser.receive(&mut buf)? == ParseState::Head {
        return Err(Error::Protocol(NOT_HTTP.to_string()));
    }
    if let Some(head) = parser.head() {
        head.check_status()?;
    }
    parser.set_body_mode();
    parser.receive(&mut buf)?;
    parser.finish()
}
