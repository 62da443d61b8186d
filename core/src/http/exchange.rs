/*
 * exchange.rs
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

//! One request/response cycle: connect, send GET, read and frame the response, close.
//!
//! The status is checked as soon as the head is parsed, so a non-200 response is rejected
//! without reading its body. The connection is always closed before `fetch` returns.

use bytes::BytesMut;
use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::http::h1::{ParseState, ResponseParser};
use crate::http::request::serialize_get;
use crate::http::response::HttpResponse;
use crate::transport::Transport;

/// Fetch `endpoint` over `transport` and return the decoded response.
pub async fn fetch(transport: &mut Transport, endpoint: &Endpoint) -> Result<HttpResponse> {
    debug!(url = %endpoint, "fetch");
    let result = run(transport, endpoint).await;
    transport.close();
    if let Ok(response) = &result {
        debug!(url = %endpoint, "response complete\n{}", response);
    }
    result
}

async fn run(transport: &mut Transport, endpoint: &Endpoint) -> Result<HttpResponse> {
    if endpoint.is_https() {
        transport.prepare_tls()?;
    }
    transport.connect(endpoint).await?;
    transport.write(&serialize_get(endpoint)).await?;
    read_response(transport).await
}

async fn read_response(transport: &mut Transport) -> Result<HttpResponse> {
    let mut buf = BytesMut::with_capacity(8192);
    let mut parser = ResponseParser::new();
    let mut eof = false;
    loop {
        match parser.receive(&mut buf)? {
            ParseState::HeadersComplete => {
                if let Some(head) = parser.head() {
                    debug!(
                        status = head.status_code,
                        content_type = %head.content_type,
                        content_length = ?head.content_length,
                        transfer_coding = ?head.transfer_coding,
                        "response head"
                    );
                    head.check_status()?;
                }
                parser.set_body_mode();
                continue;
            }
            ParseState::UntilClose if !eof => {
                transport.read_to_end(&mut buf).await?;
                eof = true;
                parser.end_of_input();
                continue;
            }
            ParseState::Done => return parser.finish(),
            _ if eof => return parser.finish(),
            _ => {}
        }
        if transport.read_some(&mut buf).await? == 0 {
            eof = true;
            parser.end_of_input();
        }
    }
}
