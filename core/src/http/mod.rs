/*
 * mod.rs
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

//! HTTP/1.1 client over the feedfetch transport.
//!
//! - Request: a single GET with `Connection: close`, no body.
//! - Response: push parser over a `BytesMut`; chunked, Content-Length and close-delimited bodies.
//! - Status policy: only 200 is decoded; see `ResponseHead::check_status`.

mod request;
mod response;

pub mod client;
pub mod exchange;
pub mod h1;

pub use client::HttpClient;
pub use exchange::fetch;
pub use h1::{decode_chunked, parse_response, ChunkedDecoder, ParseState, ResponseParser};
pub use request::{serialize_get, RequestBuilder, USER_AGENT};
pub use response::{HttpResponse, ResponseHead};
