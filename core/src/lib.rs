/*
 * lib.rs
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

//! Feedfetch core: fetch one HTTP/HTTPS resource over a hand-rolled HTTP/1.1 client and
//! interpret it as an RSS, RDF or Atom feed.
//!
//! - [`endpoint`]: parsed, validated target URLs.
//! - [`transport`]: plain TCP or TLS byte stream with bounded readiness waits.
//! - [`http`]: request serialization, response framing, chunked decoding, status policy.
//! - [`feed`], [`feedlist`]: feed documents and feed list files.
//! - [`error`]: the error taxonomy shared by all of the above.

pub mod endpoint;
pub mod error;
pub mod feed;
pub mod feedlist;
pub mod http;
pub mod transport;

pub use endpoint::{Endpoint, Scheme};
pub use error::{Error, ErrorKind, Result};
pub use feed::{Feed, FeedEntry};
pub use http::{fetch, HttpClient, HttpResponse};
pub use transport::{SessionState, Transport, TransportConfig};
