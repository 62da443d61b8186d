/*
 * request.rs
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

//! HTTP/1.1 GET request: request line plus ordered headers, no body.

use bytes::{BufMut, Bytes, BytesMut};

use crate::endpoint::Endpoint;

/// Fixed User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("feedfetch/", env!("CARGO_PKG_VERSION"));

/// GET request builder. Headers are written in insertion order.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RequestBuilder {
    /// GET for the endpoint's path with the standard one-shot header set:
    /// Host, `Connection: close`, User-Agent and a no-cache Cache-Control.
    pub fn get(endpoint: &Endpoint) -> Self {
        let mut request = Self {
            path: endpoint.path().to_string(),
            headers: Vec::new(),
        };
        request
            .header("Host", endpoint.hostname())
            .header("Connection", "close")
            .header("User-Agent", USER_AGENT)
            .header("Cache-Control", "no-cache, no-store, must-revalidate");
        request
    }

    /// Add or replace a header. Matching is case-insensitive; a replaced header keeps its position.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(256);
        out.put_slice(b"GET ");
        out.put_slice(self.path.as_bytes());
        out.put_slice(b" HTTP/1.1\r\n");
        for (k, v) in &self.headers {
            out.put_slice(k.as_bytes());
            out.put_slice(b": ");
            out.put_slice(v.as_bytes());
            out.put_slice(b"\r\n");
        }
        out.put_slice(b"\r\n");
        out.freeze()
    }
}

/// Serialize the GET request for `endpoint`.
pub fn serialize_get(endpoint: &Endpoint) -> Bytes {
    RequestBuilder::get(endpoint).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_request_wire_format() {
        let endpoint = Endpoint::parse("https://www.fit.vutbr.cz:8443/news/news-rss.php").unwrap();
        let expected = format!(
            "GET /news/news-rss.php HTTP/1.1\r\n\
             Host: www.fit.vutbr.cz\r\n\
             Connection: close\r\n\
             User-Agent: {}\r\n\
             Cache-Control: no-cache, no-store, must-revalidate\r\n\
             \r\n",
            USER_AGENT
        );
        assert_eq!(serialize_get(&endpoint), Bytes::from(expected));
    }

    #[test]
    fn default_path_is_root() {
        let endpoint = Endpoint::parse("example.com").unwrap();
        let wire = serialize_get(&endpoint);
        assert!(wire.starts_with(b"GET / HTTP/1.1\r\nHost: example.com\r\n"));
        assert!(wire.ends_with(b"\r\n\r\n"));
    }

    #[test]
    fn header_replaces_in_place() {
        let endpoint = Endpoint::parse("example.com").unwrap();
        let mut request = RequestBuilder::get(&endpoint);
        request.header("user-agent", "test");
        assert_eq!(request.headers.len(), 4);
        assert_eq!(request.headers[2], ("User-Agent".to_string(), "test".to_string()));
    }
}
