/*
 * endpoint.rs
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

//! Feed endpoint URLs: `[scheme://]host[:port][/path]` with scheme http or https.
//! Scheme defaults to http, port to 80/443, path to `/`. Parsed and validated once, then immutable.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Supported URL schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    /// Case-insensitive scheme lookup.
    fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("http") {
            Some(Scheme::Http)
        } else if name.eq_ignore_ascii_case("https") {
            Some(Scheme::Https)
        } else {
            None
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed, validated target URL.
#[derive(Debug, Clone)]
pub struct Endpoint {
    scheme: Scheme,
    hostname: String,
    port: u16,
    path: String,
    original: String,
}

/// Word characters as in `\w`: ASCII letters, digits, underscore.
fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_host_char(b: u8) -> bool {
    is_word(b) || b == b'.' || b == b'-'
}

/// Split off a leading `scheme://`. The separator counts only when preceded by a non-empty word token.
fn split_scheme(raw: &str) -> (Option<&str>, &str) {
    if let Some(i) = raw.find("://") {
        let scheme = &raw[..i];
        if !scheme.is_empty() && scheme.bytes().all(is_word) {
            return (Some(scheme), &raw[i + 3..]);
        }
    }
    (None, raw)
}

/// Check `raw` against `[word+://]hostchar+[:digit{1,5}][/...]`.
fn matches_grammar(raw: &str) -> bool {
    let (_, rest) = split_scheme(raw);
    let host_end = rest.find([':', '/']).unwrap_or(rest.len());
    let host = &rest[..host_end];
    if host.is_empty() || !host.bytes().all(is_host_char) {
        return false;
    }
    let mut rest = &rest[host_end..];
    if let Some(after) = rest.strip_prefix(':') {
        let digits_end = after.find('/').unwrap_or(after.len());
        let digits = &after[..digits_end];
        if digits.is_empty() || digits.len() > 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        rest = &after[digits_end..];
    }
    rest.is_empty() || rest.starts_with('/')
}

impl Endpoint {
    /// Parse and validate a URL string.
    pub fn parse(raw: &str) -> Result<Self> {
        if !matches_grammar(raw) {
            return Err(Error::Url(format!("URL {} is not valid", raw)));
        }
        let (scheme_name, rest) = split_scheme(raw);
        let scheme = match scheme_name {
            None => Scheme::Http,
            Some(name) => Scheme::from_name(name).ok_or_else(|| {
                Error::Url(format!(
                    "only HTTP and HTTPS are supported, {} uses {}",
                    raw,
                    name.to_ascii_lowercase()
                ))
            })?,
        };

        let path_pos = rest.find('/').unwrap_or(rest.len());
        let authority = &rest[..path_pos];
        let (hostname, port) = match authority.split_once(':') {
            Some((host, port)) => (host, parse_port(port)?),
            None => (authority, scheme.default_port()),
        };
        let path = if path_pos < rest.len() {
            &rest[path_pos..]
        } else {
            "/"
        };

        let endpoint = Self {
            scheme,
            hostname: hostname.to_string(),
            port,
            path: path.to_string(),
            original: raw.to_string(),
        };
        endpoint.validate()?;
        Ok(endpoint)
    }

    /// Re-check the original string against the permitted grammar, scheme set and port range.
    pub fn validate(&self) -> Result<()> {
        if !matches_grammar(&self.original) {
            return Err(Error::Url(format!("URL {} is not valid", self.original)));
        }
        let (scheme_name, rest) = split_scheme(&self.original);
        if let Some(name) = scheme_name {
            if Scheme::from_name(name) != Some(self.scheme) {
                return Err(Error::Url(format!(
                    "only HTTP and HTTPS are supported, {} uses {}",
                    self.original,
                    name.to_ascii_lowercase()
                )));
            }
        }
        let authority = &rest[..rest.find('/').unwrap_or(rest.len())];
        if let Some((_, port)) = authority.split_once(':') {
            parse_port(port)?;
        }
        Ok(())
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The string this endpoint was parsed from.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_https(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// `hostname:port`, as used for the socket connect.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

fn parse_port(port: &str) -> Result<u16> {
    let out_of_range = || Error::Url(format!("URL port is out of range ({})", port));
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Url(format!("URL port is not numeric ({})", port)));
    }
    let value: u32 = port.parse().map_err(|_| out_of_range())?;
    match u16::try_from(value) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(out_of_range()),
    }
}

/// Equality over scheme, host, port and path; the original spelling is ignored.
impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.hostname == other.hostname
            && self.port == other.port
            && self.path == other.path
    }
}

impl Eq for Endpoint {}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Endpoint::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn bare_host_defaults_to_http() {
        let e = Endpoint::parse("www.fit.vutbr.cz").unwrap();
        assert_eq!(e.scheme(), Scheme::Http);
        assert_eq!(e.hostname(), "www.fit.vutbr.cz");
        assert_eq!(e.port(), 80);
        assert_eq!(e.path(), "/");
    }

    #[test]
    fn bare_host_with_path() {
        let e = Endpoint::parse("example.com/news/news-rss.php").unwrap();
        assert_eq!(e.scheme(), Scheme::Http);
        assert_eq!(e.port(), 80);
        assert_eq!(e.path(), "/news/news-rss.php");
    }

    #[test]
    fn https_defaults_to_443() {
        let e = Endpoint::parse("https://xkcd.com/atom.xml").unwrap();
        assert!(e.is_https());
        assert_eq!(e.port(), 443);
        assert_eq!(e.path(), "/atom.xml");
        assert_eq!(e.authority(), "xkcd.com:443");
    }

    #[test]
    fn explicit_port_and_uppercase_scheme() {
        let e = Endpoint::parse("HTTPS://feeds.example-host.org:8443").unwrap();
        assert_eq!(e.scheme(), Scheme::Https);
        assert_eq!(e.hostname(), "feeds.example-host.org");
        assert_eq!(e.port(), 8443);
        assert_eq!(e.path(), "/");
        assert_eq!(e.original(), "HTTPS://feeds.example-host.org:8443");
    }

    #[test]
    fn colon_in_path_is_not_a_port() {
        let e = Endpoint::parse("http://example.com/a:b").unwrap();
        assert_eq!(e.hostname(), "example.com");
        assert_eq!(e.port(), 80);
        assert_eq!(e.path(), "/a:b");
    }

    #[test]
    fn unsupported_scheme_rejected() {
        let err = Endpoint::parse("ftp://example.com/feed").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Url);
        assert!(err.message().contains("ftp"));
    }

    #[test]
    fn out_of_range_ports_rejected() {
        for raw in ["example.com:65536", "example.com:99999", "http://example.com:0/"] {
            let err = Endpoint::parse(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Url, "{}", raw);
        }
        assert_eq!(Endpoint::parse("example.com:65535").unwrap().port(), 65535);
    }

    #[test]
    fn non_numeric_or_overlong_ports_rejected() {
        for raw in ["example.com:http", "example.com:", "example.com:123456", "example.com:8a/x"] {
            assert!(Endpoint::parse(raw).is_err(), "{}", raw);
        }
    }

    #[test]
    fn malformed_hosts_rejected() {
        for raw in ["", "http://", "http://exa mple.com/", "http://ex@mple.com", "://host"] {
            assert!(Endpoint::parse(raw).is_err(), "{:?}", raw);
        }
    }

    #[test]
    fn validate_is_pure_and_repeatable() {
        let e: Endpoint = "http://localhost:8080/rss".parse().unwrap();
        assert!(e.validate().is_ok());
        assert!(e.validate().is_ok());
        assert_eq!(e.to_string(), "http://localhost:8080/rss");
    }

    #[test]
    fn equality_ignores_original_spelling() {
        let a = Endpoint::parse("example.com").unwrap();
        let b = Endpoint::parse("http://example.com:80/").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Endpoint::parse("https://example.com").unwrap());
    }
}
