/*
 * response.rs
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

//! HTTP response: status and framing headers, then the decoded body.

use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};

/// Status line and the headers that drive body framing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    pub status_code: u16,
    pub status_reason: String,
    pub content_type: String,
    pub content_length: Option<u64>,
    pub transfer_coding: Option<String>,
}

impl ResponseHead {
    pub fn is_chunked(&self) -> bool {
        self.transfer_coding.as_deref() == Some("chunked")
    }

    /// Status acceptance policy: only 200 is decoded. Redirects are never followed.
    pub fn check_status(&self) -> Result<()> {
        match self.status_code {
            200 => Ok(()),
            code if code >= 400 => Err(Error::Protocol(format!(
                "server returned error status: {}",
                self.status_text()
            ))),
            _ => Err(Error::UnsupportedStatus(format!(
                "server returned unsupported status: {}",
                self.status_text()
            ))),
        }
    }

    fn status_text(&self) -> String {
        if self.status_reason.is_empty() {
            self.status_code.to_string()
        } else {
            format!("{} {}", self.status_code, self.status_reason)
        }
    }
}

/// Complete response, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_reason: String,
    pub content_type: String,
    pub content_length: Option<u64>,
    pub transfer_coding: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn from_head(head: ResponseHead, body: Bytes) -> Self {
        Self {
            status_code: head.status_code,
            status_reason: head.status_reason,
            content_type: head.content_type,
            content_length: head.content_length,
            transfer_coding: head.transfer_coding,
            body,
        }
    }

    /// Body as text; invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Display for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status code: {}", self.status_code)?;
        writeln!(f, "Status reason: {}", self.status_reason)?;
        writeln!(f, "Transfer coding: {}", self.transfer_coding.as_deref().unwrap_or(""))?;
        writeln!(f, "Content type: {}", self.content_type)?;
        match self.content_length {
            Some(len) => writeln!(f, "Content length: {}", len)?,
            None => writeln!(f, "Content length:")?,
        }
        write!(f, "Body: {} bytes", self.body.len())
    }
}
