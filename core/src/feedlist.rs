/*
 * feedlist.rs
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

//! Feed list files: one URL per line. A line starting with `#` is a comment, and ` #` starts a
//! trailing comment. Blank lines are skipped; invalid URLs are skipped with a warning.

use std::path::Path;

use tracing::warn;

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};

/// Remove a comment from one line and trim it.
pub fn strip_comment(line: &str) -> &str {
    if line.starts_with('#') {
        return "";
    }
    let line = match line.find(" #") {
        Some(pos) => &line[..pos],
        None => line,
    };
    line.trim()
}

/// Parse a feed list. Returns the valid endpoints in file order.
pub fn parse_feed_list(text: &str) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = strip_comment(line);
        if line.is_empty() {
            continue;
        }
        match Endpoint::parse(line) {
            Ok(endpoint) => endpoints.push(endpoint),
            Err(e) => warn!(line = index + 1, url = line, error = %e, "skipping invalid feed URL"),
        }
    }
    endpoints
}

/// Read and parse a feed list file.
pub async fn load_feed_list(path: &Path) -> Result<Vec<Endpoint>> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Application(format!("cannot read feed file {}: {}", path.display(), e))
    })?;
    Ok(parse_feed_list(&text))
}
