/*
 * output.rs
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

//! Plain-text rendering of a feed.

use std::fmt::Write;

use feedfetch_core::Feed;

/// Which optional entry fields to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub time: bool,
    pub author: bool,
    pub url: bool,
}

impl DisplayOptions {
    fn any(&self) -> bool {
        self.time || self.author || self.url
    }
}

/// `*** title ***`, then one block per entry. Optional fields are printed only when present;
/// with any optional field enabled, entries are separated by a blank line.
pub fn render_feed(feed: &Feed, options: DisplayOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "*** {} ***", feed.title());
    let entries = feed.entries();
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "{}", entry.title);
        if options.url && !entry.url.is_empty() {
            let _ = writeln!(out, "URL: {}", entry.url);
        }
        if options.time && !entry.time.is_empty() {
            let _ = writeln!(out, "Updated: {}", entry.time);
        }
        if options.author && !entry.author.is_empty() {
            let _ = writeln!(out, "Author: {}", entry.author);
        }
        if options.any() && i + 1 < entries.len() {
            out.push('\n');
        }
    }
    out
}
