/*
 * feed.rs
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

//! Feed documents (RSS 0.9x/2.0, RSS 1.0 RDF, Atom) to a title and ordered entries.
//!
//! The document is read with quick_xml into a small element tree, then queried by local name so
//! namespace prefixes (`dc:date`, `rdf:RDF`, `atom:feed`) do not matter.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{Error, Result};

/// One feed entry. Fields missing from the document are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub time: String,
    pub author: String,
    pub url: String,
}

/// Parsed feed: title plus entries in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    title: String,
    entries: Vec<FeedEntry>,
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

fn local(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

impl Element {
    fn from_start(e: &BytesStart<'_>) -> std::result::Result<Self, String> {
        let mut element = Element {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            ..Default::default()
        };
        for attr in e.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
            element.attrs.push((key, value));
        }
        Ok(element)
    }

    fn local_name(&self) -> &str {
        local(&self.name)
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local_name() == name)
    }

    fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.local_name() == name)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| local(k) == name)
            .map(|(_, v)| v.as_str())
    }

    fn text(&self) -> &str {
        self.text.trim()
    }

    fn child_text(&self, name: &str) -> &str {
        self.child(name).map(Element::text).unwrap_or("")
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn parse_tree(xml: &str) -> std::result::Result<Element, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Err(e) => {
                return Err(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => stack.push(Element::from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let element = Element::from_start(&e)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(e)) => {
                if let Some(top) = stack.last_mut() {
                    match e.unescape() {
                        Ok(text) => top.text.push_str(&text),
                        // Undeclared entities: keep the raw text.
                        Err(_) => top.text.push_str(&String::from_utf8_lossy(&e)),
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            _ => {}
        }
        buf.clear();
    }
    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn entry_time(entry: &Element) -> String {
    ["date", "pubDate", "updated", "published"]
        .iter()
        .map(|name| entry.child_text(name))
        .find(|t| !t.is_empty())
        .unwrap_or("")
        .to_string()
}

fn entry_author(entry: &Element) -> String {
    let mut authors: Vec<&str> = Vec::new();
    for author in entry.children("author") {
        let name = author.child_text("name");
        let text = if !name.is_empty() {
            name
        } else if !author.child_text("email").is_empty() {
            author.child_text("email")
        } else {
            author.text()
        };
        if !text.is_empty() {
            authors.push(text);
        }
    }
    for creator in entry.children("creator") {
        if !creator.text().is_empty() {
            authors.push(creator.text());
        }
    }
    authors.join(", ")
}

fn entry_url(entry: &Element) -> String {
    let link = entry
        .children("link")
        .find(|l| matches!(l.attr("rel"), None | Some("alternate")))
        .or_else(|| entry.child("link"));
    match link {
        Some(l) if !l.text().is_empty() => l.text().to_string(),
        Some(l) => l.attr("href").unwrap_or("").to_string(),
        None => String::new(),
    }
}

impl Feed {
    /// Interpret `xml`. `source` is the originating URL, used in error messages and as the
    /// title of feeds that declare none.
    pub fn parse(xml: &str, source: &str) -> Result<Self> {
        let root = parse_tree(xml)
            .map_err(|e| Error::Protocol(format!("{}: invalid XML document ({})", source, e)))?;
        if !matches!(root.local_name(), "feed" | "rss" | "RDF") {
            return Err(Error::Protocol(format!(
                "{}: invalid feed format (missing valid root XML tag)",
                source
            )));
        }
        let channel = root.child("channel");

        let title = match root.child("title").or_else(|| channel.and_then(|c| c.child("title"))) {
            Some(t) if !t.text().is_empty() => t.text().to_string(),
            _ => source.to_string(),
        };

        let mut items: Vec<&Element> = root.children("item").collect();
        if items.is_empty() {
            items = root.children("entry").collect();
        }
        if items.is_empty() {
            if let Some(channel) = channel {
                items = channel.children("item").collect();
            }
        }

        let entries = items
            .into_iter()
            .map(|entry| FeedEntry {
                title: entry.child_text("title").to_string(),
                time: entry_time(entry),
                author: entry_author(entry),
                url: entry_url(entry),
            })
            .collect();
        Ok(Feed { title, entries })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }
}
