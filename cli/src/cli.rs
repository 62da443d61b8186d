/*
 * cli.rs
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

//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use feedfetch_core::TransportConfig;

use crate::output::DisplayOptions;

#[derive(Parser, Debug)]
#[command(name = "feedfetch")]
#[command(about = "Downloads RSS, RDF or Atom feeds and prints their entries", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "feedfile"])))]
pub struct Cli {
    /// URL of the feed ([http[s]://]host[:port][/path])
    pub url: Option<String>,

    /// File with one feed URL per line
    #[arg(short = 'f', value_name = "FEEDFILE")]
    pub feedfile: Option<PathBuf>,

    /// PEM file with certificates used to validate TLS peers
    #[arg(short = 'c', value_name = "CERTFILE")]
    pub certfile: Option<PathBuf>,

    /// Directory scanned for certificates used to validate TLS peers
    #[arg(short = 'C', value_name = "CERTDIR")]
    pub certdir: Option<PathBuf>,

    /// Show the creation or modification time of each entry
    #[arg(short = 'T')]
    pub show_time: bool,

    /// Show the author of each entry
    #[arg(short = 'a')]
    pub show_author: bool,

    /// Show the URL of each entry
    #[arg(short = 'u')]
    pub show_url: bool,
}

impl Cli {
    pub fn transport_config(&self) -> TransportConfig {
        let mut config = TransportConfig::new();
        if let Some(file) = &self.certfile {
            config = config.with_ca_file(file);
        }
        if let Some(dir) = &self.certdir {
            config = config.with_ca_dir(dir);
        }
        config
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            time: self.show_time,
            author: self.show_author,
            url: self.show_url,
        }
    }
}
