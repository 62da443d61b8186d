/*
 * commands.rs
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

//! Drive one run: a single URL, or every URL of a feed list, fetched strictly one at a time.

use std::path::Path;

use feedfetch_core::feedlist::load_feed_list;
use feedfetch_core::{Endpoint, Error, Feed, HttpClient, Result};
use tracing::error;

use crate::cli::Cli;
use crate::output::{render_feed, DisplayOptions};

/// Fetch one endpoint and interpret the body as a feed.
pub async fn fetch_feed(client: &mut HttpClient, endpoint: &Endpoint) -> Result<Feed> {
    let response = client.get(endpoint).await?;
    Feed::parse(&response.text(), endpoint.original())
}

pub async fn run(cli: &Cli) -> Result<()> {
    let options = cli.display_options();
    let mut client = HttpClient::new(cli.transport_config());
    match (&cli.url, &cli.feedfile) {
        (Some(url), _) => {
            let endpoint = Endpoint::parse(url)?;
            let feed = fetch_feed(&mut client, &endpoint).await?;
            print!("{}", render_feed(&feed, options));
            Ok(())
        }
        (None, Some(path)) => run_feed_list(&mut client, path, options).await,
        (None, None) => Err(Error::Argument(
            "a URL or a feed file (-f) is required".to_string(),
        )),
    }
}

/// Per-feed failures are logged and skipped; the run fails only if no feed succeeds.
async fn run_feed_list(client: &mut HttpClient, path: &Path, options: DisplayOptions) -> Result<()> {
    let endpoints = load_feed_list(path).await?;
    let mut succeeded = 0usize;
    for endpoint in &endpoints {
        match fetch_feed(client, endpoint).await {
            Ok(feed) => {
                if succeeded > 0 {
                    println!();
                }
                print!("{}", render_feed(&feed, options));
                succeeded += 1;
            }
            Err(e) => error!(url = %endpoint, kind = ?e.kind(), "{}", e),
        }
    }
    if succeeded == 0 {
        return Err(Error::Application("no feed could be processed".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use feedfetch_core::ErrorKind;

    #[tokio::test]
    async fn list_without_valid_urls_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds");
        std::fs::write(&path, "# nothing\n\nftp://bad/\n").unwrap();
        let cli = Cli::try_parse_from(["feedfetch", "-f", path.to_str().unwrap()]).unwrap();
        let err = run(&cli).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Application);
    }

    async fn serve_feed(body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request).await;
            let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", body.len());
            stream.write_all(head.as_bytes()).await.unwrap();
            stream.write_all(body.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        });
        format!("http://127.0.0.1:{}/rss", port)
    }

    #[tokio::test]
    async fn list_continues_past_failing_feed() {
        let good = serve_feed("<rss><channel><title>T</title><item><title>A</title></item></channel></rss>").await;
        let refused = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            format!("http://127.0.0.1:{}/", listener.local_addr().unwrap().port())
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds");
        std::fs::write(&path, format!("{}\n{}\n", refused, good)).unwrap();
        let cli = Cli::try_parse_from(["feedfetch", "-f", path.to_str().unwrap()]).unwrap();
        assert!(run(&cli).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_single_url_is_a_url_error() {
        let cli = Cli::try_parse_from(["feedfetch", "gopher://example.com/"]).unwrap();
        let err = run(&cli).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Url);
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn missing_feed_file() {
        let cli = Cli::try_parse_from(["feedfetch", "-f", "/nonexistent/feedfetch-list"]).unwrap();
        let err = run(&cli).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Application);
    }
}
