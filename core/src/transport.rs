/*
 * transport.rs
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

//! Byte-stream transport to one host: plain TCP or TLS (rustls), one live connection at a time.
//!
//! Every connect, handshake, read and write is a single attempt bounded by the configured wait
//! (10 s by default). An attempt that is still not ready when the bound elapses fails with
//! `TransportTimeout`; any other failure is `Transport` with the OS or TLS reason embedded.
//!
//! Trust configuration lives in [`TransportConfig`] for the lifetime of the [`Transport`]. The TLS
//! connector built from it is scoped to one connection: `close()` drops it and the next secure
//! connect builds a fresh one.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use rustls::client::ClientConfig;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::RootCertStore;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};

/// Bound on every readiness wait.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(10);

const READ_CHUNK: usize = 8192;

/// Transport configuration: trust store and wait bound. Supplied once, reused across exchanges.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    ca_file: Option<PathBuf>,
    ca_dir: Option<PathBuf>,
    io_timeout: Duration,
}

impl TransportConfig {
    pub fn new() -> Self {
        Self {
            ca_file: None,
            ca_dir: None,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// PEM bundle of trusted CA certificates.
    pub fn with_ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_file = Some(path.into());
        self
    }

    /// Directory scanned for PEM files of trusted CA certificates.
    pub fn with_ca_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_dir = Some(path.into());
        self
    }

    pub fn with_io_timeout(mut self, limit: Duration) -> Self {
        self.io_timeout = limit;
        self
    }

    pub fn ca_file(&self) -> Option<&Path> {
        self.ca_file.as_deref()
    }

    pub fn ca_dir(&self) -> Option<&Path> {
        self.ca_dir.as_deref()
    }

    pub fn io_timeout(&self) -> Duration {
        self.io_timeout
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection lifecycle of a [`Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    Closed,
}

/// Unified stream: plain TCP or TLS. Implements AsyncRead + AsyncWrite.
pub enum TransportStream {
    Plain(TcpStream),
    Tls(TlsStream<TcpStream>),
}

impl AsyncRead for TransportStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            TransportStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            TransportStream::Tls(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for TransportStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            TransportStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            TransportStream::Tls(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            TransportStream::Plain(s) => Pin::new(s).poll_flush(cx),
            TransportStream::Tls(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            TransportStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            TransportStream::Tls(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// Run one I/O attempt, waiting at most `limit` for it to become ready.
async fn bounded<T, F>(limit: Duration, attempt: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("not ready within {} ms", limit.as_millis()),
        )),
    }
}

/// Map an I/O failure to the taxonomy, prefixing `context`.
fn io_failure(context: &str, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::TimedOut {
        Error::TransportTimeout(format!("{}: {}", context, e))
    } else {
        Error::Transport(format!("{}: {}", context, e))
    }
}

/// Handshake failures caused by the peer certificate get their own message.
fn handshake_failure(host: &str, e: io::Error) -> Error {
    let tls_error = e.get_ref().and_then(|inner| inner.downcast_ref::<rustls::Error>());
    match tls_error {
        Some(err @ rustls::Error::InvalidCertificate(_)) => Error::Transport(format!(
            "certificate of {} could not be validated: {}",
            host, err
        )),
        _ => io_failure(&format!("TLS handshake with {}", host), e),
    }
}

/// Platform native certs first, then webpki-roots as fallback.
fn default_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    match rustls_native_certs::load_native_certs() {
        Ok(certs) => {
            let (added, ignored) = root_store.add_parsable_certificates(certs);
            debug!(added, ignored, "loaded platform trust store");
        }
        Err(e) => debug!(error = %e, "platform trust store unavailable"),
    }
    if root_store.is_empty() {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }
    root_store
}

fn load_pem_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let data = std::fs::read(path).map_err(|e| {
        Error::Transport(format!("cannot read certificate file {}: {}", path.display(), e))
    })?;
    CertificateDer::pem_slice_iter(&data)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Transport(format!("invalid PEM in {}: {}", path.display(), e)))
}

/// Root store from the configured CA file and/or directory, or the default store if neither is set.
fn build_root_store(config: &TransportConfig) -> Result<RootCertStore> {
    if config.ca_file.is_none() && config.ca_dir.is_none() {
        return Ok(default_root_store());
    }
    let mut roots = RootCertStore::empty();
    if let Some(file) = &config.ca_file {
        let certs = load_pem_certificates(file)?;
        let (added, _) = roots.add_parsable_certificates(certs);
        if added == 0 {
            return Err(Error::Transport(format!(
                "no usable certificate in {}",
                file.display()
            )));
        }
    }
    if let Some(dir) = &config.ca_dir {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            Error::Transport(format!(
                "cannot read certificate directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        for entry in entries {
            let path = entry
                .map_err(|e| Error::Transport(format!("{}: {}", dir.display(), e)))?
                .path();
            if !path.is_file() {
                continue;
            }
            // Directories usually hold CRLs and other non-certificate files too.
            match load_pem_certificates(&path) {
                Ok(certs) => {
                    roots.add_parsable_certificates(certs);
                }
                Err(e) => debug!(error = %e, "skipping file in certificate directory"),
            }
        }
    }
    if roots.is_empty() {
        return Err(Error::Transport(
            "no trusted certificates could be loaded".to_string(),
        ));
    }
    Ok(roots)
}

fn tls_connector(config: &TransportConfig) -> Result<TlsConnector> {
    let roots = build_root_store(config)?;
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut client = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Transport(format!("cannot create TLS context: {}", e)))?
        .with_root_certificates(roots)
        .with_no_client_auth();
    client.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(TlsConnector::from(Arc::new(client)))
}

/// Transport session. Holds at most one live connection; see the module docs.
pub struct Transport {
    config: TransportConfig,
    state: SessionState,
    tls: Option<TlsConnector>,
    stream: Option<TransportStream>,
    host: String,
}

impl Transport {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            tls: None,
            stream: None,
            host: String::new(),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True once a TLS context has been prepared for the next connect.
    pub fn has_tls_context(&self) -> bool {
        self.tls.is_some()
    }

    /// Build a fresh TLS context from the configured trust store.
    pub fn prepare_tls(&mut self) -> Result<()> {
        self.tls = Some(tls_connector(&self.config)?);
        Ok(())
    }

    /// Open a connection to the endpoint: TCP connect, then TLS handshake for https.
    pub async fn connect(&mut self, endpoint: &Endpoint) -> Result<()> {
        if self.state == SessionState::Connected {
            return Err(Error::Transport(format!(
                "transport is still connected to {}",
                self.host
            )));
        }
        self.state = SessionState::Connecting;
        self.host = endpoint.hostname().to_string();
        match self.open(endpoint).await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = SessionState::Connected;
                debug!(host = %self.host, port = endpoint.port(), tls = endpoint.is_https(), "connected");
                Ok(())
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    async fn open(&mut self, endpoint: &Endpoint) -> Result<TransportStream> {
        let limit = self.config.io_timeout;
        let connector = if endpoint.is_https() {
            match self.tls.clone() {
                Some(connector) => Some(connector),
                None => {
                    self.prepare_tls()?;
                    self.tls.clone()
                }
            }
        } else {
            None
        };

        let addr = endpoint.authority();
        let tcp = bounded(limit, TcpStream::connect(&addr))
            .await
            .map_err(|e| io_failure(&format!("cannot connect to {}", addr), e))?;

        let connector = match connector {
            Some(connector) => connector,
            None => return Ok(TransportStream::Plain(tcp)),
        };
        let server_name = ServerName::try_from(endpoint.hostname().to_string()).map_err(|_| {
            Error::Transport(format!("invalid host name {}", endpoint.hostname()))
        })?;
        let tls = bounded(limit, connector.connect(server_name, tcp))
            .await
            .map_err(|e| handshake_failure(endpoint.hostname(), e))?;
        Ok(TransportStream::Tls(tls))
    }

    /// Write all of `data`. A write that accepts zero bytes means the peer closed the connection.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        let limit = self.config.io_timeout;
        let host = &self.host;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::Transport("transport is not connected".to_string()))?;
        let mut written = 0;
        while written < data.len() {
            let n = bounded(limit, stream.write(&data[written..]))
                .await
                .map_err(|e| io_failure(&format!("error sending data to {}", host), e))?;
            if n == 0 {
                return Err(Error::Transport(format!(
                    "connection closed by peer {}",
                    host
                )));
            }
            written += n;
        }
        bounded(limit, stream.flush())
            .await
            .map_err(|e| io_failure(&format!("error sending data to {}", host), e))
    }

    /// One read into `buf`. Returns the number of bytes appended; 0 is a clean end of stream.
    pub async fn read_some(&mut self, buf: &mut BytesMut) -> Result<usize> {
        let limit = self.config.io_timeout;
        let host = &self.host;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::Transport("transport is not connected".to_string()))?;
        buf.reserve(READ_CHUNK);
        let result = bounded(limit, stream.read_buf(buf)).await;
        match result {
            Ok(n) => Ok(n),
            // Peer closed without close_notify. Framing is decided by HTTP, not by TLS.
            Err(e)
                if e.kind() == io::ErrorKind::UnexpectedEof
                    && matches!(stream, TransportStream::Tls(_)) =>
            {
                debug!(host = %host, "TLS peer closed without close_notify");
                Ok(0)
            }
            Err(e) => Err(io_failure(&format!("error reading data from {}", host), e)),
        }
    }

    /// Read into `buf` until the stream ends. Returns the number of bytes appended.
    pub async fn read_to_end(&mut self, buf: &mut BytesMut) -> Result<usize> {
        let mut total = 0;
        loop {
            let n = self.read_some(buf).await?;
            if n == 0 {
                return Ok(total);
            }
            total += n;
        }
    }

    /// Read the whole stream.
    pub async fn read(&mut self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(READ_CHUNK);
        self.read_to_end(&mut buf).await?;
        Ok(buf.freeze())
    }

    /// Drop the connection and the TLS context. Safe to call in any state.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!(host = %self.host, "connection closed");
        }
        self.tls = None;
        self.state = SessionState::Closed;
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}
