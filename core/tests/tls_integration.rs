/*
 * tls_integration.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Integration tests for HTTPS fetches. A local rustls server presents the
 * localhost certificate in tests/data, signed by the test CA next to it.
 *
 * Run with:
 *   cargo test -p feedfetch_core --test tls_integration
 */

use std::sync::Arc;
use std::time::Duration;

use feedfetch_core::{fetch, Endpoint, ErrorKind, SessionState, Transport, TransportConfig};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

const CA_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/ca.pem");
const LEAF_CERT: &[u8] = include_bytes!("data/localhost.pem");
const LEAF_KEY: &[u8] = include_bytes!("data/localhost.key");

const LENGTH_DELIMITED: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\n\r\nhello world";
const CLOSE_DELIMITED: &[u8] = b"HTTP/1.1 200 OK\r\n\r\nhello world";

fn acceptor() -> TlsAcceptor {
    let certs = CertificateDer::pem_slice_iter(LEAF_CERT)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let key = PrivateKeyDer::from_pem_slice(LEAF_KEY).unwrap();
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

/// Serve one TLS connection with `response`. Without `close_notify` the TCP stream is shut down
/// with no TLS alert.
async fn serve_tls_once(response: &'static [u8], close_notify: bool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let acceptor = acceptor();
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        // Fails when the client rejects the certificate.
        let Ok(mut tls) = acceptor.accept(tcp).await else {
            return;
        };
        let mut request: Vec<u8> = Vec::new();
        let mut tmp = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match tls.read(&mut tmp).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&tmp[..n]),
            }
        }
        tls.write_all(response).await.unwrap();
        tls.flush().await.unwrap();
        if close_notify {
            let _ = tls.shutdown().await;
        } else {
            let (mut tcp, _) = tls.into_inner();
            let _ = tcp.shutdown().await;
        }
    });
    format!("https://localhost:{}/feed.xml", port)
}

fn trusting_test_ca() -> TransportConfig {
    TransportConfig::new()
        .with_ca_file(CA_FILE)
        .with_io_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn fetch_trusted_by_ca_file() {
    let url = serve_tls_once(LENGTH_DELIMITED, true).await;
    let endpoint = Endpoint::parse(&url).unwrap();
    let mut transport = Transport::new(trusting_test_ca());

    let response = fetch(&mut transport, &endpoint).await.unwrap();

    assert_eq!(response.text(), "hello world");
    assert_eq!(transport.state(), SessionState::Closed);
    assert!(!transport.has_tls_context());
}

#[tokio::test]
async fn close_delimited_body_without_close_notify() {
    let url = serve_tls_once(CLOSE_DELIMITED, false).await;
    let endpoint = Endpoint::parse(&url).unwrap();
    let mut transport = Transport::new(trusting_test_ca());

    let response = fetch(&mut transport, &endpoint).await.unwrap();

    assert_eq!(response.text(), "hello world");
}

#[tokio::test]
async fn fetch_trusted_by_ca_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(CA_FILE, dir.path().join("test-ca.pem")).unwrap();
    std::fs::write(dir.path().join("README"), "not a certificate").unwrap();
    let url = serve_tls_once(LENGTH_DELIMITED, true).await;
    let endpoint = Endpoint::parse(&url).unwrap();
    let config = TransportConfig::new()
        .with_ca_dir(dir.path())
        .with_io_timeout(Duration::from_secs(2));
    let mut transport = Transport::new(config);

    let response = fetch(&mut transport, &endpoint).await.unwrap();

    assert_eq!(response.text(), "hello world");
}

#[tokio::test]
async fn untrusted_certificate_is_rejected() {
    let url = serve_tls_once(LENGTH_DELIMITED, true).await;
    let endpoint = Endpoint::parse(&url).unwrap();
    let config = TransportConfig::new().with_io_timeout(Duration::from_secs(2));
    let mut transport = Transport::new(config);

    let err = fetch(&mut transport, &endpoint).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(
        err.message()
            .starts_with("certificate of localhost could not be validated"),
        "{}",
        err
    );
    assert_eq!(transport.state(), SessionState::Closed);
    assert!(!transport.has_tls_context());
}
