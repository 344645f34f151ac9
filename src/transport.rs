//! Socket-level HTTP transport.
//!
//! One call = one TCP (optionally TLS-wrapped) connection, one manually
//! written request, one full response read until the peer closes. The
//! request always asks for `Connection: close`, so end-of-stream marks the
//! end of the response. The body may be binary or multi-byte UTF-8, so the
//! buffer is returned as raw bytes and decoded by the caller only after
//! the read completes.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::{
    ACCEPT_LANGUAGE, READ_CHUNK_SIZE, TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS,
};
use crate::error_handling::TransportError;
use crate::target::{RequestTarget, Scheme};

/// Builds the raw request written to the socket.
///
/// Request line plus the fixed header set: `Host`, `User-Agent`, `Accept`
/// (caller-supplied, so the same resource can be requested as JSON or
/// HTML), `Accept-Language`, and `Connection: close`.
fn build_request(target: &RequestTarget, accept: &str, user_agent: &str) -> String {
    format!(
        "GET {} HTTP/1.1\r\n\
         Host: {}\r\n\
         User-Agent: {}\r\n\
         Accept: {}\r\n\
         Accept-Language: {}\r\n\
         Connection: close\r\n\
         \r\n",
        target.request_path(),
        target.host_header(),
        user_agent,
        accept,
        ACCEPT_LANGUAGE,
    )
}

/// Writes the request and reads the response until end-of-stream.
///
/// A missing TLS close_notify surfaces as `UnexpectedEof`; since the
/// response boundary here is connection close, that is treated as a normal
/// end of stream.
async fn exchange<S>(mut stream: S, request: &[u8]) -> std::io::Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(request).await?;
    stream.flush().await?;

    let mut response = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => response.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }
    }
    Ok(response)
}

/// Sends one GET request to the target and returns the full raw response.
///
/// Opens a TCP connection (TLS-wrapped when the scheme is https), writes
/// the request, reads until the peer closes, and closes the socket on
/// every exit path (the owned stream drops with this call).
///
/// # Arguments
///
/// * `target` - Parsed request target (host, port, path, query)
/// * `accept` - Value of the `Accept` header for this request
/// * `user_agent` - Value of the `User-Agent` header
/// * `read_timeout` - Ceiling on the write-plus-read exchange
///
/// # Errors
///
/// Returns a `TransportError` naming the failed phase: connect, server
/// naming, TLS handshake, mid-exchange I/O, or a timeout in any of them.
pub async fn send(
    target: &RequestTarget,
    accept: &str,
    user_agent: &str,
    read_timeout: Duration,
) -> Result<Vec<u8>, TransportError> {
    let host = target.host.clone();
    let port = target.port;
    let request = build_request(target, accept, user_agent);
    debug!("sending request to {}:{}", host, port);

    let sock = match tokio::time::timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        TcpStream::connect((host.as_str(), port)),
    )
    .await
    {
        Ok(Ok(sock)) => sock,
        Ok(Err(source)) => {
            return Err(TransportError::Connect { host, port, source });
        }
        Err(_) => {
            return Err(TransportError::ConnectTimeout {
                host,
                port,
                seconds: TCP_CONNECT_TIMEOUT_SECS,
            });
        }
    };

    let bytes = match target.scheme {
        Scheme::Http => {
            match tokio::time::timeout(read_timeout, exchange(sock, request.as_bytes())).await {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(source)) => return Err(TransportError::Io { host, source }),
                Err(_) => {
                    return Err(TransportError::ReadTimeout {
                        host,
                        seconds: read_timeout.as_secs(),
                    });
                }
            }
        }
        Scheme::Https => {
            let mut root_store = RootCertStore::empty();
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            let config = ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();

            let server_name = ServerName::try_from(host.clone())
                .map_err(|_| TransportError::ServerName(host.clone()))?;

            let connector = TlsConnector::from(Arc::new(config));
            let tls_stream = match tokio::time::timeout(
                Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
                connector.connect(server_name, sock),
            )
            .await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(source)) => return Err(TransportError::Tls { host, source }),
                Err(_) => {
                    return Err(TransportError::TlsTimeout {
                        host,
                        seconds: TLS_HANDSHAKE_TIMEOUT_SECS,
                    });
                }
            };

            match tokio::time::timeout(read_timeout, exchange(tls_stream, request.as_bytes()))
                .await
            {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(source)) => return Err(TransportError::Io { host, source }),
                Err(_) => {
                    return Err(TransportError::ReadTimeout {
                        host,
                        seconds: read_timeout.as_secs(),
                    });
                }
            }
        }
    };

    debug!("received {} bytes from {}:{}", bytes.len(), host, port);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_shape() {
        let target = RequestTarget::parse("https://example.com/a/b?q=1").unwrap();
        let request = build_request(&target, "text/html", "test-agent");

        assert!(request.starts_with("GET /a/b?q=1 HTTP/1.1\r\n"));
        assert!(request.contains("Host: example.com\r\n"));
        assert!(request.contains("User-Agent: test-agent\r\n"));
        assert!(request.contains("Accept: text/html\r\n"));
        assert!(request.contains("Accept-Language: en-US,en;q=0.9\r\n"));
        assert!(request.contains("Connection: close\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_build_request_host_header_keeps_custom_port() {
        let target = RequestTarget::parse("http://127.0.0.1:8080/").unwrap();
        let request = build_request(&target, "text/html", "test-agent");
        assert!(request.contains("Host: 127.0.0.1:8080\r\n"));
    }

    #[test]
    fn test_build_request_defaults_path_to_root() {
        let target = RequestTarget::parse("http://example.com").unwrap();
        let request = build_request(&target, "*/*", "test-agent");
        assert!(request.starts_with("GET / HTTP/1.1\r\n"));
    }
}
