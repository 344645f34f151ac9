//! End-to-end fetch behavior against scripted loopback HTTP servers.
//!
//! Each test binds a listener on 127.0.0.1:0, serves canned responses
//! routed by request path, and drives the real transport and redirect
//! controller through the public API. Connections are closed after each
//! response, matching the `Connection: close` framing the client requests.

use std::collections::HashMap;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use webgrab::{extract_text, fetch_page, fetch_raw, Config, FetchError, TextCache, TransportError};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml";

fn ok_html(body: &str) -> String {
    format!("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n{body}")
}

fn ok_json(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{body}"
    )
}

fn redirect(status: u16, location: &str) -> String {
    format!("HTTP/1.1 {status} Redirect\r\nLocation: {location}\r\nConnection: close\r\n\r\n")
}

fn not_found() -> String {
    "HTTP/1.1 404 Not Found\r\nContent-Type: text/html\r\n\r\n<p>Nothing at this path</p>"
        .to_string()
}

async fn read_request(socket: &mut TcpStream) -> Option<String> {
    let mut buf = [0u8; 4096];
    let mut request = Vec::new();
    loop {
        match socket.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => return None,
        }
    }
    Some(String::from_utf8_lossy(&request).into_owned())
}

/// Binds a scripted server and returns its port. Responses are routed by
/// request path; unknown paths get a 404.
async fn spawn_server(routes: HashMap<String, String>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test server");
    let port = listener.local_addr().expect("no local addr").port();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let path = request
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                let response = routes.get(&path).cloned().unwrap_or_else(not_found);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    port
}

/// Binds a server that reads the request and then never answers.
async fn spawn_stalling_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test server");
    let port = listener.local_addr().expect("no local addr").port();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                tokio::time::sleep(Duration::from_secs(60)).await;
            });
        }
    });

    port
}

fn test_config() -> Config {
    Config {
        timeout_seconds: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn follows_redirect_chain_of_five_urls() {
    let mut routes = HashMap::new();
    // five URLs in the chain: four redirect hops, then the final page
    routes.insert("/h0".to_string(), redirect(301, "/h1"));
    routes.insert("/h1".to_string(), redirect(302, "/h2"));
    routes.insert("/h2".to_string(), redirect(307, "/h3"));
    routes.insert("/h3".to_string(), redirect(308, "/h4"));
    routes.insert("/h4".to_string(), ok_html("<p>Final page content</p>"));
    let port = spawn_server(routes).await;

    let response = fetch_raw(
        &format!("http://127.0.0.1:{port}/h0"),
        ACCEPT_HTML,
        &test_config(),
    )
    .await
    .expect("chain of four hops should succeed");

    assert_eq!(response.status_code(), Some(200));
    assert_eq!(extract_text(&response), "Final page content.");
}

#[tokio::test]
async fn fails_with_too_many_redirects_past_the_ceiling() {
    let mut routes = HashMap::new();
    for i in 0..6 {
        routes.insert(format!("/h{i}"), redirect(301, &format!("/h{}", i + 1)));
    }
    routes.insert("/h6".to_string(), ok_html("<p>Unreachable</p>"));
    let port = spawn_server(routes).await;

    let err = fetch_raw(
        &format!("http://127.0.0.1:{port}/h0"),
        ACCEPT_HTML,
        &test_config(),
    )
    .await
    .expect_err("five hops should exceed the ceiling");

    assert!(matches!(err, FetchError::TooManyRedirects(5)));
}

#[tokio::test]
async fn detects_a_two_url_redirect_loop() {
    let mut routes = HashMap::new();
    routes.insert("/a".to_string(), redirect(302, "/b"));
    routes.insert("/b".to_string(), redirect(302, "/a"));
    let port = spawn_server(routes).await;

    let err = fetch_raw(
        &format!("http://127.0.0.1:{port}/a"),
        ACCEPT_HTML,
        &test_config(),
    )
    .await
    .expect_err("A -> B -> A should be detected as a loop");

    // the loop trips before the hop ceiling would
    assert!(matches!(err, FetchError::RedirectLoop(_)));
}

#[tokio::test]
async fn redirect_without_location_is_terminal() {
    let mut routes = HashMap::new();
    routes.insert(
        "/odd".to_string(),
        "HTTP/1.1 302 Found\r\nContent-Type: text/html\r\n\r\n<p>Stopped right here</p>"
            .to_string(),
    );
    let port = spawn_server(routes).await;

    let response = fetch_raw(
        &format!("http://127.0.0.1:{port}/odd"),
        ACCEPT_HTML,
        &test_config(),
    )
    .await
    .expect("redirect status without Location is returned as-is");

    assert_eq!(response.status_code(), Some(302));
    assert_eq!(extract_text(&response), "Stopped right here.");
}

#[tokio::test]
async fn relative_location_resolves_against_base_directory() {
    let mut routes = HashMap::new();
    routes.insert("/docs/start".to_string(), redirect(301, "next"));
    routes.insert("/docs/next".to_string(), ok_html("<p>Sibling page reached</p>"));
    let port = spawn_server(routes).await;

    let response = fetch_raw(
        &format!("http://127.0.0.1:{port}/docs/start"),
        ACCEPT_HTML,
        &test_config(),
    )
    .await
    .expect("sibling-relative Location should resolve");

    assert_eq!(extract_text(&response), "Sibling page reached.");
}

#[tokio::test]
async fn non_success_statuses_are_returned_as_is() {
    let port = spawn_server(HashMap::new()).await;

    let response = fetch_raw(
        &format!("http://127.0.0.1:{port}/missing"),
        ACCEPT_HTML,
        &test_config(),
    )
    .await
    .expect("a 404 is a terminal response, not an error");

    assert_eq!(response.status_code(), Some(404));
    assert_eq!(extract_text(&response), "Nothing at this path.");
}

#[tokio::test]
async fn json_body_passes_through_unreduced() {
    let mut routes = HashMap::new();
    routes.insert("/data".to_string(), ok_json("{\"a\":1}"));
    let port = spawn_server(routes).await;

    let response = fetch_raw(
        &format!("http://127.0.0.1:{port}/data"),
        ACCEPT_HTML,
        &test_config(),
    )
    .await
    .expect("json fetch should succeed");

    assert_eq!(response.content_type().as_deref(), Some("application/json"));
    assert_eq!(extract_text(&response), "{\"a\":1}");
}

#[tokio::test]
async fn malformed_response_yields_sentinel_text() {
    let mut routes = HashMap::new();
    routes.insert(
        "/broken".to_string(),
        "HTTP/1.1 200 OK\nno crlf boundary in sight".to_string(),
    );
    let port = spawn_server(routes).await;

    let response = fetch_raw(
        &format!("http://127.0.0.1:{port}/broken"),
        ACCEPT_HTML,
        &test_config(),
    )
    .await
    .expect("a malformed response is still returned");

    assert_eq!(extract_text(&response), "Invalid response format");
}

#[tokio::test]
async fn stalled_server_surfaces_read_timeout() {
    let port = spawn_stalling_server().await;

    let config = Config {
        timeout_seconds: 1,
        ..Default::default()
    };
    let err = fetch_raw(&format!("http://127.0.0.1:{port}/slow"), ACCEPT_HTML, &config)
        .await
        .expect_err("a silent server must time out");

    assert!(matches!(
        err,
        FetchError::Transport(TransportError::ReadTimeout { .. })
    ));
}

#[tokio::test]
async fn fetch_page_reduces_caches_and_reuses() {
    let mut routes = HashMap::new();
    routes.insert(
        "/article".to_string(),
        ok_html(
            "<!DOCTYPE html><html><head><title>t</title></head><body>\
             <nav><a href=\"/\">Home</a></nav>\
             <p>The cached article text</p>\
             <footer>fine print</footer></body></html>",
        ),
    );
    let port = spawn_server(routes).await;
    let url = format!("http://127.0.0.1:{port}/article");

    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        timeout_seconds: 5,
        cache_path: dir.path().join("cache.txt"),
        ..Default::default()
    };

    let mut cache = TextCache::load(&config.cache_path).expect("empty cache loads");
    let first = fetch_page(&url, &config, &mut cache).await.expect("fetch");
    assert!(!first.from_cache);
    assert_eq!(first.text, "The cached article text.");

    // second call is served from the cache, and a fresh load from disk
    // sees the persisted entry
    let second = fetch_page(&url, &config, &mut cache).await.expect("fetch");
    assert!(second.from_cache);
    assert_eq!(second.text, first.text);

    let reloaded = TextCache::load(&config.cache_path).expect("reload");
    assert_eq!(reloaded.get(&url), Some(first.text.as_str()));
}

#[tokio::test]
async fn json_content_type_triggers_accept_renegotiation() {
    // the server echoes which Accept header it saw, proving the second
    // request asked for JSON explicitly
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let accept = request
                    .lines()
                    .find_map(|line| line.strip_prefix("Accept: "))
                    .unwrap_or("")
                    .to_string();
                let body = format!("{{\"accept\":\"{accept}\"}}");
                let _ = socket.write_all(ok_json(&body).as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        timeout_seconds: 5,
        cache_path: dir.path().join("cache.txt"),
        ..Default::default()
    };
    let mut cache = TextCache::load(&config.cache_path).expect("cache");

    let outcome = fetch_page(&format!("http://127.0.0.1:{port}/api"), &config, &mut cache)
        .await
        .expect("fetch");

    assert_eq!(outcome.text, "{\"accept\":\"application/json\"}");
}
