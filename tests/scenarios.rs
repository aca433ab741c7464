//! End-to-end tests: a real `Server` on loopback, raw HTTP/1.1 requests.
//!
//! Every case serves a terminal handler that answers `200 Hello` and checks
//! what the composed chain turned it into.

use std::collections::BTreeMap;
use std::time::Duration;

use http::Method;
use http::header::HeaderValue;
use mm::{Decision, Dispatcher, Middleware, Next, Request, Response, Server, provider};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

// ── Harness ───────────────────────────────────────────────────────────────────

struct Reply {
    status: u16,
    headers: BTreeMap<String, String>,
    body: String,
}

/// Serves `app` on an ephemeral port, sends one request, shuts down.
async fn roundtrip(app: Next, method: &str, path: &str) -> Reply {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(app, async {
            let _ = stopped.await;
        }),
    );

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!("{method} {path} HTTP/1.1\r\nhost: {addr}\r\nconnection: close\r\n\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();

    parse(&String::from_utf8(raw).unwrap())
}

fn parse(raw: &str) -> Reply {
    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let mut lines = head.split("\r\n");
    let status = lines.next().unwrap().split(' ').nth(1).unwrap().parse().unwrap();

    let headers = lines
        .map(|line| line.split_once(':').unwrap())
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_owned()))
        // Transport headers added by hyper.
        .filter(|(k, _)| k != "date" && k != "content-length" && k != "connection")
        .collect();

    Reply { status, headers, body: body.to_owned() }
}

fn app(dispatcher: Dispatcher) -> Next {
    dispatcher.handler(|_req: Request| async { Response::text("Hello") })
}

fn plain() -> BTreeMap<String, String> {
    BTreeMap::from([("content-type".to_owned(), "text/plain; charset=utf-8".to_owned())])
}

fn with_test_header() -> BTreeMap<String, String> {
    let mut headers = plain();
    headers.insert("x-test".to_owned(), "test".to_owned());
    headers
}

// ── Middleware under test ─────────────────────────────────────────────────────

/// Sets `x-test: test` on every response it wraps.
fn test_header() -> Middleware {
    Middleware::from_fn(|req: Request, next: Next| async move {
        let mut res = next.run(req).await;
        res.headers_mut().insert("x-test", HeaderValue::from_static("test"));
        res
    })
}

/// Runs the inner handler, discards its output, answers `200 Rewrited!`.
fn rewrite() -> Middleware {
    Middleware::from_fn(|req: Request, next: Next| async move {
        let _ = next.run(req).await;
        Response::text("Rewrited!")
    })
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn no_middleware() {
    let reply = roundtrip(app(Dispatcher::new()), "GET", "/").await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.headers, plain());
    assert_eq!(reply.body, "Hello");
}

#[tokio::test]
async fn header_on_all_requests() {
    let dispatcher = Dispatcher::new().provider(provider::always(test_header()));
    let reply = roundtrip(app(dispatcher), "GET", "/").await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.headers, with_test_header());
    assert_eq!(reply.body, "Hello");
}

#[tokio::test]
async fn rewrite_on_all_requests() {
    let dispatcher = Dispatcher::new().provider(provider::always(rewrite()));
    let reply = roundtrip(app(dispatcher), "GET", "/").await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.headers, plain());
    assert_eq!(reply.body, "Rewrited!");
}

#[tokio::test]
async fn header_only_on_head_skips_get() {
    let dispatcher = Dispatcher::new().provider(|req: &Request| {
        if req.method() != Method::HEAD {
            return Decision::Skip;
        }
        Decision::Apply(test_header())
    });
    let reply = roundtrip(app(dispatcher), "GET", "/").await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.headers, plain());
    assert_eq!(reply.body, "Hello");
}

#[tokio::test]
async fn header_only_on_get() {
    let only_get = || provider::when(|req: &Request| req.method() == Method::GET, test_header());

    let reply = roundtrip(app(Dispatcher::new().provider(only_get())), "HEAD", "/").await;
    assert_eq!(reply.status, 200);
    assert!(!reply.headers.contains_key("x-test"));
    assert_eq!(reply.body, "");

    let reply = roundtrip(app(Dispatcher::new().provider(only_get())), "GET", "/").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.headers, with_test_header());
    assert_eq!(reply.body, "Hello");
}

#[tokio::test]
async fn one_server_many_requests() {
    let app = app(
        Dispatcher::new()
            .provider(provider::when(|req: &Request| req.path() == "/rewrite", rewrite()))
            .provider(provider::always(test_header())),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(app, async {
            let _ = stopped.await;
        }),
    );

    let mut replies = Vec::new();
    for path in ["/", "/rewrite", "/"] {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let head = format!("GET {path} HTTP/1.1\r\nhost: {addr}\r\nconnection: close\r\n\r\n");
        stream.write_all(head.as_bytes()).await.unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        replies.push(parse(&String::from_utf8(raw).unwrap()));
    }

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();

    let bodies: Vec<_> = replies.iter().map(|r| r.body.as_str()).collect();
    assert_eq!(bodies, ["Hello", "Rewrited!", "Hello"]);
    // The rewrite layer is outermost, so it drops the inner header.
    assert!(replies[0].headers.contains_key("x-test"));
    assert!(!replies[1].headers.contains_key("x-test"));
    assert!(replies[2].headers.contains_key("x-test"));
}

#[tokio::test]
async fn shutdown_closes_idle_keep_alive_connections() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(app(Dispatcher::new()), async {
            let _ = stopped.await;
        }),
    );

    // No `connection: close`: the connection stays open after the response.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!("GET / HTTP/1.1\r\nhost: {addr}\r\n\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    while !raw.ends_with(b"Hello") {
        let n = stream.read(&mut buf).await.unwrap();
        assert_ne!(n, 0, "connection closed before the response was complete");
        raw.extend_from_slice(&buf[..n]);
    }

    stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(3), server)
        .await
        .expect("server did not stop with an idle connection open")
        .unwrap()
        .unwrap();

    // The server closed its end.
    assert_eq!(stream.read(&mut buf).await.unwrap(), 0);
}

#[test]
fn bind_rejects_bad_address() {
    assert!(Server::bind("not an address").is_err());
    assert!(Server::bind("127.0.0.1:0").is_ok());
}
