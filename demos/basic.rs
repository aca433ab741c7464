//! Minimal mm example: three providers, each deciding per request.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/              # x-served-by only
//!   curl -i -X HEAD http://localhost:3000/      # no x-served-by
//!   curl -i http://localhost:3000/maintenance   # 503, handler never runs
//!   curl -i -H 'x-debug: 1' http://localhost:3000/

use std::time::Instant;

use http::header::HeaderValue;
use http::{Method, StatusCode};
use mm::{Decision, Dispatcher, Middleware, Next, Request, Response, Server, provider};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let app = Dispatcher::new()
        // Outermost: sees every request first, and every response last.
        .provider(debug_timing)
        .provider(provider::when(|req: &Request| req.path() == "/maintenance", maintenance()))
        .provider(provider::when(|req: &Request| req.method() == Method::GET, served_by()))
        .handler(hello);

    Server::bind("0.0.0.0:3000")
        .expect("valid address")
        .serve(app)
        .await
        .expect("server error");
}

async fn hello(req: Request) -> Response {
    Response::text(format!("Hello from {}", req.path()))
}

// Only opts in when the client asks for it.
fn debug_timing(req: &Request) -> Decision {
    if req.header("x-debug").is_none() {
        return Decision::Skip;
    }
    Decision::Apply(Middleware::from_fn(|req: Request, next: Next| async move {
        let started = Instant::now();
        let mut res = next.run(req).await;
        let elapsed = format!("{}us", started.elapsed().as_micros());
        if let Ok(value) = HeaderValue::from_str(&elapsed) {
            res.headers_mut().insert("x-elapsed", value);
        }
        res
    }))
}

// Short-circuits: the inner handler is never called.
fn maintenance() -> Middleware {
    Middleware::new(|_next| {
        Next::new(|_req: Request| async {
            Response::builder()
                .status(StatusCode::SERVICE_UNAVAILABLE)
                .text("down for maintenance")
        })
    })
}

fn served_by() -> Middleware {
    Middleware::from_fn(|req: Request, next: Next| async move {
        let mut res = next.run(req).await;
        res.headers_mut().insert("x-served-by", HeaderValue::from_static("mm"));
        res
    })
}
