//! # mm
//!
//! Per-request conditional middleware for async HTTP services.
//!
//! ## The contract
//!
//! Middleware usually applies to everything or to a route. mm lets each
//! middleware source decide for itself, request by request, whether it
//! applies at all. A [`Provider`] looks at the request and answers with a
//! [`Decision`]: [`Skip`](Decision::Skip) or [`Apply`](Decision::Apply) with
//! a [`Middleware`]. The [`Dispatcher`] asks every provider in registration
//! order and wraps the handler with the ones that said yes:
//!
//! - the **first-registered** provider is the **outermost** layer;
//! - a provider that skips leaves **no trace** on that request;
//! - decisions are made **per request**, never cached.
//!
//! mm ships no concrete middleware, router, or TLS. A small hyper-based
//! [`Server`] is included to serve the composed handler.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::{Method, header::HeaderValue};
//! use mm::{Dispatcher, Middleware, Next, Request, Response, Server, provider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tag = Middleware::from_fn(|req: Request, next: Next| async move {
//!         let mut res = next.run(req).await;
//!         res.headers_mut().insert("x-test", HeaderValue::from_static("test"));
//!         res
//!     });
//!
//!     let app = Dispatcher::new()
//!         .provider(provider::when(|req: &Request| req.method() == Method::GET, tag))
//!         .handler(hello);
//!
//!     Server::bind("0.0.0.0:3000").unwrap().serve(app).await.unwrap();
//! }
//!
//! async fn hello(_req: Request) -> Response {
//!     Response::text("Hello")
//! }
//! ```

mod dispatcher;
mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod middleware;
pub mod provider;

pub use dispatcher::Dispatcher;
pub use error::Error;
pub use handler::{Handler, Next};
pub use middleware::Middleware;
pub use provider::{Decision, Provider};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use server::Server;
