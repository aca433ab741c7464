//! Per-request middleware composition.
//!
//! A [`Dispatcher`] holds an ordered list of providers. For every request it
//! asks each provider, in registration order, whether it wants to wrap the
//! handler, then builds the chain from the ones that said yes:
//!
//! ```text
//! providers   P1      P2      P3
//! decision    Apply   Skip    Apply
//! chain       P1( P3( terminal ) )
//! ```
//!
//! The first-registered provider is always the outermost layer. It sees the
//! request first and the response last. A provider that skips leaves no trace.
//! Decisions are never cached: every request is asked about afresh.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::handler::{Handler, Next};
use crate::middleware::Middleware;
use crate::provider::{BoxedProvider, Decision, Provider};
use crate::request::Request;
use crate::response::Response;

/// Ordered registry of providers and the engine that composes them.
///
/// Build it once at startup, then turn it into a handler with
/// [`Dispatcher::handler`] or into a middleware with
/// [`Dispatcher::into_middleware`]. Each [`Dispatcher::provider`] call returns
/// `self` so registrations chain naturally.
///
/// ```rust
/// use http::{Method, header::HeaderValue};
/// use mm::{Dispatcher, Middleware, Next, Request, Response, provider};
///
/// let tag = Middleware::from_fn(|req: Request, next: Next| async move {
///     let mut res = next.run(req).await;
///     res.headers_mut().insert("x-test", HeaderValue::from_static("test"));
///     res
/// });
///
/// let app = Dispatcher::new()
///     .provider(provider::when(|req: &Request| req.method() == Method::GET, tag))
///     .handler(|_req: Request| async { Response::text("Hello") });
/// ```
#[derive(Default)]
pub struct Dispatcher {
    providers: Vec<BoxedProvider>,
}

impl Dispatcher {
    /// A dispatcher with no providers: every request goes straight to the
    /// terminal handler.
    pub fn new() -> Self {
        Self { providers: Vec::new() }
    }

    /// Registers a provider after all previously registered ones.
    pub fn provider(mut self, provider: impl Provider) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize { self.providers.len() }
    pub fn is_empty(&self) -> bool { self.providers.is_empty() }

    /// Runs one request through the providers and the resulting chain,
    /// ending at `terminal`.
    pub async fn handle(&self, req: Request, terminal: Next) -> Response {
        compose(&self.providers, &req, terminal).run(req).await
    }

    /// Freezes the registry and returns a handler that composes the chain
    /// around `terminal` on every request.
    ///
    /// The returned handler is cheap to clone and keeps no state between
    /// requests.
    pub fn handler(self, terminal: impl Handler) -> Next {
        self.into_middleware().wrap(Next::new(terminal))
    }

    /// Freezes the registry into a single [`Middleware`], so a whole
    /// dispatcher can be applied wherever a middleware is expected,
    /// including inside another provider's decision.
    pub fn into_middleware(self) -> Middleware {
        let providers: Arc<[BoxedProvider]> = self.providers.into();
        Middleware::new(move |terminal: Next| {
            let providers = Arc::clone(&providers);
            Next::new(move |req: Request| {
                let chain = compose(&providers, &req, terminal.clone());
                chain.run(req)
            })
        })
    }
}

impl FromIterator<BoxedProvider> for Dispatcher {
    fn from_iter<I: IntoIterator<Item = BoxedProvider>>(iter: I) -> Self {
        Self { providers: iter.into_iter().collect() }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}

/// Builds the chain for one request.
///
/// Providers are asked in registration order, each exactly once. The
/// accepted middleware is then applied innermost-first, so the
/// first-registered one ends up outermost.
fn compose(providers: &[BoxedProvider], req: &Request, terminal: Next) -> Next {
    let applied: Vec<(usize, &'static str, Middleware)> = providers
        .iter()
        .enumerate()
        .filter_map(|(layer, p)| match p.middleware(req) {
            Decision::Apply(mw) => Some((layer, p.name(), mw)),
            Decision::Skip      => None,
        })
        .collect();

    debug!(
        method = %req.method(),
        path = req.path(),
        applied = applied.len(),
        "middleware chain composed"
    );

    applied.into_iter().rev().fold(terminal, |next, (layer, name, mw)| {
        trace!(layer, provider = name, "applying middleware");
        mw.wrap(next)
    })
}
