//! Wrap functions.
//!
//! A [`Middleware`] is a decorator: it takes the [`Next`] handler it should
//! delegate to and returns the handler that replaces it. It can act before
//! delegating (inspect or rewrite the request), after delegating (edit the
//! response), or instead of delegating (short-circuit).
//!
//! mm ships no concrete middleware. Build your own with [`Middleware::from_fn`]
//! for the common "around" shape, or [`Middleware::new`] when you need the
//! full decorator:
//!
//! ```rust
//! use http::header::HeaderValue;
//! use mm::{Middleware, Next, Request};
//!
//! let tag = Middleware::from_fn(|req: Request, next: Next| async move {
//!     let mut res = next.run(req).await;
//!     res.headers_mut().insert("x-test", HeaderValue::from_static("test"));
//!     res
//! });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::handler::Next;
use crate::request::Request;
use crate::response::IntoResponse;

type WrapFn = dyn Fn(Next) -> Next + Send + Sync + 'static;

/// A handler-to-handler transformation.
///
/// Cheap to clone, so a provider can build its middleware once and hand out
/// clones from every decision.
#[derive(Clone)]
pub struct Middleware(Arc<WrapFn>);

impl Middleware {
    /// Decorator form: `wrap` receives the inner handler and returns the
    /// handler that replaces it.
    pub fn new<F>(wrap: F) -> Self
    where
        F: Fn(Next) -> Next + Send + Sync + 'static,
    {
        Self(Arc::new(wrap))
    }

    /// Around form: `f` is called for every request with the request and the
    /// inner handler, and decides if and how to delegate.
    pub fn from_fn<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |next: Next| {
            let f = Arc::clone(&f);
            Next::new(move |req: Request| (*f)(req, next.clone()))
        })
    }

    /// Leaves the handler untouched.
    pub fn identity() -> Self {
        Self::new(|next| next)
    }

    /// Applies the transformation to `next`.
    pub fn wrap(&self, next: Next) -> Next {
        (self.0)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}
