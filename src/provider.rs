//! Middleware providers.
//!
//! A [`Provider`] looks at each request and answers one question: do you want
//! to wrap the handler for *this* request? The answer is a [`Decision`].
//!
//! Any `Fn(&Request) -> Decision` closure is a provider, and the helpers in
//! this module cover the usual shapes:
//!
//! ```rust
//! use http::Method;
//! use mm::{Middleware, Request, provider};
//!
//! # let mw = Middleware::identity();
//! let on_get = provider::when(|req: &Request| req.method() == Method::GET, mw.clone());
//! let everywhere = provider::always(mw);
//! ```

use crate::middleware::Middleware;
use crate::request::Request;

/// A provider's answer for one request.
#[derive(Clone, Debug)]
pub enum Decision {
    /// Not applicable: the provider leaves no trace on this request.
    Skip,
    /// Applicable: wrap the handler with this middleware.
    Apply(Middleware),
}

impl Decision {
    pub fn is_apply(&self) -> bool {
        matches!(self, Self::Apply(_))
    }
}

impl From<Option<Middleware>> for Decision {
    fn from(mw: Option<Middleware>) -> Self {
        match mw {
            Some(mw) => Self::Apply(mw),
            None     => Self::Skip,
        }
    }
}

/// Decides, per request, whether to contribute a middleware.
///
/// Providers are called once per request, in registration order, possibly
/// from many requests at the same time. Keep `middleware` cheap and free of
/// side effects the dispatcher would have to know about.
pub trait Provider: Send + Sync + 'static {
    fn middleware(&self, req: &Request) -> Decision;

    /// Label used in trace logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Owned, type-erased provider as stored by the dispatcher.
pub type BoxedProvider = Box<dyn Provider>;

impl<F> Provider for F
where
    F: Fn(&Request) -> Decision + Send + Sync + 'static,
{
    fn middleware(&self, req: &Request) -> Decision {
        self(req)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Opts in for every request.
pub fn always(mw: Middleware) -> When<impl Fn(&Request) -> bool + Send + Sync + 'static> {
    When { predicate: |_: &Request| true, mw, name: "always" }
}

/// Never opts in.
pub fn never() -> impl Provider {
    |_: &Request| Decision::Skip
}

/// Opts in whenever `predicate` holds for the request.
pub fn when<P>(predicate: P, mw: Middleware) -> When<P>
where
    P: Fn(&Request) -> bool + Send + Sync + 'static,
{
    When { predicate, mw, name: std::any::type_name::<P>() }
}

/// Provider returned by [`when`] and [`always`].
///
/// Named after its predicate's type (for closures, the function that defines
/// them), or `"always"`.
pub struct When<P> {
    predicate: P,
    mw: Middleware,
    name: &'static str,
}

impl<P> Provider for When<P>
where
    P: Fn(&Request) -> bool + Send + Sync + 'static,
{
    fn middleware(&self, req: &Request) -> Decision {
        if (self.predicate)(req) {
            Decision::Apply(self.mw.clone())
        } else {
            Decision::Skip
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
