//! Request matchers.
//!
//! # Data Flow
//! ```text
//! Context (request view)
//!     → extract one facet (method, path, query, headers, version)
//!     → continuation(facet) builds the next pipe
//!     → next pipe runs on the same context
//!
//! Exact-match variants:
//!     facet == literal → wrapped pipe
//!     otherwise        → NotMatched
//! ```
//!
//! # Design Decisions
//! - Matchers are synchronous projections of request metadata; only the
//!   body materializer waits on I/O
//! - Path patterns compile once, when the matcher is built
//! - Decoding failures are errors, never non-matches

pub mod headers;
pub mod method;
pub mod path;
pub mod pattern;
pub mod query;
pub mod version;

use std::marker::PhantomData;
use std::sync::Arc;

use crate::context::Context;
use crate::error::PipeError;
use crate::pipe::{Outcome, Pipe, PipeFuture};

pub use headers::{header, headers, if_header};
pub use method::{connect, delete, get, head, if_method, method, options, other, patch, post, put, trace};
pub use path::{if_path, path, path_with, url};
pub use pattern::{PathPattern, PatternOptions};
pub use query::{query, query_param};
pub use version::{if_version, version};

/// Projects a facet of the context and hands it to a continuation.
pub struct Extract<X, F, T> {
    extract: X,
    next: F,
    _facet: PhantomData<fn() -> T>,
}

impl<X, F, T, P> Extract<X, F, T>
where
    X: Fn(&Context) -> Result<T, PipeError> + Send + Sync + 'static,
    F: Fn(T) -> P + Send + Sync + 'static,
    P: Pipe,
{
    pub fn new(extract: X, next: F) -> Self {
        Self {
            extract,
            next,
            _facet: PhantomData,
        }
    }
}

impl<X, F, T, P> Pipe for Extract<X, F, T>
where
    X: Fn(&Context) -> Result<T, PipeError> + Send + Sync + 'static,
    F: Fn(T) -> P + Send + Sync + 'static,
    P: Pipe,
    T: 'static,
{
    fn call(&self, ctx: Context) -> PipeFuture {
        match (self.extract)(&ctx) {
            Ok(facet) => (self.next)(facet).call(ctx),
            Err(e) => Box::pin(async move { Err(e) }),
        }
    }
}

/// Runs the wrapped pipe only when a test on the context passes.
pub struct Guard<X, P> {
    test: X,
    pipe: Arc<P>,
}

impl<X, P> Guard<X, P>
where
    X: Fn(&Context) -> Result<bool, PipeError> + Send + Sync + 'static,
    P: Pipe,
{
    pub fn new(test: X, pipe: P) -> Self {
        Self {
            test,
            pipe: Arc::new(pipe),
        }
    }
}

impl<X, P> Pipe for Guard<X, P>
where
    X: Fn(&Context) -> Result<bool, PipeError> + Send + Sync + 'static,
    P: Pipe,
{
    fn call(&self, ctx: Context) -> PipeFuture {
        match (self.test)(&ctx) {
            Ok(true) => self.pipe.call(ctx),
            Ok(false) => Box::pin(async { Ok(Outcome::NotMatched) }),
            Err(e) => Box::pin(async move { Err(e) }),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::Request;

    use crate::context::Context;
    use crate::pipe::{Outcome, Pipe};

    pub fn request(method: &str, uri: &str) -> Context {
        Context::new(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
    }

    /// Run the pipe and return the body it wrote, `None` on no-match.
    pub async fn body_of(pipe: &impl Pipe, ctx: Context) -> Option<String> {
        match pipe.call(ctx).await.unwrap() {
            Outcome::Matched(ctx) => Some(String::from_utf8(ctx.response_body().to_vec()).unwrap()),
            Outcome::NotMatched => None,
        }
    }
}
