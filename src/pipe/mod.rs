//! The pipe abstraction and its composition algebra.
//!
//! # Data Flow
//! ```text
//! Context
//!     → pipe.call(ctx)
//!     → Ok(Matched(ctx))   continue with the next stage
//!     → Ok(NotMatched)     try the next alternative, or fall through to the host
//!     → Err(PipeError)     abort; the host's error path takes over
//! ```
//!
//! # Design Decisions
//! - Futures are boxed and `'static`; pipes hold their captured state in `Arc`s
//! - `NotMatched` is a variant, not a sentinel value compared by identity
//! - `always` and `never` are the identities of `compose` and `choose`

pub mod algebra;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::PipeError;

pub use algebra::{always, choose, compose, never, Always, Choose, Compose, Never};

/// Outcome of a pipe that did not fail.
#[derive(Debug)]
pub enum Outcome {
    /// The pipe handled the exchange; later stages receive the context.
    Matched(Context),
    /// The pipe declines the exchange.
    NotMatched,
}

impl Outcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, Outcome::Matched(_))
    }

    /// The carried context, if matched.
    pub fn into_context(self) -> Option<Context> {
        match self {
            Outcome::Matched(ctx) => Some(ctx),
            Outcome::NotMatched => None,
        }
    }
}

/// What every pipe resolves to.
pub type PipeResult = Result<Outcome, PipeError>;

/// Boxed future returned by [`Pipe::call`].
pub type PipeFuture = Pin<Box<dyn Future<Output = PipeResult> + Send + 'static>>;

/// Shared, type-erased pipe.
pub type BoxPipe = Arc<dyn Pipe>;

/// An asynchronous function from [`Context`] to [`Outcome`].
pub trait Pipe: Send + Sync + 'static {
    fn call(&self, ctx: Context) -> PipeFuture;
}

impl<P: Pipe + ?Sized> Pipe for Arc<P> {
    fn call(&self, ctx: Context) -> PipeFuture {
        (**self).call(ctx)
    }
}

impl<P: Pipe + ?Sized> Pipe for Box<P> {
    fn call(&self, ctx: Context) -> PipeFuture {
        (**self).call(ctx)
    }
}

/// Pipe built from an async closure. See [`pipe_fn`].
#[derive(Clone)]
pub struct PipeFn<F> {
    f: F,
}

/// Lift an async closure into a pipe.
///
/// ```
/// use http_pipes::{pipe_fn, Context, Outcome, PipeResult};
///
/// let tag = pipe_fn(|ctx: Context| async move {
///     ctx.write(b"seen");
///     PipeResult::Ok(Outcome::Matched(ctx))
/// });
/// # let _ = tag;
/// ```
pub fn pipe_fn<F, Fut>(f: F) -> PipeFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PipeResult> + Send + 'static,
{
    PipeFn { f }
}

impl<F, Fut> Pipe for PipeFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PipeResult> + Send + 'static,
{
    fn call(&self, ctx: Context) -> PipeFuture {
        Box::pin((self.f)(ctx))
    }
}

impl<F> std::fmt::Debug for PipeFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PipeFn")
    }
}

/// Combinator methods available on every pipe.
pub trait PipeExt: Pipe + Sized {
    /// Run `next` only if `self` matched.
    fn and_then<B: Pipe>(self, next: B) -> Compose<Self, B> {
        compose(self, next)
    }

    /// Try `alternative` only if `self` declined.
    fn or_else<B: Pipe>(self, alternative: B) -> Choose {
        choose(vec![self.boxed(), alternative.boxed()])
    }

    fn boxed(self) -> BoxPipe {
        Arc::new(self)
    }
}

impl<P: Pipe> PipeExt for P {}

/// Sequence any number of pipes, left to right.
///
/// `compose!(a, b, c)` is `compose(compose(a, b), c)`.
#[macro_export]
macro_rules! compose {
    (@fold $acc:expr; $next:expr) => {
        $crate::pipe::compose($acc, $next)
    };
    (@fold $acc:expr; $next:expr, $($rest:expr),+) => {
        $crate::compose!(@fold $crate::pipe::compose($acc, $next); $($rest),+)
    };
    ($only:expr $(,)?) => { $only };
    ($first:expr, $($rest:expr),+ $(,)?) => {
        $crate::compose!(@fold $first; $($rest),+)
    };
}

/// Ordered alternation over any number of pipes.
///
/// `choose!(a, b, c)` is `choose(vec![a.boxed(), b.boxed(), c.boxed()])`.
#[macro_export]
macro_rules! choose {
    ($($alt:expr),* $(,)?) => {
        $crate::pipe::choose(vec![$($crate::pipe::PipeExt::boxed($alt)),*])
    };
}
