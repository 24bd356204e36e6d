//! Primitive operators: `always`, `never`, `compose`, `choose`.

use std::sync::Arc;

use crate::context::Context;
use crate::pipe::{BoxPipe, Outcome, Pipe, PipeFuture};

/// Matches immediately, with no side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

/// Declines immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

pub fn always() -> Always {
    Always
}

pub fn never() -> Never {
    Never
}

impl Pipe for Always {
    fn call(&self, ctx: Context) -> PipeFuture {
        Box::pin(async move { Ok(Outcome::Matched(ctx)) })
    }
}

impl Pipe for Never {
    fn call(&self, _ctx: Context) -> PipeFuture {
        Box::pin(async { Ok(Outcome::NotMatched) })
    }
}

/// Sequential AND of two pipes. See [`compose`].
pub struct Compose<A, B> {
    first: Arc<A>,
    second: Arc<B>,
}

/// Run `first`; run `second` on its context only if `first` matched.
///
/// `second` is never invoked, and none of its side effects happen, when
/// `first` declines or fails.
pub fn compose<A: Pipe, B: Pipe>(first: A, second: B) -> Compose<A, B> {
    Compose {
        first: Arc::new(first),
        second: Arc::new(second),
    }
}

impl<A: Pipe, B: Pipe> Pipe for Compose<A, B> {
    fn call(&self, ctx: Context) -> PipeFuture {
        let first = self.first.call(ctx);
        let second = Arc::clone(&self.second);
        Box::pin(async move {
            match first.await? {
                Outcome::Matched(ctx) => second.call(ctx).await,
                Outcome::NotMatched => Ok(Outcome::NotMatched),
            }
        })
    }
}

impl<A, B> Clone for Compose<A, B> {
    fn clone(&self) -> Self {
        Self {
            first: Arc::clone(&self.first),
            second: Arc::clone(&self.second),
        }
    }
}

/// Ordered alternation. See [`choose`].
#[derive(Clone)]
pub struct Choose {
    alternatives: Arc<[BoxPipe]>,
}

/// Try each pipe in order; the first match wins.
///
/// An alternative runs only after every earlier one declined. An empty list
/// behaves as [`never`]. A failure stops the search.
pub fn choose(alternatives: Vec<BoxPipe>) -> Choose {
    Choose {
        alternatives: alternatives.into(),
    }
}

impl Pipe for Choose {
    fn call(&self, ctx: Context) -> PipeFuture {
        let alternatives = Arc::clone(&self.alternatives);
        Box::pin(async move {
            for (index, alternative) in alternatives.iter().enumerate() {
                if let Outcome::Matched(ctx) = alternative.call(ctx.clone()).await? {
                    tracing::trace!(request_id = %ctx.request_id(), index, "Alternative matched");
                    return Ok(Outcome::Matched(ctx));
                }
            }
            Ok(Outcome::NotMatched)
        })
    }
}

impl std::fmt::Debug for Choose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Choose")
            .field("alternatives", &self.alternatives.len())
            .finish()
    }
}
