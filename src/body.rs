//! Request body materialization.
//!
//! The only stage that waits on I/O: the body stream is drained into
//! memory, then the continuation runs with the buffer. Stream errors and an
//! exceeded size limit surface as `PipeError::Body`, never as a non-match.

use std::sync::Arc;

use axum::body::Bytes;

use crate::context::Context;
use crate::error::PipeError;
use crate::pipe::{Pipe, PipeFuture};

/// Materializer built by [`body`] and [`text`].
pub struct Materialize<F> {
    next: Arc<F>,
}

/// Buffer the request body, then hand it to `next`.
pub fn body<F, P>(next: F) -> Materialize<F>
where
    F: Fn(Bytes) -> P + Send + Sync + 'static,
    P: Pipe,
{
    Materialize { next: Arc::new(next) }
}

impl<F, P> Pipe for Materialize<F>
where
    F: Fn(Bytes) -> P + Send + Sync + 'static,
    P: Pipe,
{
    fn call(&self, ctx: Context) -> PipeFuture {
        let next = Arc::clone(&self.next);
        Box::pin(async move {
            let bytes = ctx.read_body().await?;
            next(bytes).call(ctx).await
        })
    }
}

/// Buffer the request body as UTF-8 text, then hand it to `next`.
pub fn text<F, P>(next: F) -> impl Pipe
where
    F: Fn(String) -> P + Send + Sync + 'static,
    P: Pipe,
{
    let next = Arc::new(next);
    body(move |bytes: Bytes| {
        let next = Arc::clone(&next);
        TextStage { bytes, next }
    })
}

struct TextStage<F> {
    bytes: Bytes,
    next: Arc<F>,
}

impl<F, P> Pipe for TextStage<F>
where
    F: Fn(String) -> P + Send + Sync + 'static,
    P: Pipe,
{
    fn call(&self, ctx: Context) -> PipeFuture {
        match std::str::from_utf8(&self.bytes) {
            Ok(text) => (self.next)(text.to_string()).call(ctx),
            Err(e) => {
                let err = PipeError::from(e);
                Box::pin(async move { Err(err) })
            }
        }
    }
}
