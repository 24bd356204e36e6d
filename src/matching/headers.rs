//! Header matchers.

use axum::http::HeaderMap;

use crate::context::{Context, FieldValue};
use crate::matching::{Extract, Guard};
use crate::pipe::Pipe;

/// Hand the full request header collection to `next`.
pub fn headers<F, P>(next: F) -> impl Pipe
where
    F: Fn(HeaderMap) -> P + Send + Sync + 'static,
    P: Pipe,
{
    Extract::new(|ctx: &Context| Ok(ctx.headers().clone()), next)
}

/// Hand one request header to `next`; the name is case-insensitive.
pub fn header<F, P>(name: impl Into<String>, next: F) -> impl Pipe
where
    F: Fn(Option<FieldValue>) -> P + Send + Sync + 'static,
    P: Pipe,
{
    let name = name.into();
    Extract::new(move |ctx: &Context| Ok(ctx.header(&name)), next)
}

/// Run `pipe` only when the header is present with exactly `value`.
pub fn if_header<P: Pipe>(name: impl Into<String>, value: impl Into<String>, pipe: P) -> impl Pipe {
    let name = name.into();
    let value = value.into();
    Guard::new(
        move |ctx: &Context| Ok(ctx.header(&name).is_some_and(|v| v.as_slice() == [value.as_str()])),
        pipe,
    )
}
