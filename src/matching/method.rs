//! Method matchers.

use axum::http::Method;

use crate::context::Context;
use crate::matching::{Extract, Guard};
use crate::pipe::Pipe;

/// Hand the request method to `next`.
pub fn method<F, P>(next: F) -> impl Pipe
where
    F: Fn(Method) -> P + Send + Sync + 'static,
    P: Pipe,
{
    Extract::new(|ctx: &Context| Ok(ctx.method().clone()), next)
}

/// Run `pipe` only when the method equals `expected` (case-sensitive).
pub fn if_method<P: Pipe>(expected: impl AsRef<str>, pipe: P) -> impl Pipe {
    let expected = expected.as_ref().to_string();
    Guard::new(move |ctx: &Context| Ok(ctx.method().as_str() == expected), pipe)
}

/// Exact match on a non-standard verb, e.g. `other("PURGE", pipe)`.
pub fn other<P: Pipe>(name: impl AsRef<str>, pipe: P) -> impl Pipe {
    if_method(name, pipe)
}

pub fn get<P: Pipe>(pipe: P) -> impl Pipe {
    if_method(Method::GET, pipe)
}

pub fn post<P: Pipe>(pipe: P) -> impl Pipe {
    if_method(Method::POST, pipe)
}

pub fn put<P: Pipe>(pipe: P) -> impl Pipe {
    if_method(Method::PUT, pipe)
}

pub fn patch<P: Pipe>(pipe: P) -> impl Pipe {
    if_method(Method::PATCH, pipe)
}

pub fn delete<P: Pipe>(pipe: P) -> impl Pipe {
    if_method(Method::DELETE, pipe)
}

pub fn head<P: Pipe>(pipe: P) -> impl Pipe {
    if_method(Method::HEAD, pipe)
}

pub fn options<P: Pipe>(pipe: P) -> impl Pipe {
    if_method(Method::OPTIONS, pipe)
}

pub fn connect<P: Pipe>(pipe: P) -> impl Pipe {
    if_method(Method::CONNECT, pipe)
}

pub fn trace<P: Pipe>(pipe: P) -> impl Pipe {
    if_method(Method::TRACE, pipe)
}
