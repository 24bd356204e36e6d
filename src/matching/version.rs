//! Protocol version matchers.

use axum::http::Version;

use crate::context::Context;
use crate::matching::{Extract, Guard};
use crate::pipe::Pipe;

/// Version in `major.minor` form: `"0.9"`, `"1.0"`, `"1.1"`, `"2.0"`, `"3.0"`.
///
/// HTTP/2 and HTTP/3 carry a `.0` minor, matching the `httpVersion` strings
/// Node reports, so `if_version("2.0", ..)` is the HTTP/2 check.
pub fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_11 => "1.1",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "unknown",
    }
}

/// Hand the raw protocol version string to `next`.
pub fn version<F, P>(next: F) -> impl Pipe
where
    F: Fn(String) -> P + Send + Sync + 'static,
    P: Pipe,
{
    Extract::new(|ctx: &Context| Ok(version_str(ctx.version()).to_string()), next)
}

/// Run `pipe` only for the given version string.
pub fn if_version<P: Pipe>(expected: impl Into<String>, pipe: P) -> impl Pipe {
    let expected = expected.into();
    Guard::new(move |ctx: &Context| Ok(version_str(ctx.version()) == expected), pipe)
}
