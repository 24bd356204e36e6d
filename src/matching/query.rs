//! Query string matchers.

use crate::context::value::parse_query;
use crate::context::{Context, FieldValue, Query};
use crate::matching::Extract;
use crate::pipe::Pipe;

/// Hand the parsed query string to `next`.
///
/// Never declines: an absent or empty query yields an empty map.
pub fn query<F, P>(next: F) -> impl Pipe
where
    F: Fn(Query) -> P + Send + Sync + 'static,
    P: Pipe,
{
    Extract::new(|ctx: &Context| Ok(parse_query(ctx.uri().query())), next)
}

/// Hand one query parameter to `next`, `None` when absent.
pub fn query_param<F, P>(name: impl Into<String>, next: F) -> impl Pipe
where
    F: Fn(Option<FieldValue>) -> P + Send + Sync + 'static,
    P: Pipe,
{
    let name = name.into();
    Extract::new(
        move |ctx: &Context| Ok(parse_query(ctx.uri().query()).remove(&name)),
        next,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::test_support::{body_of, request};
    use crate::response::write_body;

    #[tokio::test]
    async fn test_query_map() {
        let pipe = query(|q: Query| {
            let tags = q.get("tag").map(|v| v.as_slice().join(",")).unwrap_or_default();
            write_body(tags)
        });
        assert_eq!(body_of(&pipe, request("GET", "/?tag=a&tag=b")).await.as_deref(), Some("a,b"));
        assert_eq!(body_of(&pipe, request("GET", "/")).await.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_query_param() {
        let pipe = query_param("name", |v: Option<FieldValue>| {
            write_body(v.map(|v| v.first().to_string()).unwrap_or_else(|| "anonymous".into()))
        });
        assert_eq!(body_of(&pipe, request("GET", "/?name=Ada%20L")).await.as_deref(), Some("Ada L"));
        assert_eq!(body_of(&pipe, request("GET", "/?other=1")).await.as_deref(), Some("anonymous"));
    }
}
