//! URL and path matchers.

use axum::http::Uri;

use crate::context::value::decode_component;
use crate::context::{Context, Params};
use crate::error::PatternError;
use crate::matching::pattern::{PathPattern, PatternOptions};
use crate::matching::{Extract, Guard};
use crate::pipe::{Outcome, Pipe, PipeFuture};

/// Hand the full request target to `next`.
pub fn url<F, P>(next: F) -> impl Pipe
where
    F: Fn(Uri) -> P + Send + Sync + 'static,
    P: Pipe,
{
    Extract::new(|ctx: &Context| Ok(ctx.uri().clone()), next)
}

/// Run `pipe` only when the decoded path equals `literal`.
pub fn if_path<P: Pipe>(literal: impl Into<String>, pipe: P) -> impl Pipe {
    let literal = literal.into();
    Guard::new(
        move |ctx: &Context| Ok(decode_component(ctx.uri().path())? == literal),
        pipe,
    )
}

/// Match the path against a pattern with `:name` placeholders and hand the
/// decoded parameters to `next`.
///
/// The pattern is compiled here, once; a malformed pattern is reported
/// at registration.
///
/// ```
/// use http_pipes::{path, get, ok};
///
/// let route = get(path("/users/:id", |params| ok().body(format!("user {}", params["id"])))?);
/// # let _ = route;
/// # Ok::<(), http_pipes::PatternError>(())
/// ```
pub fn path<F, P>(pattern: &str, next: F) -> Result<PathMatch<F>, PatternError>
where
    F: Fn(Params) -> P + Send + Sync + 'static,
    P: Pipe,
{
    path_with(pattern, PatternOptions::default(), next)
}

/// [`path`] with explicit matching options.
pub fn path_with<F, P>(pattern: &str, options: PatternOptions, next: F) -> Result<PathMatch<F>, PatternError>
where
    F: Fn(Params) -> P + Send + Sync + 'static,
    P: Pipe,
{
    Ok(PathMatch {
        pattern: PathPattern::with_options(pattern, options)?,
        next,
    })
}

/// Pattern matcher built by [`path`].
pub struct PathMatch<F> {
    pattern: PathPattern,
    next: F,
}

impl<F> PathMatch<F> {
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }
}

impl<F, P> Pipe for PathMatch<F>
where
    F: Fn(Params) -> P + Send + Sync + 'static,
    P: Pipe,
{
    fn call(&self, ctx: Context) -> PipeFuture {
        match self.pattern.match_path(ctx.uri().path()) {
            Ok(Some(params)) => (self.next)(params).call(ctx),
            Ok(None) => {
                tracing::trace!(
                    request_id = %ctx.request_id(),
                    pattern = %self.pattern.as_str(),
                    path = %ctx.uri().path(),
                    "Path pattern did not match"
                );
                Box::pin(async { Ok(Outcome::NotMatched) })
            }
            Err(e) => Box::pin(async move { Err(e) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipeError;
    use crate::matching::test_support::{body_of, request};
    use crate::response::write_body;

    fn echo_params(params: Params) -> impl Pipe {
        let mut pairs: Vec<_> = params.into_iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort();
        write_body(pairs.join("&"))
    }

    #[tokio::test]
    async fn test_path_extraction() {
        let pipe = path("/route/:foo/some/:bar", echo_params).unwrap();
        assert_eq!(
            body_of(&pipe, request("GET", "/route/first/some/beer")).await.as_deref(),
            Some("bar=beer&foo=first")
        );

        let pipe = path("/route/:foo/some", echo_params).unwrap();
        assert_eq!(body_of(&pipe, request("GET", "/route/first/some")).await.as_deref(), Some("foo=first"));
        assert_eq!(body_of(&pipe, request("GET", "/route/some")).await, None);

        let pipe = path("/route/some", echo_params).unwrap();
        assert_eq!(body_of(&pipe, request("GET", "/route/some")).await.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_path_ignores_query() {
        let pipe = path("/search/:term", echo_params).unwrap();
        assert_eq!(
            body_of(&pipe, request("GET", "/search/rust?page=2")).await.as_deref(),
            Some("term=rust")
        );
    }

    #[tokio::test]
    async fn test_if_path_decodes() {
        let pipe = if_path("/hello world", write_body("hi"));
        assert_eq!(body_of(&pipe, request("GET", "/hello%20world")).await.as_deref(), Some("hi"));
        assert_eq!(body_of(&pipe, request("GET", "/hello")).await, None);
    }

    #[tokio::test]
    async fn test_bad_escape_is_failure() {
        let pipe = if_path("/", write_body("root"));
        let result = pipe.call(request("GET", "/%FF")).await;
        assert!(matches!(result, Err(PipeError::Decode(_))));
    }

    #[tokio::test]
    async fn test_url_projection() {
        let pipe = url(|uri: Uri| write_body(uri.query().unwrap_or_default().to_string()));
        assert_eq!(body_of(&pipe, request("GET", "/a?b=c")).await.as_deref(), Some("b=c"));
    }
}
