//! Axum integration.
//!
//! Two shapes:
//! - [`into_router`] makes the pipe the whole application
//! - [`pipe_middleware`] runs the pipe in front of existing routes and falls
//!   through to them when it declines

use std::time::Duration;

use axum::error_handling::HandleError;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::context::{Context, DEFAULT_BODY_LIMIT};
use crate::host::failure::render_failure;
use crate::host::{dispatch, Handled, PipeFailure, PipeService};
use crate::pipe::{BoxPipe, Pipe, PipeExt};

/// Build an axum router that serves `pipe` for every request.
///
/// Declined exchanges get an empty 404, failures a 500.
#[allow(deprecated)]
pub fn into_router<P: Pipe>(pipe: P, config: &ServerConfig) -> Router {
    let service = PipeService::new(pipe).body_limit(config.limits.body_bytes);
    Router::new()
        .fallback_service(HandleError::<_, _, ()>::new(service, render_failure))
        .layer(TimeoutLayer::new(Duration::from_secs(config.limits.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
}

/// State for [`pipe_middleware`].
#[derive(Clone)]
pub struct PipeMiddleware {
    pipe: BoxPipe,
    body_limit: usize,
}

impl PipeMiddleware {
    pub fn new(pipe: impl Pipe) -> Self {
        Self {
            pipe: pipe.boxed(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

/// Middleware function for `axum::middleware::from_fn_with_state`.
///
/// ```
/// use axum::{middleware, routing, Router};
/// use http_pipes::{if_header, ok, pipe_middleware, PipeMiddleware};
///
/// let pipe = if_header("x-canary", "1", ok().body("canary"));
/// let app: Router = Router::new()
///     .route("/", routing::get(|| async { "stable" }))
///     .layer(middleware::from_fn_with_state(PipeMiddleware::new(pipe), pipe_middleware));
/// # let _ = app;
/// ```
pub async fn pipe_middleware(
    State(state): State<PipeMiddleware>,
    request: Request,
    next: Next,
) -> Result<Response, PipeFailure> {
    let ctx = Context::with_body_limit(request, state.body_limit);
    match dispatch(&*state.pipe, ctx).await? {
        Handled::Respond(response) => Ok(response),
        Handled::Declined(ctx) => Ok(next.run(ctx.into_request()).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipeError;
    use crate::matching::{if_header, post};
    use crate::pipe::{never, pipe_fn, PipeResult};
    use crate::response::{ok, write_body};
    use crate::body::text;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing;
    use tower::ServiceExt;

    async fn send(app: Router, request: axum::http::Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_router_serves_pipe() {
        let app = into_router(ok().body("Hello World!"), &ServerConfig::default());
        assert_eq!(send(app, get_request("/any/path")).await, (StatusCode::OK, String::from("Hello World!")));
    }

    #[tokio::test]
    async fn test_router_declined_is_404() {
        let app = into_router(never(), &ServerConfig::default());
        let (status, body) = send(app, get_request("/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_router_failure_is_500() {
        let failing = pipe_fn(|_ctx| async { PipeResult::Err(PipeError::Decode("%zz".into())) });
        let app = into_router(failing, &ServerConfig::default());
        let (status, _) = send(app, get_request("/")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_router_body_limit_from_config() {
        let mut config = ServerConfig::default();
        config.limits.body_bytes = 4;
        let app = into_router(post(text(|s: String| write_body(s))), &config);
        let request = axum::http::Request::builder()
            .method("POST")
            .body(Body::from("longer than four"))
            .unwrap();
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn layered() -> Router {
        let pipe = if_header("x-canary", "1", ok().body("canary"));
        Router::new()
            .route("/", routing::post(|body: String| async move { format!("stable:{body}") }))
            .layer(axum::middleware::from_fn_with_state(PipeMiddleware::new(pipe), pipe_middleware))
    }

    #[tokio::test]
    async fn test_middleware_matched_short_circuits() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("x-canary", "1")
            .body(Body::from("payload"))
            .unwrap();
        assert_eq!(send(layered(), request).await, (StatusCode::OK, String::from("canary")));
    }

    #[tokio::test]
    async fn test_middleware_declined_falls_through() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("payload"))
            .unwrap();
        assert_eq!(send(layered(), request).await, (StatusCode::OK, String::from("stable:payload")));
    }

    #[tokio::test]
    async fn test_middleware_falls_through_with_buffered_body() {
        // The pipe reads the body and then declines; the route still sees it.
        let pipe = text(|_s: String| never());
        let app = Router::new()
            .route("/", routing::post(|body: String| async move { body }))
            .layer(axum::middleware::from_fn_with_state(PipeMiddleware::new(pipe), pipe_middleware));
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("kept"))
            .unwrap();
        assert_eq!(send(app, request).await, (StatusCode::OK, String::from("kept")));
    }
}
