//! A pipe exposed as a `tower::Service`.
//!
//! This is the adapter the other hosts build on: the socket listener and the
//! axum router both drive a [`PipeService`].

use std::convert::Infallible;
use std::future::{ready, Ready};
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::Duration;

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use tower::{Service, ServiceExt};
use tracing::Instrument;

use crate::config::LimitsConfig;
use crate::context::{Context, DEFAULT_BODY_LIMIT};
use crate::error::{BoxError, PipeError};
use crate::host::{dispatch, Handled};
use crate::pipe::Pipe;

/// Default fallback: an empty 404.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl<B> Service<Request<B>> for NotFound {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = Ready<Result<Response<Body>, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: Request<B>) -> Self::Future {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NOT_FOUND;
        ready(Ok(response))
    }
}

/// Serves HTTP requests with a pipe.
///
/// Matched exchanges become the context's response; declined ones are handed
/// to the fallback service; failures come back as `Err(PipeError)` for the
/// host to render. An exchange that outlives the timeout fails with
/// `PipeError::Timeout`.
pub struct PipeService<P, F = NotFound> {
    pipe: Arc<P>,
    fallback: F,
    body_limit: usize,
    timeout: Option<Duration>,
}

impl<P: Pipe> PipeService<P> {
    pub fn new(pipe: P) -> Self {
        Self {
            pipe: Arc::new(pipe),
            fallback: NotFound,
            body_limit: DEFAULT_BODY_LIMIT,
            timeout: None,
        }
    }

    /// A service honouring the configured body cap and request timeout.
    pub fn from_limits(pipe: P, limits: &LimitsConfig) -> Self {
        Self::new(pipe)
            .body_limit(limits.body_bytes)
            .timeout(Duration::from_secs(limits.request_timeout_secs))
    }
}

impl<P, F> PipeService<P, F> {
    /// Replace the service that answers declined exchanges.
    pub fn fallback<G>(self, fallback: G) -> PipeService<P, G> {
        PipeService {
            pipe: self.pipe,
            fallback,
            body_limit: self.body_limit,
            timeout: self.timeout,
        }
    }

    /// Cap on the request body a materializer may buffer.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Total time allowed for one exchange, fallback included.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }
}

impl<P, F: Clone> Clone for PipeService<P, F> {
    fn clone(&self) -> Self {
        Self {
            pipe: Arc::clone(&self.pipe),
            fallback: self.fallback.clone(),
            body_limit: self.body_limit,
            timeout: self.timeout,
        }
    }
}

impl<P, F, B> Service<Request<B>> for PipeService<P, F>
where
    P: Pipe,
    F: Service<Request<Body>, Response = Response<Body>, Error = Infallible> + Clone + Send + 'static,
    F::Future: Send + 'static,
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = PipeError;
    type Future = BoxFuture<'static, Result<Response<Body>, PipeError>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let ctx = Context::with_body_limit(req.map(Body::new), self.body_limit);
        let span = tracing::info_span!(
            "exchange",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.uri().path(),
        );
        let pipe = Arc::clone(&self.pipe);
        let fallback = self.fallback.clone();
        let timeout = self.timeout;

        let exchange = async move {
            match dispatch(&*pipe, ctx).await {
                Ok(Handled::Respond(response)) => {
                    tracing::debug!(status = response.status().as_u16(), "Exchange matched");
                    Ok(response)
                }
                Ok(Handled::Declined(ctx)) => {
                    tracing::warn!("No pipe matched, using fallback");
                    let response = fallback
                        .oneshot(ctx.into_request())
                        .await
                        .unwrap_or_else(|never| match never {});
                    Ok(response)
                }
                Err(err) => Err(err),
            }
        };

        Box::pin(
            async move {
                let result = match timeout {
                    Some(limit) => tokio::time::timeout(limit, exchange)
                        .await
                        .unwrap_or(Err(PipeError::Timeout(limit))),
                    None => exchange.await,
                };
                if let Err(err) = &result {
                    tracing::error!(error = %err, "Exchange failed");
                }
                result
            }
            .instrument(span),
        )
    }
}
