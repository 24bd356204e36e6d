//! Foreign handlers as pipes.
//!
//! Any tower service (an axum handler, a `Router`, a proxy client) can be
//! placed inside a pipeline. The wrapped service always "handles" the
//! exchange, so the resulting pipe always matches.

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{header, Request, Response};
use tower::{Service, ServiceExt};

use crate::context::Context;
use crate::error::{BoxError, PipeError};
use crate::pipe::{Outcome, Pipe, PipeFuture};
use crate::response::HttpStatus;

/// Pipe built by [`from_service`].
pub struct FromService<S> {
    service: S,
}

/// Lift a tower service into a pipe.
///
/// The service receives a copy of the request (body buffered); its status,
/// headers and body are copied into the context's response.
pub fn from_service<S>(service: S) -> FromService<S> {
    FromService { service }
}

impl<S, B> Pipe for FromService<S>
where
    S: Service<Request<Body>, Response = Response<B>> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError>,
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    fn call(&self, ctx: Context) -> PipeFuture {
        let service = self.service.clone();
        Box::pin(async move {
            let request = ctx.to_request().await?;
            let response = service
                .oneshot(request)
                .await
                .map_err(|e| PipeError::Handler(e.into()))?;

            let (mut parts, body) = response.into_parts();
            // The context body may already hold earlier writes.
            parts.headers.remove(header::CONTENT_LENGTH);
            let bytes = axum::body::to_bytes(Body::new(body), usize::MAX)
                .await
                .map_err(|e| PipeError::Handler(e.into_inner()))?;

            let reason = parts
                .extensions
                .get::<hyper::ext::ReasonPhrase>()
                .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
            ctx.set_status(HttpStatus::new(parts.status.as_u16(), reason))?;
            ctx.replace_headers(parts.headers);
            ctx.write(&bytes);
            Ok(Outcome::Matched(ctx))
        })
    }
}
