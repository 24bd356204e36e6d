//! Rendering of pipe failures at the host boundary.

use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;

use crate::error::PipeError;

/// A failed exchange, rendered as a bare 500 (408 for a timeout).
///
/// The error itself is logged, never sent to the client.
#[derive(Debug)]
pub struct PipeFailure(pub PipeError);

impl From<PipeError> for PipeFailure {
    fn from(err: PipeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PipeFailure {
    fn into_response(self) -> Response<Body> {
        tracing::error!(error = %self.0, "Pipe failed");
        let status = match self.0 {
            PipeError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let text = status.canonical_reason().unwrap_or("Error");
        (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response()
    }
}

/// Async error handler for `axum::error_handling::HandleError`.
pub(crate) async fn render_failure(err: PipeError) -> PipeFailure {
    PipeFailure(err)
}
