//! Per-exchange state threaded through every pipe.
//!
//! # Data Flow
//! ```text
//! host adapter (Request<Body>)
//!     → Context::new (request view + empty response sink)
//!     → pipes read the request view, mutate the response sink
//!     → Context::into_response (status line, headers, buffered body)
//! ```
//!
//! # Design Decisions
//! - A Context is a cheap handle; clones observe the same exchange
//! - One Context per exchange, never shared across exchanges
//! - The request body is read at most once; the buffered bytes are cached
//! - Locks are never held across an await point

pub mod value;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri, Version};
use uuid::Uuid;

use crate::error::PipeError;
use crate::response::HttpStatus;

pub use value::{FieldValue, Params, Query};

/// Default cap on a materialized request body (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Handle over one inbound exchange.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Exchange>,
}

struct Exchange {
    request_id: Uuid,
    parts: Parts,
    body: Mutex<BodyState>,
    body_limit: usize,
    response: Mutex<ResponseSink>,
}

enum BodyState {
    Pending(Body),
    Reading,
    Buffered(Bytes),
    /// The stream errored or overran the limit; holds the original message.
    Failed(String),
}

#[derive(Debug, Clone)]
struct ResponseSink {
    status: StatusCode,
    reason: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            reason: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn header_name(name: &str) -> Result<HeaderName, PipeError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| PipeError::header(name, e))
}

fn header_values(name: &str, value: FieldValue) -> Result<Vec<HeaderValue>, PipeError> {
    value
        .into_vec()
        .into_iter()
        .map(|v| HeaderValue::from_str(&v).map_err(|e| PipeError::header(name, e)))
        .collect()
}

impl Context {
    /// Build a context for a request with the default body limit.
    pub fn new(request: Request<Body>) -> Self {
        Self::with_body_limit(request, DEFAULT_BODY_LIMIT)
    }

    /// Build a context whose body materializer stops at `body_limit` bytes.
    pub fn with_body_limit(request: Request<Body>, body_limit: usize) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            inner: Arc::new(Exchange {
                request_id: Uuid::new_v4(),
                parts,
                body: Mutex::new(BodyState::Pending(body)),
                body_limit,
                response: Mutex::new(ResponseSink::default()),
            }),
        }
    }

    /// Identifier attached to this exchange's log events.
    pub fn request_id(&self) -> Uuid {
        self.inner.request_id
    }

    pub fn method(&self) -> &Method {
        &self.inner.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.inner.parts.uri
    }

    pub fn version(&self) -> Version {
        self.inner.parts.version
    }

    /// Request headers. Lookups on a `HeaderMap` are case-insensitive.
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.parts.headers
    }

    /// A single request header, `None` if absent.
    pub fn header(&self, name: &str) -> Option<FieldValue> {
        let name = name.to_ascii_lowercase();
        FieldValue::from_header_values(self.inner.parts.headers.get_all(name.as_str()))
    }

    pub fn body_limit(&self) -> usize {
        self.inner.body_limit
    }

    /// Drain the request body into memory.
    ///
    /// The first call reads the stream; later calls get the cached bytes.
    pub(crate) async fn read_body(&self) -> Result<Bytes, PipeError> {
        let body = {
            let mut state = lock(&self.inner.body);
            match std::mem::replace(&mut *state, BodyState::Reading) {
                BodyState::Pending(body) => body,
                BodyState::Buffered(bytes) => {
                    *state = BodyState::Buffered(bytes.clone());
                    return Ok(bytes);
                }
                BodyState::Reading => {
                    return Err(PipeError::Body("request body is already being read".into()));
                }
                BodyState::Failed(reason) => {
                    let err = PipeError::Body(format!("request body could not be read: {reason}").into());
                    *state = BodyState::Failed(reason);
                    return Err(err);
                }
            }
        };

        let bytes = match axum::body::to_bytes(body, self.inner.body_limit).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let source = e.into_inner();
                *lock(&self.inner.body) = BodyState::Failed(source.to_string());
                return Err(PipeError::Body(source));
            }
        };

        tracing::trace!(
            request_id = %self.inner.request_id,
            bytes = bytes.len(),
            "Request body buffered"
        );
        *lock(&self.inner.body) = BodyState::Buffered(bytes.clone());
        Ok(bytes)
    }

    /// Current response status line.
    pub fn status(&self) -> HttpStatus {
        let sink = lock(&self.inner.response);
        HttpStatus {
            code: sink.status.as_u16(),
            reason: sink.reason.clone(),
        }
    }

    pub fn status_code(&self) -> u16 {
        lock(&self.inner.response).status.as_u16()
    }

    /// The explicit reason phrase, or the canonical one for the code.
    pub fn status_reason(&self) -> Option<String> {
        let sink = lock(&self.inner.response);
        sink.reason
            .clone()
            .or_else(|| sink.status.canonical_reason().map(str::to_string))
    }

    /// Write the response status line.
    pub fn set_status(&self, status: HttpStatus) -> Result<(), PipeError> {
        let code = StatusCode::from_u16(status.code).map_err(|_| PipeError::InvalidStatus(status.code))?;
        if let Some(reason) = &status.reason {
            hyper::ext::ReasonPhrase::try_from(reason.as_bytes())
                .map_err(|_| PipeError::InvalidReason(reason.clone()))?;
        }
        let mut sink = lock(&self.inner.response);
        sink.status = code;
        sink.reason = status.reason;
        Ok(())
    }

    /// Replace every value of a response header.
    pub fn set_header(&self, name: &str, value: impl Into<FieldValue>) -> Result<(), PipeError> {
        let header = header_name(name)?;
        let values = header_values(name, value.into())?;
        let mut sink = lock(&self.inner.response);
        sink.headers.remove(&header);
        for v in values {
            sink.headers.append(header.clone(), v);
        }
        Ok(())
    }

    /// Append values after any existing ones, or set the header if absent.
    pub fn add_header(&self, name: &str, value: impl Into<FieldValue>) -> Result<(), PipeError> {
        let header = header_name(name)?;
        let values = header_values(name, value.into())?;
        let mut sink = lock(&self.inner.response);
        for v in values {
            sink.headers.append(header.clone(), v);
        }
        Ok(())
    }

    /// A response header as currently set, `None` if absent.
    pub fn response_header(&self, name: &str) -> Option<FieldValue> {
        let name = name.to_ascii_lowercase();
        let sink = lock(&self.inner.response);
        FieldValue::from_header_values(sink.headers.get_all(name.as_str()))
    }

    /// Append bytes to the response body without finalizing it.
    pub fn write(&self, data: &[u8]) {
        lock(&self.inner.response).body.extend_from_slice(data);
    }

    /// Snapshot of the response body written so far.
    pub fn response_body(&self) -> Bytes {
        Bytes::copy_from_slice(&lock(&self.inner.response).body)
    }

    /// Finalize the exchange into a response.
    pub fn into_response(self) -> Response<Body> {
        let sink = match Arc::try_unwrap(self.inner) {
            Ok(exchange) => exchange
                .response
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            Err(shared) => lock(&shared.response).clone(),
        };

        let mut response = Response::new(Body::from(sink.body));
        *response.status_mut() = sink.status;
        *response.headers_mut() = sink.headers;
        if let Some(reason) = sink.reason {
            if let Ok(phrase) = hyper::ext::ReasonPhrase::try_from(reason.into_bytes()) {
                response.extensions_mut().insert(phrase);
            }
        }
        response
    }

    /// Rebuild the request, re-attaching a buffered body if one was read.
    pub fn into_request(self) -> Request<Body> {
        match Arc::try_unwrap(self.inner) {
            Ok(exchange) => {
                let body = match exchange.body.into_inner().unwrap_or_else(PoisonError::into_inner) {
                    BodyState::Pending(body) => body,
                    BodyState::Buffered(bytes) => Body::from(bytes),
                    // A failed stream is gone; there is nothing left to forward.
                    BodyState::Reading | BodyState::Failed(_) => Body::empty(),
                };
                Request::from_parts(exchange.parts, body)
            }
            Err(shared) => {
                let body = {
                    let mut state = lock(&shared.body);
                    match std::mem::replace(&mut *state, BodyState::Reading) {
                        BodyState::Pending(body) => body,
                        BodyState::Buffered(bytes) => {
                            *state = BodyState::Buffered(bytes.clone());
                            Body::from(bytes)
                        }
                        BodyState::Failed(reason) => {
                            *state = BodyState::Failed(reason);
                            Body::empty()
                        }
                        BodyState::Reading => Body::empty(),
                    }
                };
                rebuild(&shared.parts, body)
            }
        }
    }

    /// A copy of the request with its body buffered, leaving the context usable.
    pub(crate) async fn to_request(&self) -> Result<Request<Body>, PipeError> {
        let bytes = self.read_body().await?;
        Ok(rebuild(&self.inner.parts, Body::from(bytes)))
    }

    /// Overwrite response headers with every header in `headers`.
    pub(crate) fn replace_headers(&self, headers: HeaderMap) {
        let mut sink = lock(&self.inner.response);
        let mut last = None;
        for (name, value) in headers {
            // `None` names continue the previous header's values.
            let name = match name {
                Some(name) => {
                    sink.headers.remove(&name);
                    last = Some(name.clone());
                    name
                }
                None => match &last {
                    Some(name) => name.clone(),
                    None => continue,
                },
            };
            sink.headers.append(name, value);
        }
    }
}

fn rebuild(parts: &Parts, body: Body) -> Request<Body> {
    let mut request = Request::new(body);
    *request.method_mut() = parts.method.clone();
    *request.uri_mut() = parts.uri.clone();
    *request.version_mut() = parts.version;
    *request.headers_mut() = parts.headers.clone();
    *request.extensions_mut() = parts.extensions.clone();
    request
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.inner.request_id)
            .field("method", &self.inner.parts.method)
            .field("uri", &self.inner.parts.uri)
            .finish_non_exhaustive()
    }
}
