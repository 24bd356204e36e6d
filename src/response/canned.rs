//! `respond` and the canned status constructors.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, StatusCode};

use crate::context::{Context, FieldValue};
use crate::error::PipeError;
use crate::pipe::{Outcome, Pipe, PipeFuture};
use crate::response::builders::Encoding;
use crate::response::HttpStatus;

#[derive(Debug, Clone)]
enum Payload {
    Bytes(Bytes),
    Text(Arc<str>, Encoding),
}

/// Status line, optional headers, optional body. See [`respond`].
#[derive(Debug, Clone)]
pub struct Respond {
    status: HttpStatus,
    headers: Vec<(String, FieldValue)>,
    body: Option<Payload>,
}

/// Set the status to `code`, then write the body if one is attached.
///
/// ```
/// use http_pipes::respond;
///
/// let teapot = respond(418).reason("I'm a teapot").body("short and stout");
/// # let _ = teapot;
/// ```
pub fn respond(status: impl Into<HttpStatus>) -> Respond {
    Respond {
        status: status.into(),
        headers: Vec::new(),
        body: None,
    }
}

impl Respond {
    /// Attach a body payload.
    pub fn body(mut self, data: impl Into<Bytes>) -> Self {
        self.body = Some(Payload::Bytes(data.into()));
        self
    }

    /// Attach a text payload written with `encoding`.
    pub fn encoded(mut self, text: impl Into<String>, encoding: Encoding) -> Self {
        self.body = Some(Payload::Text(Arc::from(text.into()), encoding));
        self
    }

    /// Override the reason phrase.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.status.reason = Some(reason.into());
        self
    }

    /// Set a header before the status line is written.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn apply(&self, ctx: &Context) -> Result<(), PipeError> {
        for (name, value) in &self.headers {
            ctx.set_header(name, value.clone())?;
        }
        ctx.set_status(self.status.clone())?;
        match &self.body {
            Some(Payload::Bytes(data)) => ctx.write(data),
            Some(Payload::Text(text, encoding)) => ctx.write(&encoding.encode(text)?),
            None => {}
        }
        Ok(())
    }
}

impl Pipe for Respond {
    fn call(&self, ctx: Context) -> PipeFuture {
        let result = self.apply(&ctx).map(|()| Outcome::Matched(ctx));
        Box::pin(async move { result })
    }
}

macro_rules! canned {
    ($($(#[$doc:meta])* $name:ident => $status:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name() -> Respond {
                respond(StatusCode::$status)
            }
        )*
    };
}

canned! {
    /// 100 Continue.
    continue_ => CONTINUE;
    /// 101 Switching Protocols.
    switching_protocols => SWITCHING_PROTOCOLS;
    /// 200 OK.
    ok => OK;
    /// 201 Created.
    created => CREATED;
    /// 202 Accepted.
    accepted => ACCEPTED;
    /// 204 No Content.
    no_content => NO_CONTENT;
    /// 304 Not Modified.
    not_modified => NOT_MODIFIED;
    /// 400 Bad Request.
    bad_request => BAD_REQUEST;
    /// 403 Forbidden.
    forbidden => FORBIDDEN;
    /// 404 Not Found.
    not_found => NOT_FOUND;
    /// 405 Method Not Allowed.
    method_not_allowed => METHOD_NOT_ALLOWED;
    /// 406 Not Acceptable.
    not_acceptable => NOT_ACCEPTABLE;
    /// 408 Request Timeout.
    request_timeout => REQUEST_TIMEOUT;
    /// 409 Conflict.
    conflict => CONFLICT;
    /// 410 Gone.
    gone => GONE;
    /// 415 Unsupported Media Type.
    unsupported_media_type => UNSUPPORTED_MEDIA_TYPE;
    /// 422 Unprocessable Entity.
    unprocessable_entity => UNPROCESSABLE_ENTITY;
    /// 428 Precondition Required.
    precondition_required => PRECONDITION_REQUIRED;
    /// 429 Too Many Requests.
    too_many_requests => TOO_MANY_REQUESTS;
    /// 500 Internal Server Error.
    internal_server_error => INTERNAL_SERVER_ERROR;
    /// 501 Not Implemented.
    not_implemented => NOT_IMPLEMENTED;
    /// 502 Bad Gateway.
    bad_gateway => BAD_GATEWAY;
    /// 503 Service Unavailable.
    service_unavailable => SERVICE_UNAVAILABLE;
    /// 504 Gateway Timeout.
    gateway_timeout => GATEWAY_TIMEOUT;
    /// 505 HTTP Version Not Supported.
    invalid_http_version => HTTP_VERSION_NOT_SUPPORTED;
}

/// 301 with a `Location` header.
pub fn moved_permanently(location: impl Into<String>) -> Respond {
    respond(StatusCode::MOVED_PERMANENTLY).header(header::LOCATION.as_str(), location.into())
}

/// 302 with a `Location` header.
pub fn found(location: impl Into<String>) -> Respond {
    respond(StatusCode::FOUND).header(header::LOCATION.as_str(), location.into())
}

/// 401 with a `WWW-Authenticate` challenge.
pub fn unauthorized(challenge: impl Into<String>) -> Respond {
    respond(StatusCode::UNAUTHORIZED).header(header::WWW_AUTHENTICATE.as_str(), challenge.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::test_support::request;

    async fn run(pipe: Respond) -> Context {
        pipe.call(request("GET", "/")).await.unwrap().into_context().unwrap()
    }

    #[tokio::test]
    async fn test_table_codes() {
        let table: Vec<(Respond, u16)> = vec![
            (continue_(), 100),
            (switching_protocols(), 101),
            (ok(), 200),
            (created(), 201),
            (accepted(), 202),
            (no_content(), 204),
            (not_modified(), 304),
            (bad_request(), 400),
            (forbidden(), 403),
            (not_found(), 404),
            (method_not_allowed(), 405),
            (not_acceptable(), 406),
            (request_timeout(), 408),
            (conflict(), 409),
            (gone(), 410),
            (unsupported_media_type(), 415),
            (unprocessable_entity(), 422),
            (precondition_required(), 428),
            (too_many_requests(), 429),
            (internal_server_error(), 500),
            (not_implemented(), 501),
            (bad_gateway(), 502),
            (service_unavailable(), 503),
            (gateway_timeout(), 504),
            (invalid_http_version(), 505),
        ];
        for (pipe, code) in table {
            assert_eq!(run(pipe).await.status_code(), code);
        }
    }

    #[tokio::test]
    async fn test_body_is_optional() {
        let ctx = run(ok()).await;
        assert!(ctx.response_body().is_empty());

        let ctx = run(ok().body("Hello World!")).await;
        assert_eq!(ctx.response_body(), "Hello World!");
    }

    #[tokio::test]
    async fn test_redirects() {
        let ctx = run(found("/login")).await;
        assert_eq!(ctx.status_code(), 302);
        assert_eq!(ctx.response_header("location"), Some(FieldValue::from("/login")));

        let ctx = run(moved_permanently("https://example.com/")).await;
        assert_eq!(ctx.status_code(), 301);
    }

    #[tokio::test]
    async fn test_unauthorized_challenge() {
        let ctx = run(unauthorized("Basic realm=\"api\"").body("nope")).await;
        assert_eq!(ctx.status_code(), 401);
        assert_eq!(
            ctx.response_header("WWW-Authenticate"),
            Some(FieldValue::from("Basic realm=\"api\""))
        );
        assert_eq!(ctx.response_body(), "nope");
    }

    #[tokio::test]
    async fn test_invalid_location_fails() {
        let result = found("/bad\r\nheader").call(request("GET", "/")).await;
        assert!(matches!(result, Err(PipeError::InvalidHeader { .. })));
    }

    #[tokio::test]
    async fn test_encoded_body() {
        let ctx = run(ok().encoded("SGk=", Encoding::Base64)).await;
        assert_eq!(ctx.response_body(), "Hi");
    }
}
