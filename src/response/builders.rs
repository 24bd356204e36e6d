//! Response mutation pipes: status line, headers, body.

use std::sync::Arc;

use axum::body::Bytes;
use base64::Engine;

use crate::context::{Context, FieldValue};
use crate::error::PipeError;
use crate::matching::Extract;
use crate::pipe::{Outcome, Pipe, PipeFuture};
use crate::response::HttpStatus;

/// How a text payload maps to body bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Write the text as-is.
    #[default]
    Utf8,
    /// Decode the text as standard base64 and write the raw bytes.
    Base64,
}

impl Encoding {
    pub fn encode(self, text: &str) -> Result<Bytes, PipeError> {
        match self {
            Encoding::Utf8 => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Encoding::Base64 => Ok(base64::engine::general_purpose::STANDARD
                .decode(text)?
                .into()),
        }
    }
}

fn done(result: Result<Context, PipeError>) -> PipeFuture {
    Box::pin(async move { result.map(Outcome::Matched) })
}

/// Writes the status line. See [`set_status`].
#[derive(Debug, Clone)]
pub struct SetStatus {
    status: HttpStatus,
    reason: Option<String>,
}

/// Write the response status line; always matches.
///
/// A reason carried by an [`HttpStatus`] argument wins over one given
/// through [`SetStatus::reason`].
pub fn set_status(status: impl Into<HttpStatus>) -> SetStatus {
    SetStatus {
        status: status.into(),
        reason: None,
    }
}

impl SetStatus {
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn resolved(&self) -> HttpStatus {
        HttpStatus {
            code: self.status.code,
            reason: self.status.reason.clone().or_else(|| self.reason.clone()),
        }
    }
}

impl Pipe for SetStatus {
    fn call(&self, ctx: Context) -> PipeFuture {
        let result = ctx.set_status(self.resolved()).map(|()| ctx);
        done(result)
    }
}

/// Header mutation. See [`set_header`] and [`add_header`].
#[derive(Debug, Clone)]
pub struct HeaderWrite {
    name: String,
    value: FieldValue,
    append: bool,
}

/// Overwrite a response header's value(s).
pub fn set_header(name: impl Into<String>, value: impl Into<FieldValue>) -> HeaderWrite {
    HeaderWrite {
        name: name.into(),
        value: value.into(),
        append: false,
    }
}

/// Append to a response header, or set it when absent.
pub fn add_header(name: impl Into<String>, value: impl Into<FieldValue>) -> HeaderWrite {
    HeaderWrite {
        name: name.into(),
        value: value.into(),
        append: true,
    }
}

impl Pipe for HeaderWrite {
    fn call(&self, ctx: Context) -> PipeFuture {
        let value = self.value.clone();
        let result = if self.append {
            ctx.add_header(&self.name, value)
        } else {
            ctx.set_header(&self.name, value)
        };
        done(result.map(|()| ctx))
    }
}

/// Appends to the response body. See [`write_body`].
#[derive(Debug, Clone)]
pub struct WriteBody {
    data: Bytes,
}

/// Append bytes to the response body without finalizing it; always matches.
pub fn write_body(data: impl Into<Bytes>) -> WriteBody {
    WriteBody { data: data.into() }
}

/// Append text decoded with `encoding`.
///
/// An undecodable payload fails when the pipe runs.
pub fn write_encoded(text: impl Into<String>, encoding: Encoding) -> EncodedWrite {
    EncodedWrite {
        text: Arc::from(text.into()),
        encoding,
    }
}

impl Pipe for WriteBody {
    fn call(&self, ctx: Context) -> PipeFuture {
        ctx.write(&self.data);
        done(Ok(ctx))
    }
}

#[derive(Debug, Clone)]
pub struct EncodedWrite {
    text: Arc<str>,
    encoding: Encoding,
}

impl Pipe for EncodedWrite {
    fn call(&self, ctx: Context) -> PipeFuture {
        let result = self.encoding.encode(&self.text).map(|data| {
            ctx.write(&data);
            ctx
        });
        done(result)
    }
}

/// Hand the current status line to `next`.
pub fn status<F, P>(next: F) -> impl Pipe
where
    F: Fn(HttpStatus) -> P + Send + Sync + 'static,
    P: Pipe,
{
    Extract::new(|ctx: &Context| Ok(ctx.status()), next)
}

/// Hand the current status code to `next`.
pub fn status_code<F, P>(next: F) -> impl Pipe
where
    F: Fn(u16) -> P + Send + Sync + 'static,
    P: Pipe,
{
    Extract::new(|ctx: &Context| Ok(ctx.status_code()), next)
}

/// Hand the current reason phrase to `next`.
pub fn status_reason<F, P>(next: F) -> impl Pipe
where
    F: Fn(Option<String>) -> P + Send + Sync + 'static,
    P: Pipe,
{
    Extract::new(|ctx: &Context| Ok(ctx.status_reason()), next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe::compose;
    use axum::body::Body;
    use axum::http::Request;

    fn ctx() -> Context {
        Context::new(Request::builder().uri("/").body(Body::empty()).unwrap())
    }

    async fn run(pipe: impl Pipe) -> Context {
        pipe.call(ctx()).await.unwrap().into_context().unwrap()
    }

    #[tokio::test]
    async fn test_set_status_reason_precedence() {
        let c = run(set_status(404).reason("Gone Fishing")).await;
        assert_eq!(c.status(), HttpStatus::new(404, Some("Gone Fishing".into())));

        let c = run(set_status(HttpStatus::new(404, Some("Own".into()))).reason("Other")).await;
        assert_eq!(c.status_reason().as_deref(), Some("Own"));
    }

    #[tokio::test]
    async fn test_header_merge_order() {
        let c = run(compose(set_header("X", "a"), add_header("X", "b"))).await;
        assert_eq!(c.response_header("x"), Some(FieldValue::from(["a", "b"])));
    }

    #[tokio::test]
    async fn test_add_header_without_prior_value() {
        let c = run(add_header("X-One", vec!["1", "2"])).await;
        assert_eq!(c.response_header("x-one").unwrap().as_slice(), ["1", "2"]);
    }

    #[tokio::test]
    async fn test_write_body_appends() {
        let c = run(compose(write_body("Hello, "), write_body(&b"World"[..]))).await;
        assert_eq!(c.response_body(), "Hello, World");
    }

    #[tokio::test]
    async fn test_write_encoded() {
        let c = run(write_encoded("cGluZw==", Encoding::Base64)).await;
        assert_eq!(c.response_body(), "ping");

        let result = write_encoded("***", Encoding::Base64).call(ctx()).await;
        assert!(matches!(result, Err(PipeError::Encoding(_))));
    }

    #[tokio::test]
    async fn test_status_accessor() {
        let pipe = compose(
            set_status(201),
            status_code(|code| write_body(code.to_string())),
        );
        let c = run(pipe).await;
        assert_eq!(c.response_body(), "201");
    }
}
