//! Composable HTTP request pipes.
//!
//! A pipe takes a [`Context`] and either handles it (`Outcome::Matched`),
//! declines it (`Outcome::NotMatched`), or fails (`Err(PipeError)`). Small
//! pipes (matchers, response builders, body materializers) combine with
//! [`compose`] and [`choose`] into whole applications, which host adapters
//! then serve.
//!
//! ```
//! use http_pipes::{choose, get, not_found, ok, path, post, text, PatternError};
//!
//! let app = choose![
//!     get(path("/", |_| ok().body("Hello World!"))?),
//!     post(path("/echo", |_| text(|body| ok().body(body)))?),
//!     not_found(),
//! ];
//! # let _ = app;
//! # Ok::<(), PatternError>(())
//! ```

pub mod body;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod matching;
pub mod observability;
pub mod pipe;
pub mod response;

pub use body::{body, text};
pub use config::ServerConfig;
pub use context::{Context, FieldValue, Params, Query, DEFAULT_BODY_LIMIT};
pub use error::{PatternError, PipeError};
pub use host::{from_service, into_router, pipe_middleware, serve, serve_pipe, PipeMiddleware, PipeService};
pub use lifecycle::Shutdown;
pub use matching::{
    connect, delete, get, head, header, headers, if_header, if_method, if_path, if_version, method, options, other,
    patch, path, path_with, post, put, query, query_param, trace, url, version, PathPattern, PatternOptions,
};
pub use pipe::{always, choose, compose, never, pipe_fn, BoxPipe, Outcome, Pipe, PipeExt, PipeResult};
pub use response::{
    accepted, add_header, bad_gateway, bad_request, conflict, continue_, created, forbidden, found, gateway_timeout,
    gone, internal_server_error, invalid_http_version, method_not_allowed, moved_permanently, no_content,
    not_acceptable, not_found, not_implemented, not_modified, ok, precondition_required, request_timeout, respond,
    service_unavailable, set_header, set_status, status, status_code, status_reason, switching_protocols,
    too_many_requests, unauthorized, unprocessable_entity, unsupported_media_type, write_body, write_encoded, Encoding,
    HttpStatus, Respond,
};
