//! Host adapters.
//!
//! # Data Flow
//! ```text
//! socket  → listener::serve ─┐
//! axum    → into_router ─────┼→ PipeService → Context → pipe
//! axum    → pipe_middleware ─┘                     │
//!                                                  ├─ Matched     → Context::into_response
//!                                                  ├─ NotMatched  → fallback / next handler
//!                                                  └─ Err         → 500 + error log
//! ```
//!
//! Outbound, [`from_service`] lifts any tower service into a pipe.

pub mod failure;
pub mod listener;
pub mod outbound;
pub mod router;
pub mod service;

use axum::body::Body;
use axum::http::Response;

use crate::context::Context;
use crate::error::PipeError;
use crate::pipe::{Outcome, Pipe};

pub use failure::PipeFailure;
pub use listener::{serve, serve_pipe, Listener, ListenerError};
pub use outbound::{from_service, FromService};
pub use router::{into_router, pipe_middleware, PipeMiddleware};
pub use service::{NotFound, PipeService};

/// What a host does next with an exchange.
pub(crate) enum Handled {
    /// The pipe matched; send this response.
    Respond(Response<Body>),
    /// The pipe declined; the context still owns the request.
    Declined(Context),
}

/// Run `pipe` over `ctx`, keeping the context around for a fall-through.
pub(crate) async fn dispatch<P: Pipe + ?Sized>(pipe: &P, ctx: Context) -> Result<Handled, PipeError> {
    match pipe.call(ctx.clone()).await? {
        Outcome::Matched(done) => {
            // Release our handle so the response can be moved out, not copied.
            drop(ctx);
            Ok(Handled::Respond(done.into_response()))
        }
        Outcome::NotMatched => Ok(Handled::Declined(ctx)),
    }
}
