//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! pipes, adapters, listener
//!     → tracing events (request_id, method, path, outcome)
//!     → logging.rs subscriber (fmt or JSON)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every event of an exchange

pub mod logging;

pub use logging::init_logging;
