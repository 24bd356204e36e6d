//! Response construction.
//!
//! # Data Flow
//! ```text
//! builders.rs (status line, headers, body writes)
//!     → canned.rs (respond + named status constructors)
//!     → Context response sink
//!     → host adapter finalizes into http::Response
//! ```
//!
//! # Design Decisions
//! - Every builder matches; invalid input is a failure, not a non-match
//! - Headers of a canned response are set before its status line
//! - Body writes append; nothing is flushed until the host finalizes

pub mod builders;
pub mod canned;
pub mod status;

pub use builders::{
    add_header, set_header, set_status, status, status_code, status_reason, write_body, write_encoded,
    Encoding, EncodedWrite, HeaderWrite, SetStatus, WriteBody,
};
pub use canned::*;
pub use status::HttpStatus;
