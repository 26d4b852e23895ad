//! Friendly framed socket transfer protocol (FFSTP).
//!
//! A small text-framed request/response protocol over any blocking byte
//! stream. Every message carries a free-form status and a length-prefixed
//! payload, framed as `FFS;STATUS;LENGTH;BODY;`.
//!
//! # Crate Structure
//!
//! - [`frame`] — Wire grammar, message/status model, frame reader and
//!   writer, parse error taxonomy
//! - [`session`] — Session façade composing reader, writer, and a
//!   pluggable payload serializer into four communication primitives

/// Re-export frame types.
pub mod frame {
    pub use ffstp_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use ffstp_session::*;
}
