//! Text framing codec for the FFSTP wire protocol.
//!
//! Every message is framed as four delimiter-terminated fields plus a
//! closing delimiter:
//!
//! ```text
//! FFS;STATUS;LENGTH;BODY;
//! ```
//!
//! - `FFS` is the fixed protocol header
//! - `STATUS` is a free-form, delimiter-free classification string
//! - `LENGTH` is the decimal character count of `BODY`
//! - `BODY` is exactly `LENGTH` characters and may contain delimiters
//!
//! The frame is character based, not byte based: both ends decode the
//! stream as UTF-8 and `LENGTH` counts Unicode scalar values. The
//! encoding is fixed out of band; nothing on the wire negotiates it.

pub mod error;
pub mod grammar;
pub mod message;
pub mod reader;
pub mod status;
pub mod writer;

pub use error::{FrameError, Result};
pub use grammar::{encode_message, DELIMITER, HEADER, HEADER_PROBE_CHARS};
pub use message::Message;
pub use reader::FrameReader;
pub use status::Status;
pub use writer::FrameWriter;
