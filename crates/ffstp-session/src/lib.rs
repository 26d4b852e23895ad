//! Session façade and payload serializers for the FFSTP wire protocol.
//!
//! A [`Session`] owns one frame reader, one frame writer, and one
//! [`Serializer`], and exposes the four communication primitives: one-way
//! send, one-way receive, request-await-response, and
//! receive-request-and-reply. Payloads cross the serializer on the way
//! in and out; status strings pass through untouched.

pub mod error;
pub mod serializer;
pub mod session;

pub use error::{Result, SessionError};
pub use serializer::{ByteSerializer, JsonSerializer, SerializeError, Serializer, StringSerializer};
pub use session::{Session, SessionConfig};
