use std::num::ParseIntError;

use crate::message::Message;

/// Errors raised while reading or writing FFSTP frames.
///
/// The parse kinds (`InvalidHeader`, `LengthNotNumeric`, `LengthNegative`,
/// `MissingData`, `MessageTooLong`) are mutually exclusive per read and
/// are checked in grammar order. None of them are recoverable: after any
/// of them the stream position is unspecified and the stream must be
/// resynchronized externally before further reads.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream did not begin with the protocol header and delimiter.
    #[error("message header is invalid: {actual:?}")]
    InvalidHeader { actual: String },

    /// The length field did not parse as an integer.
    #[error("message length must be a number, got {raw:?}")]
    LengthNotNumeric {
        raw: String,
        #[source]
        source: ParseIntError,
    },

    /// The length field parsed as a negative integer.
    #[error("message length must be >= 0, received {value}")]
    LengthNegative { value: i64 },

    /// The stream ended before the expected data was fully read.
    ///
    /// `expected` is the promised character count for fixed-length reads
    /// and `None` when the end of stream interrupted a delimited field.
    /// `partial` holds whatever was read before the stream ended.
    #[error("{}", missing_data_message(.expected, .partial))]
    MissingData {
        expected: Option<usize>,
        partial: String,
    },

    /// Data appeared between the body and the closing delimiter.
    ///
    /// The parsed message and the extra data are retained for inspection.
    #[error(
        "too much data received, expected {} but received {} extra character(s)",
        .message.data().chars().count(),
        .extra.chars().count()
    )]
    MessageTooLong {
        message: Message<String>,
        extra: String,
    },

    /// A status string contained the delimiter character (write path).
    #[error("status must not contain delimiters, given status {status:?} is not valid")]
    InvalidStatus { status: String },

    /// The stream carried bytes that are not valid UTF-8.
    ///
    /// The wire encoding is fixed out of band; this surfaces a peer that
    /// was configured with a different one.
    #[error("stream is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// An I/O error occurred on the underlying stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream stopped accepting bytes mid-frame (write path).
    #[error("connection closed (incomplete frame write)")]
    ConnectionClosed,
}

fn missing_data_message(expected: &Option<usize>, partial: &str) -> String {
    let actual = partial.chars().count();
    match expected {
        Some(expected) => {
            format!("not enough data in the buffer, expected {expected} but received {actual} character(s)")
        }
        None => format!("not enough data in the buffer, retrieved {actual} character(s)"),
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
