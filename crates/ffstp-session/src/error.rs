use crate::serializer::SerializeError;
use ffstp_frame::FrameError;

/// Errors that can occur over the lifetime of a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The writer half could not be initialized from the transport.
    ///
    /// The transport stream is left untouched; its cleanup stays with
    /// the caller.
    #[error("protocol writer could not be initialized: {0}")]
    WriterInit(#[source] std::io::Error),

    /// The reader half could not be initialized from the transport.
    #[error("protocol reader could not be initialized: {0}")]
    ReaderInit(#[source] std::io::Error),

    /// Frame-level error while reading or writing.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Payload serialization or deserialization failed.
    #[error("serializer error: {0}")]
    Serialize(#[from] SerializeError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
