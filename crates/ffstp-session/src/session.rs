use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use ffstp_frame::{FrameReader, FrameWriter, Message};

use crate::error::{Result, SessionError};
use crate::serializer::Serializer;

/// Transport-level knobs applied by the convenience constructors.
///
/// The session logic itself is timeout-agnostic; a timeout that fires
/// surfaces as an I/O error from the blocked primitive.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Read timeout for the reader half. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Write timeout for the writer half. `None` blocks indefinitely.
    pub write_timeout: Option<Duration>,
}

/// A reader + writer + serializer bound to one open stream.
///
/// The session wraps the transport, it does not own it: dropping or
/// closing the session tears down only the wrapper layers. The two
/// halves are independent streams — a session may be split into its
/// halves and driven by one reader thread and one writer thread, but a
/// single half must never be driven by two threads at once.
pub struct Session<R, W, S> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    serializer: S,
}

impl<R: Read, W: Write, S: Serializer> Session<R, W, S> {
    /// Build a session from already-split reader and writer halves.
    pub fn new(reader: R, writer: W, serializer: S) -> Self {
        Self {
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(writer),
            serializer,
        }
    }

    /// Serialize the payload and write one message (one-way send).
    ///
    /// The frame is flushed before this returns; there is no wait for
    /// any remote acknowledgment.
    pub fn send(&mut self, message: &Message<S::Value>) -> Result<()> {
        let payload = self.serializer.serialize(message.data())?;
        let wire = Message::new(message.status().to_string(), payload);
        self.writer.write_message(&wire)?;
        tracing::debug!(status = message.status(), "message sent");
        Ok(())
    }

    /// Block until one message arrives and deserialize its payload
    /// (one-way receive).
    pub fn recv(&mut self) -> Result<Message<S::Value>> {
        let wire = self.reader.read_message()?;
        tracing::debug!(status = wire.status(), "message received");
        let (status, payload) = wire.into_parts();
        let value = self.serializer.deserialize(&payload)?;
        Ok(Message::from_parts(status, value))
    }

    /// Send a request, then block until the response arrives.
    pub fn request(&mut self, message: &Message<S::Value>) -> Result<Message<S::Value>> {
        self.send(message)?;
        self.recv()
    }

    /// Block until a request arrives, let the handler produce the
    /// response, and send it back.
    pub fn reply<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnOnce(Message<S::Value>) -> Message<S::Value>,
    {
        let request = self.recv()?;
        let response = handler(request);
        self.send(&response)
    }

    /// Borrow the serializer.
    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    /// Split the session into its reader half, writer half, and
    /// serializer.
    pub fn into_parts(self) -> (FrameReader<R>, FrameWriter<W>, S) {
        (self.reader, self.writer, self.serializer)
    }

    /// Tear down the wrapper layers, reader half first.
    ///
    /// The writer flush runs regardless of the reader half teardown; the
    /// underlying transport connection is left open for the caller.
    pub fn close(self) -> Result<()> {
        let Session {
            reader,
            mut writer,
            serializer: _,
        } = self;
        drop(reader);
        writer.flush()?;
        Ok(())
    }
}

impl<S: Serializer> Session<TcpStream, TcpStream, S> {
    /// Wrap an already-connected TCP stream.
    ///
    /// The stream is borrowed: the session works over cloned handles and
    /// the caller keeps ownership of `stream`, including its cleanup if
    /// construction fails. The writer half is initialized first; a
    /// failure surfaces as [`SessionError::WriterInit`] or
    /// [`SessionError::ReaderInit`] naming the half that failed.
    pub fn from_tcp_stream(stream: &TcpStream, serializer: S) -> Result<Self> {
        Self::from_tcp_stream_with_config(stream, serializer, &SessionConfig::default())
    }

    /// Wrap a TCP stream and apply per-half timeouts.
    pub fn from_tcp_stream_with_config(
        stream: &TcpStream,
        serializer: S,
        config: &SessionConfig,
    ) -> Result<Self> {
        let writer_stream = stream.try_clone().map_err(SessionError::WriterInit)?;
        writer_stream
            .set_write_timeout(config.write_timeout)
            .map_err(SessionError::WriterInit)?;

        let reader_stream = stream.try_clone().map_err(SessionError::ReaderInit)?;
        reader_stream
            .set_read_timeout(config.read_timeout)
            .map_err(SessionError::ReaderInit)?;

        Ok(Self::new(reader_stream, writer_stream, serializer))
    }
}

#[cfg(unix)]
impl<S: Serializer> Session<std::os::unix::net::UnixStream, std::os::unix::net::UnixStream, S> {
    /// Wrap an already-connected Unix domain socket stream.
    ///
    /// Same ownership and initialization-order rules as
    /// [`Session::from_tcp_stream`].
    pub fn from_unix_stream(stream: &std::os::unix::net::UnixStream, serializer: S) -> Result<Self> {
        Self::from_unix_stream_with_config(stream, serializer, &SessionConfig::default())
    }

    /// Wrap a Unix domain socket stream and apply per-half timeouts.
    pub fn from_unix_stream_with_config(
        stream: &std::os::unix::net::UnixStream,
        serializer: S,
        config: &SessionConfig,
    ) -> Result<Self> {
        let writer_stream = stream.try_clone().map_err(SessionError::WriterInit)?;
        writer_stream
            .set_write_timeout(config.write_timeout)
            .map_err(SessionError::WriterInit)?;

        let reader_stream = stream.try_clone().map_err(SessionError::ReaderInit)?;
        reader_stream
            .set_read_timeout(config.read_timeout)
            .map_err(SessionError::ReaderInit)?;

        Ok(Self::new(reader_stream, writer_stream, serializer))
    }
}
