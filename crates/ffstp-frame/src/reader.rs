use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};

use crate::error::{FrameError, Result};
use crate::grammar::{header_probe, DELIMITER, HEADER_PROBE_CHARS};
use crate::message::Message;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

// Longest UTF-8 encoding of a single scalar value.
const MAX_CHAR_BYTES: usize = 4;

/// Reads complete FFSTP messages from any `Read` stream.
///
/// Bytes are buffered internally and decoded as UTF-8 one character at a
/// time, so the length field can be honored as a character count.
pub struct FrameReader<R> {
    inner: R,
    buf: BytesMut,
}

impl<R: Read> FrameReader<R> {
    /// Create a new frame reader over a byte stream.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Parses one frame per the wire grammar. Exactly one of five parse
    /// errors is raised for a malformed frame, checked in grammar order:
    /// [`FrameError::InvalidHeader`], [`FrameError::LengthNotNumeric`] /
    /// [`FrameError::LengthNegative`], [`FrameError::MissingData`],
    /// [`FrameError::MessageTooLong`].
    ///
    /// A failed read leaves the stream position past whatever was
    /// consumed; the stream may be mid-frame and is not safe to read
    /// again without external resynchronization.
    pub fn read_message(&mut self) -> Result<Message<String>> {
        let header = self.read_exact_chars(HEADER_PROBE_CHARS)?;
        if header != header_probe() {
            return Err(FrameError::InvalidHeader { actual: header });
        }

        let status = self.read_until_delimiter()?;
        let raw_length = self.read_until_delimiter()?;
        let length = match raw_length.parse::<i64>() {
            Ok(value) if value < 0 => return Err(FrameError::LengthNegative { value }),
            Ok(value) => value as usize,
            Err(source) => {
                return Err(FrameError::LengthNotNumeric {
                    raw: raw_length,
                    source,
                })
            }
        };

        let body = self.read_exact_chars(length)?;
        let message = Message::new(status, body);

        // The writer emits the closing delimiter right after the body, so
        // the next delimited field must be empty.
        let extra = self.read_until_delimiter()?;
        if !extra.is_empty() {
            return Err(FrameError::MessageTooLong { message, extra });
        }

        tracing::trace!(status = message.status(), length, "message read");
        Ok(message)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    ///
    /// Any bytes already buffered past the last parsed frame are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read exactly `expected` characters.
    ///
    /// `expected` comes straight off the wire, so the pre-allocation is
    /// capped and the string grows only as data actually arrives.
    fn read_exact_chars(&mut self, expected: usize) -> Result<String> {
        let mut out = String::with_capacity(expected.min(READ_CHUNK_SIZE));
        for _ in 0..expected {
            match self.next_char()? {
                Some(ch) => out.push(ch),
                None => {
                    return Err(FrameError::MissingData {
                        expected: Some(expected),
                        partial: out,
                    })
                }
            }
        }
        Ok(out)
    }

    /// Read characters up to (not including) the next delimiter.
    fn read_until_delimiter(&mut self) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.next_char()? {
                Some(DELIMITER) => return Ok(out),
                Some(ch) => out.push(ch),
                None => {
                    return Err(FrameError::MissingData {
                        expected: None,
                        partial: out,
                    })
                }
            }
        }
    }

    /// Decode the next character, filling the buffer from the stream as
    /// needed. `None` means the stream ended cleanly at a character
    /// boundary.
    fn next_char(&mut self) -> Result<Option<char>> {
        loop {
            if let Some((ch, width)) = decode_first_char(&self.buf)? {
                self.buf.advance(width);
                return Ok(Some(ch));
            }
            if !self.fill()? {
                if !self.buf.is_empty() {
                    // Stream ended inside a multi-byte sequence.
                    if let Err(err) = std::str::from_utf8(&self.buf) {
                        return Err(FrameError::Encoding(err));
                    }
                }
                return Ok(None);
            }
        }
    }

    /// Pull one chunk from the stream. Returns `false` at end of stream.
    fn fill(&mut self) -> Result<bool> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(true);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }
}

/// Decode the first character of `buf` without consuming it.
///
/// Returns `Ok(None)` when the buffer is empty or holds only a prefix of
/// a multi-byte sequence, and the character plus its encoded width
/// otherwise.
fn decode_first_char(buf: &[u8]) -> Result<Option<(char, usize)>> {
    if buf.is_empty() {
        return Ok(None);
    }
    let probe = &buf[..buf.len().min(MAX_CHAR_BYTES)];
    let valid = match std::str::from_utf8(probe) {
        Ok(text) => text,
        Err(err) if err.valid_up_to() == 0 && err.error_len().is_none() => return Ok(None),
        Err(err) if err.valid_up_to() == 0 => return Err(FrameError::Encoding(err)),
        Err(err) => {
            std::str::from_utf8(&probe[..err.valid_up_to()]).map_err(FrameError::Encoding)?
        }
    };
    Ok(valid.chars().next().map(|ch| (ch, ch.len_utf8())))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;

    use super::*;
    use crate::grammar::encode_message;
    use crate::writer::FrameWriter;

    fn reader_for(wire: &str) -> FrameReader<Cursor<Vec<u8>>> {
        FrameReader::new(Cursor::new(wire.as_bytes().to_vec()))
    }

    #[test]
    fn read_single_message() {
        let mut reader = reader_for("FFS;OK;2;hi;");
        let message = reader.read_message().unwrap();
        assert_eq!(message, Message::ok("hi".to_string()));
    }

    #[test]
    fn read_multiple_messages() {
        let mut reader = reader_for("FFS;OK;3;one;FFS;ERROR;3;two;FFS;DIE;5;three;");

        assert_eq!(reader.read_message().unwrap(), Message::ok("one".to_string()));
        assert_eq!(reader.read_message().unwrap(), Message::error("two".to_string()));
        assert_eq!(reader.read_message().unwrap(), Message::die("three".to_string()));
    }

    #[test]
    fn body_with_delimiters_honors_length_prefix() {
        let mut reader = reader_for("FFS;OK;5;a;b;c;");
        let message = reader.read_message().unwrap();
        assert_eq!(message.data(), "a;b;c");
    }

    #[test]
    fn empty_body() {
        let mut reader = reader_for("FFS;OK;0;;");
        let message = reader.read_message().unwrap();
        assert_eq!(message, Message::ok(String::new()));
    }

    #[test]
    fn multibyte_body_counted_in_characters() {
        let mut reader = reader_for("FFS;OK;6;zażółć;");
        let message = reader.read_message().unwrap();
        assert_eq!(message.data(), "zażółć");
    }

    #[test]
    fn invalid_header_rejected() {
        let mut reader = reader_for("XXX;OK;2;hi;");
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::InvalidHeader { actual } if actual == "XXX;"));
    }

    #[test]
    fn header_probe_consumes_only_four_characters() {
        let mut reader = reader_for("NOPE-and-more-data");
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::InvalidHeader { actual } if actual == "NOPE"));
    }

    #[test]
    fn non_numeric_length_rejected() {
        let mut reader = reader_for("FFS;OK;abc;hi;");
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::LengthNotNumeric { raw, .. } if raw == "abc"));
    }

    #[test]
    fn negative_length_rejected() {
        let mut reader = reader_for("FFS;OK;-1;hi;");
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::LengthNegative { value: -1 }));
    }

    #[test]
    fn truncated_body_detected() {
        let mut reader = reader_for("FFS;OK;10;12345");
        let err = reader.read_message().unwrap_err();
        assert!(matches!(
            err,
            FrameError::MissingData { expected: Some(10), partial } if partial == "12345"
        ));
    }

    #[test]
    fn huge_length_prefix_does_not_preallocate() {
        // A hostile length field must not reserve gigabytes up front; the
        // read fails as soon as the stream runs dry.
        let mut reader = reader_for("FFS;OK;99999999999;");
        let err = reader.read_message().unwrap_err();
        assert!(matches!(
            err,
            FrameError::MissingData { expected: Some(99_999_999_999), partial } if partial.is_empty()
        ));
    }

    #[test]
    fn missing_status_delimiter_detected() {
        let mut reader = reader_for("FFS;OK");
        let err = reader.read_message().unwrap_err();
        assert!(matches!(
            err,
            FrameError::MissingData { expected: None, partial } if partial == "OK"
        ));
    }

    #[test]
    fn empty_stream_reports_missing_header() {
        let mut reader = reader_for("");
        let err = reader.read_message().unwrap_err();
        assert!(matches!(
            err,
            FrameError::MissingData { expected: Some(HEADER_PROBE_CHARS), partial } if partial.is_empty()
        ));
    }

    #[test]
    fn overlong_frame_retains_message_and_extra_data() {
        let mut reader = reader_for("FFS;OK;2;hiEXTRA;");
        let err = reader.read_message().unwrap_err();
        match err {
            FrameError::MessageTooLong { message, extra } => {
                assert_eq!(message, Message::ok("hi".to_string()));
                assert_eq!(extra, "EXTRA");
            }
            other => panic!("expected MessageTooLong, got {other:?}"),
        }
    }

    #[test]
    fn roundtrip_with_writer() {
        let mut buf = BytesMut::new();
        encode_message(&Message::new("CUSTOM_STATUS", "a;b\nc".to_string()), &mut buf).unwrap();

        let mut reader = FrameReader::new(Cursor::new(buf.to_vec()));
        let message = reader.read_message().unwrap();
        assert_eq!(message, Message::new("CUSTOM_STATUS", "a;b\nc".to_string()));
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: "FFS;OK;4;slow;".as_bytes().to_vec(),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);
        let message = reader.read_message().unwrap();
        assert_eq!(message, Message::ok("slow".to_string()));
    }

    #[test]
    fn multibyte_character_split_across_reads() {
        let byte_reader = ByteByByteReader {
            bytes: "FFS;OK;1;ż;".as_bytes().to_vec(),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);
        let message = reader.read_message().unwrap();
        assert_eq!(message.data(), "ż");
    }

    #[test]
    fn invalid_utf8_surfaces_encoding_error() {
        let mut wire = b"FFS;OK;2;".to_vec();
        wire.extend_from_slice(&[0xFF, 0xFE]);
        wire.push(b';');
        let mut reader = FrameReader::new(Cursor::new(wire));
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::Encoding(_)));
    }

    #[test]
    fn truncated_utf8_sequence_at_eof_is_encoding_error() {
        // "ż" is 0xC5 0xBC; drop the continuation byte.
        let mut wire = b"FFS;OK;1;".to_vec();
        wire.push(0xC5);
        let mut reader = FrameReader::new(Cursor::new(wire));
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::Encoding(_)));
    }

    #[test]
    fn interrupted_read_retries() {
        let inner = InterruptedThenData {
            interrupted: false,
            bytes: "FFS;OK;2;ok;".as_bytes().to_vec(),
            pos: 0,
        };
        let mut reader = FrameReader::new(inner);
        let message = reader.read_message().unwrap();
        assert_eq!(message, Message::ok("ok".to_string()));
    }

    #[test]
    fn io_error_propagates() {
        struct FailingReader;
        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::ConnectionReset))
            }
        }

        let mut reader = FrameReader::new(FailingReader);
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::ConnectionReset));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = reader_for("");
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[test]
    fn roundtrip_over_pipe() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        writer.write_message(&Message::ok("ping".to_string())).unwrap();
        let message = reader.read_message().unwrap();
        assert_eq!(message, Message::ok("ping".to_string()));
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
