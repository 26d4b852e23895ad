use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::message::Message;

/// Fixed protocol header opening every frame.
pub const HEADER: &str = "FFS";

/// Field separator. Reserved everywhere outside the length-prefixed body.
pub const DELIMITER: char = ';';

/// Characters in the header probe: the header plus one delimiter.
pub const HEADER_PROBE_CHARS: usize = HEADER.len() + 1;

/// Encode a message into the wire format.
///
/// Wire format (character based, UTF-8 on the wire):
///
/// ```text
/// ┌────────┬───┬────────┬───┬────────┬───┬──────────────────┬───┐
/// │ "FFS"  │ ; │ STATUS │ ; │ LENGTH │ ; │ BODY             │ ; │
/// │ header │   │        │   │ chars  │   │ (LENGTH chars)   │   │
/// └────────┴───┴────────┴───┴────────┴───┴──────────────────┴───┘
/// ```
///
/// The status is the only validated field: the grammar has no escaping,
/// so a status containing the delimiter is rejected with
/// [`FrameError::InvalidStatus`] before anything is appended to `dst`.
pub fn encode_message(message: &Message<String>, dst: &mut BytesMut) -> Result<()> {
    let status = message.status();
    if status.contains(DELIMITER) {
        return Err(FrameError::InvalidStatus {
            status: status.to_string(),
        });
    }

    let body = message.data().as_str();
    let length = body.chars().count().to_string();

    dst.reserve(HEADER.len() + status.len() + length.len() + body.len() + 4 * DELIMITER.len_utf8());
    dst.put_slice(HEADER.as_bytes());
    put_delimiter(dst);
    dst.put_slice(status.as_bytes());
    put_delimiter(dst);
    dst.put_slice(length.as_bytes());
    put_delimiter(dst);
    dst.put_slice(body.as_bytes());
    put_delimiter(dst);
    Ok(())
}

fn put_delimiter(dst: &mut BytesMut) {
    let mut scratch = [0u8; 4];
    dst.put_slice(DELIMITER.encode_utf8(&mut scratch).as_bytes());
}

/// The expected header probe, as read off the stream: `FFS;`.
pub(crate) fn header_probe() -> String {
    let mut probe = String::with_capacity(HEADER.len() + DELIMITER.len_utf8());
    probe.push_str(HEADER);
    probe.push(DELIMITER);
    probe
}
