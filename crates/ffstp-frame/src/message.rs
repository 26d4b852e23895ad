use std::borrow::Cow;
use std::fmt;

use crate::status::Status;

/// A single FFSTP message: a free-form status string plus a payload.
///
/// Messages are immutable once constructed. The status is only validated
/// against the wire grammar when a message is written, since messages may
/// carry arbitrary status strings produced by other systems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<T> {
    status: Cow<'static, str>,
    data: T,
}

impl<T> Message<T> {
    /// Create a message with an arbitrary status string.
    pub fn new(status: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self {
            status: status.into(),
            data,
        }
    }

    /// Create a message with a well-known status.
    pub fn with_status(status: Status, data: T) -> Self {
        Self::new(status.as_str(), data)
    }

    /// Message with the [`Status::Ok`] status.
    pub fn ok(data: T) -> Self {
        Self::with_status(Status::Ok, data)
    }

    /// Message with the [`Status::Error`] status.
    pub fn error(data: T) -> Self {
        Self::with_status(Status::Error, data)
    }

    /// Message with the [`Status::ErrorInvalidStatus`] status.
    pub fn error_invalid_status(data: T) -> Self {
        Self::with_status(Status::ErrorInvalidStatus, data)
    }

    /// Message with the [`Status::ErrorInvalidPayload`] status.
    pub fn error_invalid_payload(data: T) -> Self {
        Self::with_status(Status::ErrorInvalidPayload, data)
    }

    /// Message with the [`Status::Die`] status.
    pub fn die(data: T) -> Self {
        Self::with_status(Status::Die, data)
    }

    /// The status string of this message.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The status translated to the closed [`Status`] enum.
    ///
    /// Unrecognized statuses become [`Status::Unknown`].
    pub fn status_as_enum(&self) -> Status {
        Status::from(self.status())
    }

    /// The payload carried by this message.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Consume the message and return its payload.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Split the message into its status and payload.
    pub fn into_parts(self) -> (Cow<'static, str>, T) {
        (self.status, self.data)
    }

    /// Reassemble a message from parts produced by [`Message::into_parts`].
    pub fn from_parts(status: Cow<'static, str>, data: T) -> Self {
        Self { status, data }
    }

    /// Map the payload, keeping the status untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Message<U> {
        Message {
            status: self.status,
            data: f(self.data),
        }
    }
}

impl Message<String> {
    /// The canonical payload-free message: status `UNKNOWN`, empty body.
    ///
    /// A shared constant rather than a per-call allocation; safe to share
    /// because messages are immutable.
    pub const EMPTY: Message<String> =
        Message {
            status: Cow::Borrowed(Status::Unknown.as_str()),
            data: String::new(),
        };
}

impl<T: fmt::Display> fmt::Display for Message<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.to_string();
        write!(
            f,
            "Message({})[{};{}]",
            data.chars().count(),
            self.status,
            data
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_constructors() {
        assert_eq!(Message::ok("x").status(), "OK");
        assert_eq!(Message::error("x").status(), "ERROR");
        assert_eq!(Message::error_invalid_status("x").status(), "ERROR_INVALID_STATUS");
        assert_eq!(Message::error_invalid_payload("x").status(), "ERROR_INVALID_PAYLOAD");
        assert_eq!(Message::die("x").status(), "DIE");
    }

    #[test]
    fn free_form_status_passes_through() {
        let message = Message::new("SOMETHING_ELSE".to_string(), 42);
        assert_eq!(message.status(), "SOMETHING_ELSE");
        assert_eq!(message.status_as_enum(), Status::Unknown);
        assert_eq!(*message.data(), 42);
    }

    #[test]
    fn status_as_enum_recognizes_wire_names() {
        assert_eq!(Message::ok(()).status_as_enum(), Status::Ok);
        assert_eq!(Message::die(()).status_as_enum(), Status::Die);
    }

    #[test]
    fn empty_message_is_unknown_with_empty_body() {
        assert_eq!(Message::EMPTY.status(), "UNKNOWN");
        assert!(Message::EMPTY.data().is_empty());
        assert_eq!(Message::EMPTY.status_as_enum(), Status::Unknown);
    }

    #[test]
    fn equality_covers_status_and_payload() {
        assert_eq!(Message::ok("hi"), Message::new("OK", "hi"));
        assert_ne!(Message::ok("hi"), Message::error("hi"));
        assert_ne!(Message::ok("hi"), Message::ok("ho"));
    }

    #[test]
    fn display_reports_char_count() {
        let message = Message::ok("zażółć");
        assert_eq!(message.to_string(), "Message(6)[OK;zażółć]");
    }

    #[test]
    fn map_converts_payload_only() {
        let message = Message::new("CUSTOM", 5).map(|n| n.to_string());
        assert_eq!(message.status(), "CUSTOM");
        assert_eq!(message.data(), "5");
    }

    #[test]
    fn parts_roundtrip() {
        let (status, data) = Message::ok("body".to_string()).into_parts();
        let rebuilt = Message::from_parts(status, data);
        assert_eq!(rebuilt, Message::ok("body".to_string()));
    }
}
