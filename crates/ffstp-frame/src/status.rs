use std::fmt;

/// Well-known message statuses.
///
/// The status field on the wire is free-form text, so the mapping from a
/// wire string to this enum is total: anything unrecognized becomes
/// [`Status::Unknown`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Error,
    ErrorInvalidStatus,
    ErrorInvalidPayload,
    Die,
    Unknown,
}

impl Status {
    /// The wire name of this status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Error => "ERROR",
            Status::ErrorInvalidStatus => "ERROR_INVALID_STATUS",
            Status::ErrorInvalidPayload => "ERROR_INVALID_PAYLOAD",
            Status::Die => "DIE",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl From<&str> for Status {
    fn from(name: &str) -> Self {
        match name {
            "OK" => Status::Ok,
            "ERROR" => Status::Error,
            "ERROR_INVALID_STATUS" => Status::ErrorInvalidStatus,
            "ERROR_INVALID_PAYLOAD" => Status::ErrorInvalidPayload,
            "DIE" => Status::Die,
            _ => Status::Unknown,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
