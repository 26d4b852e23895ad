use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Errors raised by payload serializers.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload cannot be represented by this serializer.
    #[error("payload is not representable by this serializer: {reason}")]
    Unrepresentable { reason: String },

    /// The serializer does not implement the requested operation.
    #[error("{operation} is not supported by this serializer")]
    Unsupported { operation: &'static str },
}

/// Converts typed payloads to and from the wire's opaque string form.
///
/// Can be anything, really: JSON, raw bytes, even XML. If you can make a
/// `String` out of it, the wire will take it. Implementations must be
/// reversible: `deserialize(serialize(x)) == x` for every representable
/// `x`. A serializer that only implements one direction must fail the
/// other with [`SerializeError::Unsupported`] rather than guessing.
pub trait Serializer {
    /// The payload type this serializer handles.
    type Value;

    /// Serialize a payload into its wire representation.
    fn serialize(&self, value: &Self::Value) -> Result<String, SerializeError>;

    /// Deserialize a wire payload back into a value.
    fn deserialize(&self, payload: &str) -> Result<Self::Value, SerializeError>;
}

/// JSON payload serializer backed by serde.
#[derive(Debug)]
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonSerializer<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Serializer for JsonSerializer<T> {
    type Value = T;

    fn serialize(&self, value: &T) -> Result<String, SerializeError> {
        Ok(serde_json::to_string(value)?)
    }

    fn deserialize(&self, payload: &str) -> Result<T, SerializeError> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Passthrough serializer for when payloads are already plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringSerializer;

impl Serializer for StringSerializer {
    type Value = String;

    fn serialize(&self, value: &String) -> Result<String, SerializeError> {
        Ok(value.clone())
    }

    fn deserialize(&self, payload: &str) -> Result<String, SerializeError> {
        Ok(payload.to_string())
    }
}

/// Serializer for raw byte payloads.
///
/// Each byte maps to the Unicode scalar with the same value
/// (U+0000..=U+00FF), so arbitrary bytes survive the character-counted
/// wire. A payload containing any character at or above U+0100 was not
/// produced by this serializer and fails to deserialize.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteSerializer;

impl Serializer for ByteSerializer {
    type Value = Vec<u8>;

    fn serialize(&self, value: &Vec<u8>) -> Result<String, SerializeError> {
        Ok(value.iter().map(|&byte| char::from(byte)).collect())
    }

    fn deserialize(&self, payload: &str) -> Result<Vec<u8>, SerializeError> {
        payload
            .chars()
            .map(|ch| {
                u8::try_from(u32::from(ch)).map_err(|_| SerializeError::Unrepresentable {
                    reason: format!("character {ch:?} is outside the byte range"),
                })
            })
            .collect()
    }
}
