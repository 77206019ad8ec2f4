//! JSON body helpers.

use bytes::Bytes;
use serde_json::Value;

use crate::Result;

/// MIME type of every body this library sends.
pub const APPLICATION_JSON: &str = "application/json";

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use lightnet_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Login { user: String }
///
/// let bytes = to_json(&Login { user: "alice".to_string() }).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"user":"alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes with path-aware error messages.
///
/// # Errors
///
/// Returns [`crate::Error::JsonDeserialization`] naming the path of the
/// offending field (e.g. `user.address.city`).
///
/// # Example
///
/// ```
/// use lightnet_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let user: User = from_json(br#"{"name":"Alice"}"#).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// `true` for a JSON object with at least one member.
///
/// Only such bodies are written on the wire.
#[must_use]
pub fn is_non_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(|object| !object.is_empty())
}
