//! Response envelope unwrapping.
//!
//! Every response body is a single-key object (`{"listzonesresponse": {..}}`)
//! wrapping the real payload.

use serde_json::Value;

use crate::error::CloudStackError;

/// Parses `body` and returns the value under its single key.
///
/// ## Errors
///
/// Returns [`CloudStackError::Json`] if the body is not JSON and
/// [`CloudStackError::Envelope`] if it is not a non-empty object.
pub fn unwrap_envelope(body: &[u8]) -> Result<Value, CloudStackError> {
    let value: Value = serde_json::from_slice(body)?;
    unwrap_value(value)
}

/// Returns the value under the single key of an already parsed envelope.
///
/// When the object carries more than one key the first (in key order) wins.
///
/// ## Examples
///
/// ```
/// use cloudstack_runtime::envelope::unwrap_value;
/// use serde_json::json;
///
/// let inner = unwrap_value(json!({"listzonesresponse": {"count": 0}})).unwrap();
/// assert_eq!(inner, json!({"count": 0}));
/// ```
pub fn unwrap_value(value: Value) -> Result<Value, CloudStackError> {
    match value {
        Value::Object(map) if map.is_empty() => Err(CloudStackError::Envelope {
            body: "{}".to_string(),
        }),
        Value::Object(map) => Ok(map.into_iter().next().map(|(_, v)| v).unwrap_or_default()),
        other => Err(CloudStackError::Envelope {
            body: other.to_string(),
        }),
    }
}
