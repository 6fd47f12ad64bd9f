//! Versioned, device-tagged save-state blocks.
//!
//! Every device serializes into its own block:
//!
//! ```json
//! { "device": "TIA", "version": 1, "body": { ... } }
//! ```
//!
//! The tag and version are checked before the body is decoded, so a block
//! written by another device (or a future format) is rejected without
//! touching the receiver.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state is not valid JSON for this device: {0}")]
    Json(#[from] serde_json::Error),
    #[error("state belongs to device {found:?}, expected {expected:?}")]
    DeviceMismatch { expected: String, found: String },
    #[error("unsupported {device} state version {found} (supported: {supported})")]
    UnsupportedVersion {
        device: String,
        found: u64,
        supported: u32,
    },
    #[error("state is missing field {0:?}")]
    MissingField(&'static str),
    #[error("state field {field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("{what} has {found} bytes, expected {expected}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Wrap `body` in a block tagged with `device` and `version`.
pub fn save_block<T: Serialize>(device: &str, version: u32, body: &T) -> Result<Value, StateError> {
    Ok(json!({
        "device": device,
        "version": version,
        "body": serde_json::to_value(body)?,
    }))
}

/// Check the tag and version of `block`, then decode its body.
pub fn load_block<T: DeserializeOwned>(
    block: &Value,
    device: &str,
    version: u32,
) -> Result<T, StateError> {
    let found = block
        .get("device")
        .and_then(Value::as_str)
        .ok_or(StateError::MissingField("device"))?;
    if found != device {
        return Err(StateError::DeviceMismatch {
            expected: device.to_string(),
            found: found.to_string(),
        });
    }

    let found_version = block
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(StateError::MissingField("version"))?;
    if found_version != u64::from(version) {
        return Err(StateError::UnsupportedVersion {
            device: device.to_string(),
            found: found_version,
            supported: version,
        });
    }

    let body = block.get("body").ok_or(StateError::MissingField("body"))?;
    Ok(T::deserialize(body)?)
}
