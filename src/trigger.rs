//! Defines a _trigger_, the input for one handler invocation. The
//! trigger is built from the EventBridge notification emitted when an
//! object is created in the source bucket.

use serde::Deserialize;
use serde_json::Value;

/// The subset of an EventBridge S3 object-created event that the
/// handler cares about. Every level is optional so that any JSON
/// payload deserializes; a missing level marks the event as
/// unrecognized instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct TriggerEvent {
    #[serde(default)]
    detail: Option<Detail>,
}

#[derive(Debug, Default, Deserialize)]
struct Detail {
    #[serde(default)]
    object: Option<ObjectRef>,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectRef {
    #[serde(default)]
    key: Option<String>,
}

impl TriggerEvent {
    /// Extracts the created object's key from a raw event payload.
    /// Returns `None` when the payload doesn't expose
    /// `detail.object.key`, including payloads where some level has
    /// the wrong JSON type.
    pub fn object_key(event: &Value) -> Option<String> {
        TriggerEvent::deserialize(event).ok()?.detail?.object?.key
    }
}
