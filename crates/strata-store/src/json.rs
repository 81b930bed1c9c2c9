//! JSON event domain adapter.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use strata_core::{Change, DomainError, EventDomain};

/// [`EventDomain`] over plain JSON objects.
///
/// An event is an object with string `id` and `type`, base64url-no-pad
/// `key` and `data` fields, integer `change` (+1 or -1), and an optional
/// base64url `removed` field. Serialization is the JSON text itself.
///
/// Call [`JsonEventDomain::validate`] on untrusted input before storing
/// it; the accessor functions assume a validated event and fall back to
/// neutral values on malformed fields rather than panicking.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEventDomain;

impl JsonEventDomain {
    /// Builds a well-formed event object.
    pub fn event(id: &str, event_type: &str, key: &[u8], change: Change, data: &[u8]) -> Value {
        json!({
            "id": id,
            "type": event_type,
            "key": URL_SAFE_NO_PAD.encode(key),
            "change": change.as_i64(),
            "data": URL_SAFE_NO_PAD.encode(data),
        })
    }

    /// Builds an event that stands for a pair: the body with `change`,
    /// and `removed` with the opposite change.
    pub fn paired_event(
        id: &str,
        event_type: &str,
        key: &[u8],
        change: Change,
        data: &[u8],
        removed: &[u8],
    ) -> Value {
        let mut event = Self::event(id, event_type, key, change, data);
        event["removed"] = Value::String(URL_SAFE_NO_PAD.encode(removed));
        event
    }

    /// Checks that a JSON value is a well-formed event object.
    pub fn validate(event: &Value) -> Result<(), DomainError> {
        let object = event
            .as_object()
            .ok_or_else(|| DomainError::Malformed("event is not an object".to_string()))?;

        for field in ["id", "type"] {
            if !object.get(field).map(Value::is_string).unwrap_or(false) {
                return Err(DomainError::Malformed(format!(
                    "missing or non-string \"{field}\" field"
                )));
            }
        }
        for field in ["key", "data"] {
            let encoded = object
                .get(field)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    DomainError::Malformed(format!("missing or non-string \"{field}\" field"))
                })?;
            if URL_SAFE_NO_PAD.decode(encoded).is_err() {
                return Err(DomainError::Malformed(format!(
                    "\"{field}\" is not base64url"
                )));
            }
        }
        if let Some(removed) = object.get("removed") {
            let encoded = removed.as_str().ok_or_else(|| {
                DomainError::Malformed("non-string \"removed\" field".to_string())
            })?;
            if URL_SAFE_NO_PAD.decode(encoded).is_err() {
                return Err(DomainError::Malformed(
                    "\"removed\" is not base64url".to_string(),
                ));
            }
        }
        let change = object
            .get("change")
            .and_then(Value::as_i64)
            .ok_or_else(|| DomainError::Malformed("missing \"change\" field".to_string()))?;
        Change::from_i64(change)?;
        Ok(())
    }

    fn bytes_field(event: &Value, field: &str) -> Vec<u8> {
        event
            .get(field)
            .and_then(Value::as_str)
            .and_then(|encoded| URL_SAFE_NO_PAD.decode(encoded).ok())
            .unwrap_or_default()
    }
}

impl EventDomain for JsonEventDomain {
    type Event = Value;

    fn id(&self, event: &Value) -> String {
        event
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn event_type(&self, event: &Value) -> String {
        event
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn key(&self, event: &Value) -> Vec<u8> {
        Self::bytes_field(event, "key")
    }

    fn change(&self, event: &Value) -> Change {
        event
            .get("change")
            .and_then(Value::as_i64)
            .and_then(|value| Change::from_i64(value).ok())
            .unwrap_or(Change::Assert)
    }

    fn body(&self, event: &Value) -> Vec<u8> {
        Self::bytes_field(event, "data")
    }

    fn removed(&self, event: &Value) -> Option<Vec<u8>> {
        event
            .get("removed")
            .and_then(Value::as_str)
            .and_then(|encoded| URL_SAFE_NO_PAD.decode(encoded).ok())
    }

    fn serialize(&self, event: &Value) -> Vec<u8> {
        // Serializing a Value cannot fail: keys are already strings.
        serde_json::to_vec(event).unwrap_or_default()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, DomainError> {
        serde_json::from_slice(bytes).map_err(|e| DomainError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_builder_round_trips_through_adapter() {
        let domain = JsonEventDomain;
        let event = JsonEventDomain::event("e1", "like", b"u1", Change::Assert, b"post42");
        JsonEventDomain::validate(&event).unwrap();

        assert_eq!(domain.id(&event), "e1");
        assert_eq!(domain.event_type(&event), "like");
        assert_eq!(domain.key(&event), b"u1");
        assert_eq!(domain.change(&event), Change::Assert);
        assert_eq!(domain.body(&event), b"post42");
        assert_eq!(domain.removed(&event), None);

        let bytes = domain.serialize(&event);
        assert_eq!(domain.deserialize(&bytes).unwrap(), event);
    }

    #[test]
    fn paired_event_carries_removed_payload() {
        let domain = JsonEventDomain;
        let event = JsonEventDomain::paired_event(
            "e1",
            "profile",
            b"u1",
            Change::Assert,
            b"new-name",
            b"old-name",
        );
        JsonEventDomain::validate(&event).unwrap();
        assert_eq!(domain.removed(&event), Some(b"old-name".to_vec()));
    }

    #[test]
    fn validate_rejects_malformed_events() {
        assert!(JsonEventDomain::validate(&json!([])).is_err());
        assert!(JsonEventDomain::validate(&json!({"id": "e1"})).is_err());
        assert!(JsonEventDomain::validate(&json!({
            "id": "e1", "type": "like", "key": "!!", "change": 1, "data": ""
        }))
        .is_err());
        assert!(JsonEventDomain::validate(&json!({
            "id": "e1", "type": "like", "key": "", "change": 2, "data": ""
        }))
        .is_err());
    }
}
