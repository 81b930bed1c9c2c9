//! Stored record model shared by every backend.

use crate::errors::DomainError;
use serde::{Deserialize, Serialize};

/// The quantitative change an event represents.
///
/// `Assert` (+1) records a fact; `Retract` (-1) withdraws one. Maintenance
/// removes an assert/retract pair with byte-equal payloads for the same
/// type and key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// The event asserts a fact (+1).
    Assert,
    /// The event retracts a fact (-1).
    Retract,
}

impl Change {
    /// Converts from the wire representation. Only +1 and -1 are valid.
    pub fn from_i64(value: i64) -> Result<Self, DomainError> {
        match value {
            1 => Ok(Change::Assert),
            -1 => Ok(Change::Retract),
            other => Err(DomainError::InvalidChange(other)),
        }
    }

    /// Returns the wire representation (+1 or -1).
    pub fn as_i64(self) -> i64 {
        match self {
            Change::Assert => 1,
            Change::Retract => -1,
        }
    }

    /// Returns the opposite sign.
    pub fn inverse(self) -> Self {
        match self {
            Change::Assert => Change::Retract,
            Change::Retract => Change::Assert,
        }
    }
}

impl Serialize for Change {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

impl<'de> Deserialize<'de> for Change {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Change::from_i64(value).map_err(serde::de::Error::custom)
    }
}

/// The role a stored row plays within its originating event.
///
/// An event without a `removed` payload stores one `Sole` row. An event
/// with a `removed` payload stores two rows sharing the event id: a
/// `Primary` row carrying the body with the event's change, and a
/// `Secondary` row carrying the removed payload with the opposite change.
/// Queries return `Sole` and `Primary` rows; `Secondary` rows exist only
/// for the maintenance engine to pair against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordRole {
    /// The only row of a plain event.
    Sole,
    /// The body half of a paired event.
    Primary,
    /// The removed half of a paired event; invisible to queries.
    Secondary,
}

/// A record's position within its partition: stored timestamp plus a
/// per-partition insertion sequence number.
///
/// Ordering is by timestamp, then by sequence number: the documented
/// tie-break for events stored with identical timestamps. Sequence numbers
/// are never reused, so positions identify rows uniquely for the lifetime
/// of a partition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// Caller-supplied store timestamp.
    pub timestamp: i64,
    /// Per-partition insertion counter.
    pub seq: u64,
}

impl Position {
    /// The smallest position at or after `since`, for range scans.
    pub fn floor(since: i64) -> Self {
        Position {
            timestamp: since,
            seq: 0,
        }
    }
}

/// A stored row, extracted from an application event through its
/// [`EventDomain`](crate::EventDomain) adapter.
///
/// `payload` holds the adapter's serialized bytes for `Sole` and `Primary`
/// rows and is empty for `Secondary` rows, which are never returned to
/// callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Caller-assigned unique event id.
    pub id: String,
    /// Event type name.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Partitioning and lookup key.
    #[serde(with = "b64")]
    pub key: Vec<u8>,
    /// +1 asserts, -1 retracts.
    pub change: Change,
    /// The payload this row carries (the body for `Sole`/`Primary` rows,
    /// the removed payload for `Secondary` rows).
    #[serde(with = "b64")]
    pub data: Vec<u8>,
    /// Which half of its event this row is.
    pub role: RecordRole,
    /// The adapter's serialized event bytes; empty for `Secondary` rows.
    #[serde(with = "b64")]
    pub payload: Vec<u8>,
}

impl StoredRecord {
    /// True if queries should return this row.
    pub fn visible(&self) -> bool {
        self.role != RecordRole::Secondary
    }
}

/// Base64url-no-pad encoding for byte fields in JSON payloads.
///
/// For use with `#[serde(with = "b64")]` on `Vec<u8>` fields.
pub mod b64 {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes bytes as a base64url-no-pad string.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Deserializes bytes from a base64url-no-pad string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        URL_SAFE_NO_PAD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> StoredRecord {
        StoredRecord {
            id: "e1".to_string(),
            event_type: "follow".to_string(),
            key: b"user-1".to_vec(),
            change: Change::Assert,
            data: b"user-2".to_vec(),
            role: RecordRole::Sole,
            payload: b"{\"id\":\"e1\"}".to_vec(),
        }
    }

    #[test]
    fn change_round_trips_through_wire_values() {
        assert_eq!(Change::from_i64(1).unwrap(), Change::Assert);
        assert_eq!(Change::from_i64(-1).unwrap(), Change::Retract);
        assert_eq!(Change::Assert.as_i64(), 1);
        assert_eq!(Change::Retract.as_i64(), -1);
        assert_eq!(Change::Assert.inverse(), Change::Retract);
    }

    #[test]
    fn change_rejects_other_values() {
        assert!(Change::from_i64(0).is_err());
        assert!(Change::from_i64(2).is_err());
        assert!(Change::from_i64(-7).is_err());
    }

    #[test]
    fn position_orders_by_timestamp_then_seq() {
        let a = Position {
            timestamp: 5,
            seq: 9,
        };
        let b = Position {
            timestamp: 6,
            seq: 0,
        };
        let c = Position {
            timestamp: 6,
            seq: 1,
        };
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn record_serde_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: StoredRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn record_serializes_bytes_as_base64() {
        let json = serde_json::to_value(sample_record()).unwrap();
        // "user-1" in base64url-no-pad
        assert_eq!(json["key"], "dXNlci0x");
        assert_eq!(json["change"], 1);
        assert_eq!(json["role"], "sole");
    }
}
