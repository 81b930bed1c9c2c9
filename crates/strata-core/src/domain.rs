//! The event-representation adapter trait.

use crate::errors::DomainError;
use crate::record::{Change, RecordRole, StoredRecord};

/// Adapter over an application-defined event representation.
///
/// The store never inspects events beyond these functions: it extracts the
/// fields it indexes on, persists the adapter's serialized bytes, and hands
/// them back through `deserialize` when queried. Adapters are stateless and
/// shared across every partition and thread.
///
/// An event whose `removed` payload is present represents two paired
/// events: the body with the event's change, and the removed payload with
/// the opposite change. Domains without paired events keep the default
/// `removed` implementation.
pub trait EventDomain: Send + Sync {
    /// The opaque application event type.
    type Event;

    /// The event's globally unique, caller-assigned id.
    fn id(&self, event: &Self::Event) -> String;

    /// The event's type name (e.g. "follow", "comment").
    fn event_type(&self, event: &Self::Event) -> String;

    /// The event's non-unique partitioning key.
    fn key(&self, event: &Self::Event) -> Vec<u8>;

    /// Whether the event asserts (+1) or retracts (-1) a fact.
    fn change(&self, event: &Self::Event) -> Change;

    /// The event's body payload, excluding id, key, and change.
    fn body(&self, event: &Self::Event) -> Vec<u8>;

    /// The paired removed payload, when this event stands for two.
    fn removed(&self, event: &Self::Event) -> Option<Vec<u8>> {
        let _ = event;
        None
    }

    /// Serializes the event for storage.
    fn serialize(&self, event: &Self::Event) -> Vec<u8>;

    /// Reconstructs an event from bytes produced by `serialize`.
    fn deserialize(&self, bytes: &[u8]) -> Result<Self::Event, DomainError>;
}

/// Expands one application event into its stored rows.
///
/// A plain event yields a single `Sole` row. An event with a `removed`
/// payload yields a `Primary` row (body, event's change) and a `Secondary`
/// row (removed payload, opposite change) sharing the event id.
pub fn expand_event<D: EventDomain>(domain: &D, event: &D::Event) -> Vec<StoredRecord> {
    let id = domain.id(event);
    let event_type = domain.event_type(event);
    let key = domain.key(event);
    let change = domain.change(event);
    match domain.removed(event) {
        None => vec![StoredRecord {
            id,
            event_type,
            key,
            change,
            data: domain.body(event),
            role: RecordRole::Sole,
            payload: domain.serialize(event),
        }],
        Some(removed) => vec![
            StoredRecord {
                id: id.clone(),
                event_type: event_type.clone(),
                key: key.clone(),
                change,
                data: domain.body(event),
                role: RecordRole::Primary,
                payload: domain.serialize(event),
            },
            StoredRecord {
                id,
                event_type,
                key,
                change: change.inverse(),
                data: removed,
                role: RecordRole::Secondary,
                payload: Vec::new(),
            },
        ],
    }
}
