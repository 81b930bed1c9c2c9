use serde_json::Value;
use strata_store::{
    Change, EventStore, JsonEventDomain, RoutingError, StoreConfig, StoreError,
};
use tempfile::TempDir;

fn config(num_shards: u16, replication_factor: u16) -> StoreConfig {
    StoreConfig {
        num_shards,
        replication_factor,
    }
}

fn like(id: &str, key: &[u8], change: Change, data: &[u8]) -> Value {
    JsonEventDomain::event(id, "like", key, change, data)
}

fn ids(events: &[Value]) -> Vec<String> {
    events
        .iter()
        .map(|e| e["id"].as_str().unwrap_or("?").to_string())
        .collect()
}

#[test]
fn test_store_then_get() {
    let store = EventStore::in_memory(JsonEventDomain, config(4, 2)).unwrap();

    let e1 = like("e1", b"u1", Change::Assert, b"post42");
    let e2 = like("e2", b"u1", Change::Assert, b"post43");
    store.store(&[e1, e2], 0, 100).unwrap();

    let page = store.get("like", b"u1", 0, 0).unwrap();
    assert!(page.is_terminal());
    assert_eq!(ids(&page.events), ["e1", "e2"]);

    // Different type on the same key sees nothing.
    let page = store.get("comment", b"u1", 0, 0).unwrap();
    assert!(page.events.is_empty());
}

#[test]
fn test_since_filters_by_timestamp_inclusive() {
    let store = EventStore::in_memory(JsonEventDomain, config(1, 1)).unwrap();

    store
        .store(&[like("e1", b"u1", Change::Assert, b"a")], 0, 100)
        .unwrap();
    store
        .store(&[like("e2", b"u1", Change::Assert, b"b")], 0, 200)
        .unwrap();
    store
        .store(&[like("e3", b"u1", Change::Assert, b"c")], 0, 300)
        .unwrap();

    let page = store.get("like", b"u1", 0, 200).unwrap();
    assert_eq!(ids(&page.events), ["e2", "e3"]);
}

#[test]
fn test_equal_timestamps_keep_insertion_order() {
    let store = EventStore::in_memory(JsonEventDomain, config(1, 1)).unwrap();

    for id in ["e1", "e2", "e3"] {
        store
            .store(&[like(id, b"u1", Change::Assert, id.as_bytes())], 0, 50)
            .unwrap();
    }

    let page = store.get("like", b"u1", 0, 0).unwrap();
    assert_eq!(ids(&page.events), ["e1", "e2", "e3"]);
}

#[test]
fn test_replicas_are_independent() {
    let store = EventStore::in_memory(JsonEventDomain, config(2, 3)).unwrap();

    store
        .store(&[like("e1", b"u1", Change::Assert, b"post42")], 1, 100)
        .unwrap();

    assert_eq!(store.get("like", b"u1", 1, 0).unwrap().events.len(), 1);
    assert!(store.get("like", b"u1", 0, 0).unwrap().events.is_empty());
    assert!(store.get("like", b"u1", 2, 0).unwrap().events.is_empty());
}

#[test]
fn test_routing_errors_are_never_clamped() {
    let store = EventStore::in_memory(JsonEventDomain, config(2, 2)).unwrap();

    assert!(matches!(
        store.get("like", b"u1", 2, 0),
        Err(StoreError::Routing(RoutingError::ReplicaOutOfRange { index: 2, .. }))
    ));
    assert!(matches!(
        store.scan_keys(2, 0),
        Err(StoreError::Routing(RoutingError::ShardOutOfRange { index: 2, .. }))
    ));
    assert!(matches!(
        store.store(&[like("e1", b"u1", Change::Assert, b"x")], 5, 0),
        Err(StoreError::Routing(RoutingError::ReplicaOutOfRange { index: 5, .. }))
    ));
}

#[test]
fn test_mixed_shard_batch_is_rejected() {
    let store = EventStore::in_memory(JsonEventDomain, config(16, 1)).unwrap();

    // Find two keys on different shards.
    let mut keys = (0u32..).map(|i| format!("user-{i}"));
    let first = keys.next().unwrap();
    let other = keys
        .find(|k| {
            strata_store::shard_of(k.as_bytes(), 16)
                != strata_store::shard_of(first.as_bytes(), 16)
        })
        .unwrap();

    let batch = [
        like("e1", first.as_bytes(), Change::Assert, b"x"),
        like("e2", other.as_bytes(), Change::Assert, b"y"),
    ];
    assert!(matches!(
        store.store(&batch, 0, 0),
        Err(StoreError::Routing(RoutingError::MixedBatch { .. }))
    ));

    // Nothing from the rejected batch is visible.
    assert!(store
        .get("like", first.as_bytes(), 0, 0)
        .unwrap()
        .events
        .is_empty());
}

#[test]
fn test_empty_batch_is_a_no_op() {
    let store = EventStore::in_memory(JsonEventDomain, config(2, 1)).unwrap();
    store.store(&[], 0, 100).unwrap();
    assert!(store.scan_keys(0, 0).unwrap().is_empty());
    assert!(store.scan_keys(1, 0).unwrap().is_empty());
}

#[test]
fn test_scan_keys_returns_values_acceptable_to_get() {
    let store = EventStore::in_memory(JsonEventDomain, config(1, 1)).unwrap();

    store
        .store(&[like("e1", b"u1", Change::Assert, b"a")], 0, 1)
        .unwrap();
    store
        .store(&[like("e2", b"u2", Change::Assert, b"b")], 0, 2)
        .unwrap();

    let keys = store.scan_keys(0, 0).unwrap();
    assert_eq!(keys, vec![b"u1".to_vec(), b"u2".to_vec()]);
    for key in &keys {
        assert_eq!(store.get("like", key, 0, 0).unwrap().events.len(), 1);
    }
}

#[test]
fn test_association_symmetry() {
    let store = EventStore::in_memory(JsonEventDomain, config(2, 2)).unwrap();

    store.associate("like", "comment", 1, 0).unwrap();

    assert_eq!(
        store.get_association("like", 1, 0).unwrap(),
        vec!["comment".to_string()]
    );
    assert_eq!(
        store.get_association("comment", 1, 0).unwrap(),
        vec!["like".to_string()]
    );
    // Scoped to the partition it was created in.
    assert!(store.get_association("like", 0, 0).unwrap().is_empty());
    assert!(store.get_association("like", 1, 1).unwrap().is_empty());
}

#[test]
fn test_association_idempotence() {
    let store = EventStore::in_memory(JsonEventDomain, config(1, 1)).unwrap();

    store.associate("like", "comment", 0, 0).unwrap();
    store.associate("comment", "like", 0, 0).unwrap();
    store.associate("like", "comment", 0, 0).unwrap();

    assert_eq!(
        store.get_association("like", 0, 0).unwrap(),
        vec!["comment".to_string()]
    );
}

#[test]
fn test_get_related_expands_to_associated_types() {
    let store = EventStore::in_memory(JsonEventDomain, config(1, 1)).unwrap();

    store.associate("like", "comment", 0, 0).unwrap();

    let liked = like("e1", b"u1", Change::Assert, b"post42");
    store.store(&[liked.clone()], 0, 10).unwrap();
    store
        .store(
            &[JsonEventDomain::event(
                "e2",
                "comment",
                b"u1",
                Change::Assert,
                b"nice post",
            )],
            0,
            20,
        )
        .unwrap();
    // Unassociated type on the same key.
    store
        .store(
            &[JsonEventDomain::event("e3", "view", b"u1", Change::Assert, b"")],
            0,
            30,
        )
        .unwrap();
    // Associated type, different key.
    store
        .store(
            &[JsonEventDomain::event(
                "e4",
                "comment",
                b"u2",
                Change::Assert,
                b"elsewhere",
            )],
            0,
            40,
        )
        .unwrap();

    let page = store.get_related(&liked, 0, 0).unwrap();
    assert!(page.is_terminal());
    assert_eq!(ids(&page.events), ["e1", "e2"]);
}

#[test]
fn test_prune_type_scope() {
    let store = EventStore::in_memory(JsonEventDomain, config(1, 2)).unwrap();

    for replica in 0..2 {
        store
            .store(&[like("l", b"u1", Change::Assert, b"a")], replica, 1)
            .unwrap();
        store
            .store(
                &[JsonEventDomain::event("c", "comment", b"u1", Change::Assert, b"b")],
                replica,
                2,
            )
            .unwrap();
        store.associate("like", "comment", 0, replica).unwrap();
        store.associate("comment", "reply", 0, replica).unwrap();
    }

    store.prune_type("like", 0, 0).unwrap();

    // Pruned type gone from the target partition, associations with it too.
    assert!(store.get("like", b"u1", 0, 0).unwrap().events.is_empty());
    assert!(store.get_association("like", 0, 0).unwrap().is_empty());
    // Other types in the same partition untouched.
    assert_eq!(store.get("comment", b"u1", 0, 0).unwrap().events.len(), 1);
    assert_eq!(
        store.get_association("comment", 0, 0).unwrap(),
        vec!["reply".to_string()]
    );
    // Other replica untouched.
    assert_eq!(store.get("like", b"u1", 1, 0).unwrap().events.len(), 1);
    assert_eq!(
        store.get_association("like", 1, 0).unwrap(),
        vec!["comment".to_string()]
    );
}

#[test]
fn test_persistent_store_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let cfg = config(2, 2);

    {
        let store = EventStore::persistent(JsonEventDomain, cfg, temp_dir.path()).unwrap();
        store
            .store(&[like("e1", b"u1", Change::Assert, b"post42")], 0, 100)
            .unwrap();
        let shard = strata_store::shard_of(b"u1", 2);
        store.associate("like", "comment", shard, 0).unwrap();
    }

    let store = EventStore::persistent(JsonEventDomain, cfg, temp_dir.path()).unwrap();
    let page = store.get("like", b"u1", 0, 0).unwrap();
    assert_eq!(ids(&page.events), ["e1"]);
    let shard = strata_store::shard_of(b"u1", 2);
    assert_eq!(
        store.get_association("like", shard, 0).unwrap(),
        vec!["comment".to_string()]
    );
}

#[test]
fn test_torn_batch_is_invisible_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let cfg = config(1, 1);
    let journal = temp_dir.path().join("shard-000.replica-0.slj");

    {
        let store = EventStore::persistent(JsonEventDomain, cfg, temp_dir.path()).unwrap();
        store
            .store(&[like("e1", b"u1", Change::Assert, b"a")], 0, 10)
            .unwrap();
        store
            .store(
                &[
                    like("e2", b"u1", Change::Assert, b"b"),
                    like("e3", b"u1", Change::Assert, b"c"),
                ],
                0,
                20,
            )
            .unwrap();
    }

    // Tear the tail off the second batch's frame, as a crash mid-append
    // would.
    let len = std::fs::metadata(&journal).unwrap().len();
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&journal)
        .unwrap();
    file.set_len(len - 3).unwrap();
    drop(file);

    let store = EventStore::persistent(JsonEventDomain, cfg, temp_dir.path()).unwrap();
    // The whole second batch is gone: both e2 and e3, never just one.
    let page = store.get("like", b"u1", 0, 0).unwrap();
    assert_eq!(ids(&page.events), ["e1"]);
}

#[test]
fn test_config_validation() {
    assert!(matches!(
        EventStore::in_memory(JsonEventDomain, config(0, 1)),
        Err(StoreError::Config(_))
    ));
    assert!(matches!(
        EventStore::in_memory(JsonEventDomain, config(1, 0)),
        Err(StoreError::Config(_))
    ));
}
