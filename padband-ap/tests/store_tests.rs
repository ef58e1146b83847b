//! Recording store CRUD tests against a temp SQLite database

use chrono::{TimeZone, Utc};
use padband_ap::store::RecordingStore;
use padband_common::db::init_database;
use padband_common::model::{ButtonAction, Recording, SoundAssignments, SoundRef};
use tempfile::TempDir;

async fn store() -> (RecordingStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("padband.db"))
        .await
        .unwrap();
    (RecordingStore::new(pool), temp_dir)
}

fn sample(name: &str) -> Recording {
    let mut instruments = SoundAssignments::new();
    instruments.insert(1, SoundRef::new("drums", "kick.wav"));
    instruments.insert(2, SoundRef::new("drums", "snare.wav"));
    Recording::new(
        Some(name.to_string()),
        vec![
            ButtonAction {
                timestamp: Utc.timestamp_millis_opt(1_000).unwrap(),
                button: 1,
            },
            ButtonAction {
                timestamp: Utc.timestamp_millis_opt(1_500).unwrap(),
                button: 2,
            },
        ],
        instruments,
    )
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let (store, _dir) = store().await;
    let rec = sample("Take 1");

    let id = store.create(&rec).await.unwrap();
    assert_eq!(id, rec.id);

    let loaded = store.get(id).await.unwrap();
    assert_eq!(loaded.name, "Take 1");
    assert_eq!(loaded.actions, rec.actions);
    assert_eq!(loaded.instruments, rec.instruments);
}

#[tokio::test]
async fn list_contains_exactly_the_created_set() {
    let (store, _dir) = store().await;
    let a = sample("A");
    let b = sample("B");
    store.create(&a).await.unwrap();
    store.create(&b).await.unwrap();

    let listed = store.list().await.unwrap();
    let mut ids: Vec<_> = listed.iter().map(|r| r.id).collect();
    ids.sort();
    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn empty_recording_persists() {
    let (store, _dir) = store().await;
    let rec = Recording::new(None, vec![], SoundAssignments::new());

    store.create(&rec).await.unwrap();
    let loaded = store.get(rec.id).await.unwrap();
    assert!(loaded.actions.is_empty());
    assert!(loaded.instruments.is_empty());
    assert_eq!(loaded.name, "Untitled");
}

#[tokio::test]
async fn rename_changes_only_the_name() {
    let (store, _dir) = store().await;
    let rec = sample("Before");
    store.create(&rec).await.unwrap();

    store.rename(rec.id, "After").await.unwrap();

    let loaded = store.get(rec.id).await.unwrap();
    assert_eq!(loaded.name, "After");
    assert_eq!(loaded.actions, rec.actions, "rename must not touch actions");
    assert_eq!(
        loaded.instruments, rec.instruments,
        "rename must not touch the snapshot"
    );
}

#[tokio::test]
async fn rename_unknown_id_is_not_found() {
    let (store, _dir) = store().await;
    let err = store.rename(uuid::Uuid::new_v4(), "X").await.unwrap_err();
    assert!(matches!(err, padband_common::Error::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_from_list_and_invalidates_id() {
    let (store, _dir) = store().await;
    let keep = sample("Keep");
    let drop = sample("Drop");
    store.create(&keep).await.unwrap();
    store.create(&drop).await.unwrap();

    store.delete(drop.id).await.unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);

    // Further operations on the deleted id fail
    assert!(matches!(
        store.get(drop.id).await.unwrap_err(),
        padband_common::Error::NotFound(_)
    ));
    assert!(matches!(
        store.delete(drop.id).await.unwrap_err(),
        padband_common::Error::NotFound(_)
    ));
}

#[tokio::test]
async fn list_orders_newest_first() {
    let (store, _dir) = store().await;

    let mut old = sample("Old");
    old.created_at = Utc.timestamp_millis_opt(1_000_000).unwrap();
    let mut new = sample("New");
    new.created_at = Utc.timestamp_millis_opt(2_000_000).unwrap();

    store.create(&old).await.unwrap();
    store.create(&new).await.unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed[0].name, "New");
    assert_eq!(listed[1].name, "Old");
}
