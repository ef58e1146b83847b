//! Pad engine integration tests
//!
//! Exercises the press routing task directly, below the HTTP surface.

mod helpers;

use helpers::{MockSink, MockSoundStore};
use padband_ap::engine::PadEngine;
use padband_common::db::init_database;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn engine() -> (Arc<PadEngine>, TempDir) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("padband.db")).await.unwrap();
    let store = Arc::new(MockSoundStore::new(Duration::ZERO)) as Arc<dyn padband_ap::sounds::SoundStore>;
    let sink = Arc::new(MockSink::new()) as Arc<dyn padband_ap::sounds::AudioSink>;
    (PadEngine::new(pool, store, sink), dir)
}

#[tokio::test]
async fn routing_task_survives_press_burst() {
    let (engine, _dir) = engine().await;
    engine.start_recording().unwrap();

    // Far more presses than the broadcast buffer holds, all before the
    // routing task gets a chance to drain. The overflow is lost, but routing
    // must keep running.
    for _ in 0..100 {
        engine.channel().press(1);
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    let after_burst = engine.status().pending_actions;
    assert!(after_burst > 0, "burst presses were routed to the recorder");

    // A later calm press still reaches the recorder
    engine.channel().press(2);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        engine.status().pending_actions,
        after_burst + 1,
        "routing must survive the burst"
    );

    let recording = engine.stop_recording(None).await.unwrap();
    assert_eq!(recording.actions.last().unwrap().button, 2);
}

#[tokio::test]
async fn presses_while_idle_are_not_buffered() {
    let (engine, _dir) = engine().await;

    engine.channel().press(1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.status().pending_actions, 0);

    engine.start_recording().unwrap();
    assert_eq!(engine.status().pending_actions, 0, "stale presses never leak into a take");
}
