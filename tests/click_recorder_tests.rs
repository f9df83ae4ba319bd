//! ClickRecorder tests
//!
//! Queue overflow with a stalled sink, and persistence through the SQLite
//! click store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use linkmeter::analytics::{ClickEvent, ClickRecord, ClickRecorder, ClickSink};
use linkmeter::config::{ClickRecorderConfig, DatabaseConfig};
use linkmeter::storage::{AliasRecord, StorageFactory};
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// Sink that blocks every write until a permit is released
struct GatedSink {
    gate: Semaphore,
    written: AtomicUsize,
}

impl GatedSink {
    fn closed() -> Self {
        Self {
            gate: Semaphore::new(0),
            written: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ClickSink for GatedSink {
    async fn insert_click(&self, _click: ClickRecord) -> anyhow::Result<()> {
        let permit = self.gate.acquire().await?;
        permit.forget();
        self.written.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_full_queue_drops_clicks() {
    let sink = Arc::new(GatedSink::closed());
    let recorder = ClickRecorder::new(
        sink.clone(),
        &ClickRecorderConfig {
            queue_capacity: 1,
            workers: 1,
        },
    );

    // record() never waits, so a burst outruns the single stalled worker
    for _ in 0..10 {
        recorder.record(ClickEvent::new("burst1"));
    }

    let stats = recorder.stats();
    assert_eq!(stats.enqueued() + stats.dropped(), 10);
    assert!(stats.dropped() >= 8, "dropped only {}", stats.dropped());

    let enqueued = stats.enqueued() as usize;
    sink.gate.add_permits(enqueued);
    recorder.shutdown().await;

    assert_eq!(sink.written.load(Ordering::SeqCst), enqueued);
    assert_eq!(recorder.stats().persisted() as usize, enqueued);
}

#[tokio::test]
async fn test_clicks_persist_to_store() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("clicks.db");
    let storage = StorageFactory::create(&DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    })
    .await
    .expect("Failed to create storage");

    storage
        .insert_alias(&AliasRecord {
            code: "persist".to_string(),
            target: "https://example.com".to_string(),
            custom_alias: None,
            created_at: chrono::Utc::now(),
            expires_at: None,
        })
        .await
        .unwrap();

    let recorder = ClickRecorder::new(
        storage.as_click_sink(),
        &ClickRecorderConfig {
            queue_capacity: 128,
            workers: 4,
        },
    );

    let firefox = "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";
    for i in 0..20 {
        recorder.record(
            ClickEvent::new("persist")
                .with_ip(Some(format!("192.0.2.{}", i % 4)))
                .with_user_agent(Some(firefox.to_string()))
                .with_referer(Some("https://news.example/".to_string())),
        );
    }
    recorder.record(ClickEvent::new("persist"));

    recorder.shutdown().await;

    assert_eq!(recorder.stats().persisted(), 21);
    assert_eq!(recorder.stats().dropped(), 0);
    assert_eq!(storage.count_clicks("persist", None).await.unwrap(), 21);
    assert_eq!(storage.count_unique_ips("persist", None).await.unwrap(), 4);

    let groups = storage
        .user_agent_breakdown("persist", None)
        .await
        .unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].browser.as_deref(), Some("Firefox"));
    assert_eq!(groups[0].count, 20);

    // Accepted after shutdown is impossible; the click is counted as dropped
    recorder.record(ClickEvent::new("persist"));
    assert_eq!(recorder.stats().dropped(), 1);
    assert_eq!(storage.count_clicks("persist", None).await.unwrap(), 21);
}
