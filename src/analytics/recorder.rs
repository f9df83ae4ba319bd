//! Click recorder
//!
//! Redirect handlers hand clicks over with [`ClickRecorder::record`], which
//! never waits and never fails. A bounded queue feeds a fixed pool of
//! worker tasks that write to the [`ClickSink`]. When the queue is full the
//! click is dropped and logged, so a traffic burst cannot grow memory or
//! open more store connections than there are workers.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use futures_util::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::{ClickEvent, ClickRecord, ClickSink};
use crate::config::ClickRecorderConfig;

/// Counters for the lifetime of a recorder
#[derive(Debug, Default)]
pub struct RecorderStats {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    persisted: AtomicU64,
    failed: AtomicU64,
}

impl RecorderStats {
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn persisted(&self) -> u64 {
        self.persisted.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

pub struct ClickRecorder {
    tx: ArcSwapOption<mpsc::Sender<ClickEvent>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    stats: Arc<RecorderStats>,
}

impl ClickRecorder {
    /// Start the worker pool. Must be called inside a tokio runtime.
    pub fn new(sink: Arc<dyn ClickSink>, config: &ClickRecorderConfig) -> Self {
        let capacity = config.queue_capacity.max(1);
        let worker_count = config.workers.max(1);

        let (tx, rx) = mpsc::channel::<ClickEvent>(capacity);
        let rx = Arc::new(Mutex::new(rx));
        let stats = Arc::new(RecorderStats::default());

        let workers = (0..worker_count)
            .map(|id| {
                tokio::spawn(worker_loop(
                    id,
                    rx.clone(),
                    sink.clone(),
                    stats.clone(),
                ))
            })
            .collect();

        info!(
            "ClickRecorder started: queue capacity {}, {} workers",
            capacity, worker_count
        );

        Self {
            tx: ArcSwapOption::new(Some(Arc::new(tx))),
            workers: Mutex::new(workers),
            stats,
        }
    }

    /// Hand a click to the background workers without waiting.
    pub fn record(&self, event: ClickEvent) {
        let guard = self.tx.load();
        let Some(tx) = &*guard else {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            debug!("ClickRecorder is shut down, dropping click for '{}'", event.code);
            return;
        };

        match tx.try_send(event) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Click queue full, dropping click for '{}'", event.code);
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Click queue closed, dropping click for '{}'", event.code);
            }
        }
    }

    pub fn stats(&self) -> &RecorderStats {
        &self.stats
    }

    /// Stop accepting clicks, let workers drain what is queued, and wait
    /// for them to exit. Calling it again is a no-op.
    pub async fn shutdown(&self) {
        self.tx.store(None);

        let handles = std::mem::take(&mut *self.workers.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                error!("ClickRecorder worker ended abnormally: {}", e);
            }
        }

        info!(
            "ClickRecorder stopped: {} persisted, {} failed, {} dropped",
            self.stats.persisted(),
            self.stats.failed(),
            self.stats.dropped()
        );
    }
}

async fn worker_loop(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<ClickEvent>>>,
    sink: Arc<dyn ClickSink>,
    stats: Arc<RecorderStats>,
) {
    loop {
        let next = rx.lock().await.recv().await;
        let Some(event) = next else {
            trace!("ClickRecorder worker {} exiting", id);
            break;
        };

        let code = event.code.clone();
        let outcome = AssertUnwindSafe(persist(sink.as_ref(), event))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {
                stats.persisted.fetch_add(1, Ordering::Relaxed);
                trace!("Click for '{}' persisted", code);
            }
            Ok(Err(e)) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                warn!("Failed to persist click for '{}': {}", code, e);
            }
            Err(panic) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    "Click persistence for '{}' panicked: {}",
                    code,
                    panic_message(panic.as_ref())
                );
            }
        }
    }
}

async fn persist(sink: &dyn ClickSink, event: ClickEvent) -> anyhow::Result<()> {
    let record = ClickRecord::from(event);
    sink.insert_click(record).await
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
