use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use quake_core::SceneDescription;
use serde::Serialize;

/// A published scene plus the bookkeeping the HTTP handlers report.
#[derive(Debug, Serialize)]
pub(crate) struct SceneSnapshot {
    /// Monotonic refresh number, starting at 1.
    pub(crate) sequence: u64,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) feed_title: Option<String>,
    /// Features skipped as malformed in this refresh.
    pub(crate) rejected_records: usize,
    pub(crate) scene: SceneDescription,
}

/// Metadata carried alongside a scene when it is published.
#[derive(Debug, Default)]
pub(crate) struct SceneMeta {
    pub(crate) feed_title: Option<String>,
    pub(crate) rejected_records: usize,
}

/// Latest published scene, shared between the refresh loop and handlers.
///
/// A failed refresh never touches the slot, so the previous scene stays up.
#[derive(Clone, Default)]
pub(crate) struct SceneSlot {
    latest: Arc<RwLock<Option<Arc<SceneSnapshot>>>>,
    sequence: Arc<AtomicU64>,
}

impl SceneSlot {
    pub(crate) fn publish(&self, scene: SceneDescription, meta: SceneMeta) -> Arc<SceneSnapshot> {
        let snapshot = Arc::new(SceneSnapshot {
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            generated_at: Utc::now(),
            feed_title: meta.feed_title,
            rejected_records: meta.rejected_records,
            scene,
        });
        match self.latest.write() {
            Ok(mut guard) => *guard = Some(snapshot.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(snapshot.clone()),
        }
        snapshot
    }

    pub(crate) fn latest(&self) -> Option<Arc<SceneSnapshot>> {
        match self.latest.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of scenes published so far.
    pub(crate) fn published(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}
