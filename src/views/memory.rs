//! 内存版 ViewStore
//!
//! 不持久化，计数器按需创建。记录每类操作的调用次数，便于断言
//! “没有发出存储查询” 之类的行为。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::store::{CounterRef, ViewRecord, ViewStore, Viewer};
use super::ViewTarget;
use crate::errors::Result;

#[derive(Default)]
pub struct MemoryViewStore {
    views: Mutex<Vec<ViewRecord>>,
    counters: Mutex<HashMap<(ViewTarget, String), i64>>,
    lookups: AtomicU64,
    increments: AtomicU64,
}

impl MemoryViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<ViewRecord> {
        self.views.lock().clone()
    }

    pub fn view_count(&self, target: ViewTarget, id: &str) -> i64 {
        self.counters
            .lock()
            .get(&(target, id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// find_active_view 调用次数
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// increment_view_count 调用次数
    pub fn increments(&self) -> u64 {
        self.increments.load(Ordering::Relaxed)
    }
}

fn same_viewer(view: &ViewRecord, viewer: &Viewer) -> bool {
    match viewer {
        Viewer::User(id) => view.user_id.as_deref() == Some(id.as_str()),
        Viewer::Ip(ip) => view.user_ip.as_deref() == Some(ip.as_str()),
    }
}

#[async_trait]
impl ViewStore for MemoryViewStore {
    async fn find_active_view(
        &self,
        entity: &str,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<Option<ViewRecord>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .views
            .lock()
            .iter()
            .find(|v| v.entity == entity && v.exp > now && same_viewer(v, viewer))
            .cloned())
    }

    async fn insert_view(&self, view: &ViewRecord) -> Result<()> {
        self.views.lock().push(view.clone());
        Ok(())
    }

    async fn increment_view_count(&self, counter: CounterRef<'_>) -> Result<u64> {
        self.increments.fetch_add(1, Ordering::Relaxed);
        *self
            .counters
            .lock()
            .entry((counter.target, counter.id.to_string()))
            .or_insert(0) += 1;
        Ok(1)
    }

    async fn delete_expired_views(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut views = self.views.lock();
        let before = views.len();
        views.retain(|v| v.exp > now);
        Ok((before - views.len()) as u64)
    }
}
