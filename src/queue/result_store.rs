//! 评分结果存储
//!
//! 任务 ID → 结果槽。每个槽是一个 `watch` 通道：worker 写入一次，
//! 任意数量的等待方可以随时读取或挂起等待写入。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::{JobId, Outcome};

type OutcomeSlot = watch::Sender<Option<Arc<Outcome>>>;

#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    slots: Arc<DashMap<JobId, OutcomeSlot>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为新任务登记一个待定槽
    ///
    /// ID 已存在时返回 `false`，调用方需要换一个 ID。
    pub fn register(&self, id: JobId) -> bool {
        match self.slots.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(watch::channel(None).0);
                true
            }
        }
    }

    /// 写入任务结果，每个 ID 只能写一次
    ///
    /// 已有结果时不覆盖并返回 `false`。
    pub fn put(&self, id: JobId, outcome: Outcome) -> bool {
        let outcome = Arc::new(outcome);
        let slot = self
            .slots
            .entry(id)
            .or_insert_with(|| watch::channel(None).0);

        let written = slot.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(outcome);
            true
        });

        if written {
            debug!("任务 {} 结果已写入", id);
        } else {
            warn!("⚠️ 任务 {} 已有结果，忽略重复写入", id);
        }
        written
    }

    /// 读取任务结果，未完成时返回 `None`
    pub fn get(&self, id: &JobId) -> Option<Arc<Outcome>> {
        self.slots.get(id).and_then(|slot| slot.borrow().clone())
    }

    /// 等待任务结果写入
    ///
    /// 返回的 future 不借用存储；结果已存在时立即完成。
    /// ID 未登记（或已被清理）时立即返回 `None`，不会创建新槽；
    /// 槽在等待期间被移除时同样返回 `None`。
    pub fn wait_for(&self, id: JobId) -> impl Future<Output = Option<Arc<Outcome>>> + Send + 'static {
        let receiver = self.slots.get(&id).map(|slot| slot.subscribe());
        if receiver.is_none() {
            warn!("⚠️ 等待未登记的任务 {}", id);
        }

        async move {
            let mut receiver = receiver?;
            let resolved = receiver
                .wait_for(|value| value.is_some())
                .await
                .map(|value| value.clone());
            resolved.ok().flatten()
        }
    }

    /// 清理完成时间早于 `age` 的结果，待定槽保留
    ///
    /// 返回清理数量。
    pub fn evict_finished_older_than(&self, age: Duration) -> usize {
        let now = Utc::now();
        let before = self.slots.len();
        self.slots.retain(|_, slot| match slot.borrow().as_ref() {
            Some(outcome) => now
                .signed_duration_since(outcome.finished_at)
                .to_std()
                .map_or(true, |elapsed| elapsed < age),
            None => true,
        });
        before.saturating_sub(self.slots.len())
    }

    /// 槽总数（含待定）
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 尚未写入结果的槽数
    pub fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.value().borrow().is_none())
            .count()
    }
}
