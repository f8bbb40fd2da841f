//! In-memory collaborators
//!
//! Used by tests and by embedding code that has no database. Interior
//! mutability keeps the collaborator traits `&self`.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use seedbed_core_types::JobId;

use crate::collaborators::{DiagnosticsSink, ElementSaver, JobQueue, SeedTracker, SettingSaver};
use crate::errors::{ErrorBag, ExError, ExErrorKind, ImportError, Result};
use crate::importers::Importer;
use crate::model::{Job, Row, SavedItem, Weed};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An item held by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub id: String,
    pub model: String,
    pub fields: Row,
}

/// Element and setting store with a weed ledger
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: AtomicU64,
    elements: Mutex<Vec<StoredItem>>,
    settings: Mutex<Vec<StoredItem>>,
    weeds: Mutex<Vec<Weed>>,
    rejected_models: Mutex<HashSet<String>>,
    fail_tracking: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every save of `model` fail
    pub fn reject_model(&self, model: impl Into<String>) {
        lock(&self.rejected_models).insert(model.into());
    }

    /// Make every weed write fail
    pub fn fail_tracking(&self) {
        self.fail_tracking.store(true, Ordering::SeqCst);
    }

    pub fn elements(&self) -> Vec<StoredItem> {
        lock(&self.elements).clone()
    }

    pub fn settings(&self) -> Vec<StoredItem> {
        lock(&self.settings).clone()
    }

    pub fn weeds(&self) -> Vec<Weed> {
        lock(&self.weeds).clone()
    }

    pub fn element_count(&self) -> usize {
        lock(&self.elements).len()
    }

    pub fn setting_count(&self) -> usize {
        lock(&self.settings).len()
    }

    fn check_rejected(&self, importer: &Importer) -> Result<()> {
        if lock(&self.rejected_models).contains(importer.model()) {
            return Err(ImportError::SaveFailed {
                model: importer.model().to_string(),
                reason: "rejected by store".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn upsert(&self, items: &Mutex<Vec<StoredItem>>, importer: &Importer, keys: &[&str]) -> SavedItem {
        let fields = importer.settings().clone();
        let mut items = lock(items);

        let existing = keys.iter().find_map(|key| {
            let wanted = fields.get_id(key)?;
            items
                .iter()
                .position(|item| item.model == importer.model() && matches_key(item, key, &wanted))
        });

        match existing {
            Some(pos) => {
                let item = &mut items[pos];
                item.fields = fields;
                SavedItem::updated(item.id.clone(), importer.model())
            }
            None => {
                let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
                items.push(StoredItem {
                    id: id.clone(),
                    model: importer.model().to_string(),
                    fields,
                });
                SavedItem::created(id, importer.model())
            }
        }
    }
}

fn matches_key(item: &StoredItem, key: &str, wanted: &str) -> bool {
    if key == "id" {
        return item.id == wanted;
    }
    item.fields.get_id(key).as_deref() == Some(wanted)
}

impl ElementSaver for MemoryStore {
    fn save_element(&self, importer: &Importer) -> Result<SavedItem> {
        self.check_rejected(importer)?;
        Ok(self.upsert(&self.elements, importer, &["id"]))
    }
}

impl SettingSaver for MemoryStore {
    fn save_setting(&self, importer: &Importer) -> Result<SavedItem> {
        self.check_rejected(importer)?;
        Ok(self.upsert(&self.settings, importer, &["id", "handle"]))
    }
}

impl SeedTracker for MemoryStore {
    fn track_seed(&self, weed: &Weed) -> Result<()> {
        if self.fail_tracking.load(Ordering::SeqCst) {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op("track_seed")
                .with_item_id(weed.item_id.clone())
                .with_message("seed ledger unavailable"));
        }
        lock(&self.weeds).push(weed.clone());
        Ok(())
    }
}

/// FIFO job queue, optionally bounded
#[derive(Debug, Default)]
pub struct MemoryQueue {
    jobs: Mutex<VecDeque<Job>>,
    capacity: Option<usize>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that rejects pushes once `capacity` jobs are waiting
    pub fn bounded(capacity: usize) -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            capacity: Some(capacity),
        }
    }

    pub fn pop(&self) -> Option<Job> {
        lock(&self.jobs).pop_front()
    }

    pub fn len(&self) -> usize {
        lock(&self.jobs).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.jobs).is_empty()
    }

    pub fn jobs(&self) -> Vec<Job> {
        lock(&self.jobs).iter().cloned().collect()
    }
}

impl JobQueue for MemoryQueue {
    fn push(&self, job: &Job) -> Result<JobId> {
        let mut jobs = lock(&self.jobs);
        if let Some(capacity) = self.capacity {
            if jobs.len() >= capacity {
                return Err(ExError::from(ImportError::QueueRejected {
                    reason: format!("queue is full ({} jobs)", capacity),
                })
                .with_job_id(job.id.clone()));
            }
        }
        jobs.push_back(job.clone());
        Ok(job.id.clone())
    }
}

/// Diagnostics sink that keeps every batch it receives
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<ErrorBag>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<ErrorBag> {
        lock(&self.batches).clone()
    }

    /// Total number of errors across all batches
    pub fn error_count(&self) -> usize {
        lock(&self.batches).iter().map(ErrorBag::len).sum()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, errors: &ErrorBag) {
        lock(&self.batches).push(errors.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::{ImporterDescriptor, ImporterKind, ImporterType};
    use crate::model::{Payload, SaveStatus, SeedContext, SeedOrigin};
    use serde_json::json;

    fn setting(fields: serde_json::Value) -> Importer {
        ImporterType::new(ImporterDescriptor::new(
            "Section",
            "setting.section",
            ImporterKind::Setting,
        ))
        .instantiate(Row::try_from(fields).unwrap())
    }

    #[test]
    fn test_settings_match_by_handle() {
        let store = MemoryStore::new();
        let first = store
            .save_setting(&setting(json!({"handle": "news", "name": "News"})))
            .unwrap();
        let second = store
            .save_setting(&setting(json!({"handle": "news", "name": "Latest"})))
            .unwrap();

        assert_eq!(first.status, SaveStatus::Created);
        assert_eq!(second.status, SaveStatus::Updated);
        assert_eq!(first.id, second.id);
        assert_eq!(store.setting_count(), 1);
    }

    #[test]
    fn test_bounded_queue_rejects_when_full() {
        let queue = MemoryQueue::bounded(1);
        let job = || {
            Job::new(
                Payload::Decoded(json!([])),
                SeedContext::new(SeedOrigin::Post, false),
            )
        };

        assert!(queue.push(&job()).is_ok());
        let err = queue.push(&job()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::QueueRejected);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_rejected_model_fails_save() {
        let store = MemoryStore::new();
        store.reject_model("setting.section");
        let err = store
            .save_setting(&setting(json!({"handle": "news"})))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::SaveFailed);
    }
}
