//! Scenario portfolio store.
//!
//! A [`PortfolioStore`] holds the ordered history of scenarios accepted during one session. It
//! lives in memory only. Cloning a store yields another handle to the same records, and every
//! mutation takes a write lock so appends from concurrent handlers are atomic.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use scenario_types::NonEmptyText;
use scenario_uuid::ScenarioId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An accepted scenario. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    id: ScenarioId,
    prompt: NonEmptyText,
    narrative: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
}

impl ScenarioRecord {
    pub fn id(&self) -> ScenarioId {
        self.id
    }

    pub fn prompt(&self) -> &NonEmptyText {
        &self.prompt
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Clone, Debug, Default)]
pub struct PortfolioStore {
    records: Arc<RwLock<Vec<ScenarioRecord>>>,
}

impl PortfolioStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new record with a fresh identifier and returns it.
    ///
    /// The identifier is unique within this store even in the (practically impossible) case of
    /// a random UUID collision, because generation happens under the write lock.
    pub fn append(
        &self,
        prompt: NonEmptyText,
        narrative: impl Into<String>,
        tags: Vec<String>,
    ) -> ScenarioRecord {
        let mut records = self.records.write();

        let mut id = ScenarioId::new();
        while records.iter().any(|r| r.id == id) {
            id = ScenarioId::new();
        }

        let record = ScenarioRecord {
            id,
            prompt,
            narrative: narrative.into(),
            tags,
            created_at: Utc::now(),
        };
        records.push(record.clone());

        tracing::debug!(scenario_id = %id, len = records.len(), "scenario appended to portfolio");
        record
    }

    /// Returns every record in insertion order.
    pub fn list(&self) -> Vec<ScenarioRecord> {
        self.records.read().clone()
    }

    /// Returns every record, most recent first.
    pub fn list_newest_first(&self) -> Vec<ScenarioRecord> {
        self.records.read().iter().rev().cloned().collect()
    }

    pub fn get(&self, id: ScenarioId) -> Option<ScenarioRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    /// Removes a record by identifier, returning it if it was present.
    ///
    /// The relative order of the remaining records is unchanged.
    pub fn remove(&self, id: ScenarioId) -> Option<ScenarioRecord> {
        let mut records = self.records.write();
        let index = records.iter().position(|r| r.id == id)?;
        let removed = records.remove(index);
        tracing::debug!(scenario_id = %id, "scenario removed from portfolio");
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    fn prompt(text: &str) -> NonEmptyText {
        NonEmptyText::new(text).unwrap()
    }

    #[test]
    fn append_then_list_ends_with_new_record() {
        let store = PortfolioStore::new();
        store.append(prompt("first"), "one", vec!["CAT".into()]);
        let before = store.list().len();

        let record = store.append(prompt("second"), "two", vec![]);
        let listed = store.list();

        assert_eq!(listed.len(), before + 1);
        assert_eq!(listed.last(), Some(&record));
        assert!(record.tags().is_empty());
    }

    #[test]
    fn preserves_insertion_order_and_reverses_for_display() {
        let store = PortfolioStore::new();
        for text in ["a", "b", "c"] {
            store.append(prompt(text), text, vec![]);
        }

        let prompts: Vec<_> = store.list().iter().map(|r| r.prompt().to_string()).collect();
        assert_eq!(prompts, ["a", "b", "c"]);

        let newest: Vec<_> = store
            .list_newest_first()
            .iter()
            .map(|r| r.prompt().to_string())
            .collect();
        assert_eq!(newest, ["c", "b", "a"]);
    }

    #[test]
    fn get_and_remove_by_id() {
        let store = PortfolioStore::new();
        let a = store.append(prompt("a"), "a", vec![]);
        let b = store.append(prompt("b"), "b", vec![]);
        let c = store.append(prompt("c"), "c", vec![]);

        assert_eq!(store.get(b.id()), Some(b.clone()));
        assert_eq!(store.remove(b.id()), Some(b.clone()));
        assert_eq!(store.remove(b.id()), None);
        assert_eq!(store.get(b.id()), None);
        assert_eq!(store.list(), vec![a, c]);
    }

    #[test]
    fn clones_share_records() {
        let store = PortfolioStore::new();
        let handle = store.clone();
        handle.append(prompt("shared"), "n", vec![]);
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }

    #[test]
    fn concurrent_appends_keep_unique_ids() {
        let store = PortfolioStore::new();
        let workers: Vec<_> = (0..8)
            .map(|w| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        store.append(prompt(&format!("w{w}-{i}")), "n", vec![]);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let records = store.list();
        assert_eq!(records.len(), 2_000);
        let ids: HashSet<_> = records.iter().map(ScenarioRecord::id).collect();
        assert_eq!(ids.len(), 2_000);
    }
}
