//! Append-only instance journal
//!
//! The journal is the durability backbone of the engine: every signal is
//! appended before it reaches the instance, bracketed by `__started` and
//! `__completed` marker records. Replaying a journal through the instance's
//! signal queues reconstructs its in-memory state after a restart.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::FlowError;

/// Marker kind recording the instance start and its initial payload.
pub const STARTED_KIND: &str = "__started";

/// Marker kind recording successful completion of the instance.
pub const COMPLETED_KIND: &str = "__completed";

/// One journaled event for an instance.
#[derive(Debug, Clone)]
pub struct JournalRecord {
    /// Position within the instance's journal, ascending from 0.
    pub seq: i64,
    /// Signal kind, or one of the reserved marker kinds.
    pub kind: String,
    /// Signal payload as delivered.
    pub payload: Value,
}

impl JournalRecord {
    /// True for the reserved `__started` / `__completed` markers.
    pub fn is_marker(&self) -> bool {
        self.kind == STARTED_KIND || self.kind == COMPLETED_KIND
    }
}

/// Durable, ordered event log keyed by instance.
#[async_trait]
pub trait Journal: Send + Sync + 'static {
    /// Appends one record to the instance's journal.
    async fn append(&self, key: &str, kind: &str, payload: &Value) -> Result<(), FlowError>;

    /// Loads the full journal for an instance in append order.
    async fn load(&self, key: &str) -> Result<Vec<JournalRecord>, FlowError>;

    /// Returns keys that have a start record but no completion record.
    ///
    /// These are the instances a restarted process should resume.
    async fn open_keys(&self) -> Result<Vec<String>, FlowError>;
}

/// In-memory journal for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    records: RwLock<HashMap<String, Vec<JournalRecord>>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Journal for MemoryJournal {
    async fn append(&self, key: &str, kind: &str, payload: &Value) -> Result<(), FlowError> {
        let mut records = self.records.write().await;
        let entries = records.entry(key.to_string()).or_default();
        entries.push(JournalRecord {
            seq: entries.len() as i64,
            kind: kind.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Vec<JournalRecord>, FlowError> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned().unwrap_or_default())
    }

    async fn open_keys(&self) -> Result<Vec<String>, FlowError> {
        let records = self.records.read().await;
        let mut keys: Vec<String> = records
            .iter()
            .filter(|(_, entries)| {
                entries.iter().any(|r| r.kind == STARTED_KIND)
                    && !entries.iter().any(|r| r.kind == COMPLETED_KIND)
            })
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}
