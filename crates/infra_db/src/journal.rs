//! PostgreSQL flow journal
//!
//! Implements the `durable_flow::Journal` port over the append-only
//! `flow_events` table, making workflow instances survive process restarts.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use durable_flow::{FlowError, Journal, JournalRecord, COMPLETED_KIND, STARTED_KIND};

/// Journal adapter backed by the `flow_events` table.
#[derive(Debug, Clone)]
pub struct PgJournal {
    pool: PgPool,
}

impl PgJournal {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn journal_error(err: sqlx::Error) -> FlowError {
    FlowError::Journal(err.to_string())
}

#[async_trait]
impl Journal for PgJournal {
    async fn append(&self, key: &str, kind: &str, payload: &Value) -> Result<(), FlowError> {
        sqlx::query("INSERT INTO flow_events (instance_key, kind, payload) VALUES ($1, $2, $3)")
            .bind(key)
            .bind(kind)
            .bind(payload)
            .execute(&self.pool)
            .await
            .map_err(journal_error)?;
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Vec<JournalRecord>, FlowError> {
        let rows: Vec<(String, Value)> = sqlx::query_as(
            "SELECT kind, payload FROM flow_events WHERE instance_key = $1 ORDER BY id ASC",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(journal_error)?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(seq, (kind, payload))| JournalRecord {
                seq: seq as i64,
                kind,
                payload,
            })
            .collect())
    }

    async fn open_keys(&self) -> Result<Vec<String>, FlowError> {
        let keys: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT instance_key FROM flow_events WHERE kind = $1 \
             AND instance_key NOT IN \
             (SELECT instance_key FROM flow_events WHERE kind = $2) \
             ORDER BY instance_key",
        )
        .bind(STARTED_KIND)
        .bind(COMPLETED_KIND)
        .fetch_all(&self.pool)
        .await
        .map_err(journal_error)?;

        Ok(keys.into_iter().map(|(key,)| key).collect())
    }
}
