//! Workflow instance registry
//!
//! The registry owns every live workflow instance in the process. Each
//! instance is a spawned task consuming typed signals from one unbounded FIFO
//! queue per signal kind; the registry routes inbound signals to the right
//! queue and journals them first so the instance can be replayed after a
//! restart.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::error::FlowError;
use crate::journal::{Journal, COMPLETED_KIND, STARTED_KIND};

/// A long-lived, signal-driven workflow.
///
/// Implementations declare the signal kinds they consume up front so the
/// registry can build the per-kind queues before the instance task starts.
#[async_trait]
pub trait Workflow: Send + 'static {
    /// Signal kinds this workflow subscribes to.
    fn signal_kinds(&self) -> &'static [&'static str];

    /// Runs the instance to completion.
    ///
    /// Returning `Ok` marks the instance completed in the journal and
    /// releases it. Returning `Err` is a terminal failure: the instance is
    /// released without a completion record and the error is logged as an
    /// operational alert.
    async fn run(self: Box<Self>, ctx: WorkflowContext) -> Result<(), FlowError>;
}

/// Per-instance context handed to [`Workflow::run`].
pub struct WorkflowContext {
    key: String,
    channels: HashMap<&'static str, mpsc::UnboundedReceiver<Value>>,
}

impl WorkflowContext {
    /// The instance key (the bill id for bill workflows).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Takes ownership of the receiver for one signal kind.
    ///
    /// Dropping the returned receiver stops delivery for that kind: the
    /// registry reports later sends as rejected.
    pub fn signal_channel<T: DeserializeOwned>(
        &mut self,
        kind: &'static str,
    ) -> Result<SignalReceiver<T>, FlowError> {
        let rx = self
            .channels
            .remove(kind)
            .ok_or_else(|| FlowError::UnknownSignal {
                key: self.key.clone(),
                kind: kind.to_string(),
            })?;
        Ok(SignalReceiver {
            kind,
            rx,
            _payload: PhantomData,
        })
    }
}

/// Typed receiving end of one signal queue.
pub struct SignalReceiver<T> {
    kind: &'static str,
    rx: mpsc::UnboundedReceiver<Value>,
    _payload: PhantomData<T>,
}

impl<T: DeserializeOwned> SignalReceiver<T> {
    /// Waits for the next signal of this kind.
    ///
    /// Payloads that fail to deserialize are logged and skipped; `None` means
    /// the sending side is gone.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            let payload = self.rx.recv().await?;
            match serde_json::from_value(payload) {
                Ok(value) => return Some(value),
                Err(err) => {
                    tracing::warn!(kind = self.kind, error = %err, "skipping undecodable signal payload");
                }
            }
        }
    }

    /// Drains one already-enqueued signal without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            let payload = self.rx.try_recv().ok()?;
            match serde_json::from_value(payload) {
                Ok(value) => return Some(value),
                Err(err) => {
                    tracing::warn!(kind = self.kind, error = %err, "skipping undecodable signal payload");
                }
            }
        }
    }
}

struct InstanceHandle {
    senders: HashMap<&'static str, mpsc::UnboundedSender<Value>>,
}

/// Registry of live workflow instances, keyed by instance id.
///
/// Cloning is cheap; clones share the same instance map and journal.
#[derive(Clone)]
pub struct FlowRegistry {
    journal: Arc<dyn Journal>,
    instances: Arc<Mutex<HashMap<String, InstanceHandle>>>,
}

impl FlowRegistry {
    pub fn new(journal: Arc<dyn Journal>) -> Self {
        Self {
            journal,
            instances: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts a new instance under `key`.
    ///
    /// The initial payload is journaled as the start record before the
    /// instance task runs. A key with a live instance is rejected with
    /// [`FlowError::DuplicateInstance`].
    pub async fn start<W: Workflow>(
        &self,
        key: &str,
        initial: &Value,
        workflow: W,
    ) -> Result<(), FlowError> {
        self.launch(key, workflow, Vec::new(), Some(initial)).await
    }

    /// Resumes an instance from its journal.
    ///
    /// Journaled signals are re-enqueued in journal order before any live
    /// signal can arrive, preserving per-kind FIFO. Already-completed
    /// instances are a no-op.
    pub async fn resume<W: Workflow>(&self, key: &str, workflow: W) -> Result<(), FlowError> {
        let records = self.journal.load(key).await?;
        if records.iter().any(|r| r.kind == COMPLETED_KIND) {
            tracing::debug!(instance = %key, "instance already completed, nothing to resume");
            return Ok(());
        }
        let replay: Vec<(String, Value)> = records
            .into_iter()
            .filter(|r| !r.is_marker())
            .map(|r| (r.kind, r.payload))
            .collect();
        self.launch(key, workflow, replay, None).await
    }

    async fn launch<W: Workflow>(
        &self,
        key: &str,
        workflow: W,
        replay: Vec<(String, Value)>,
        initial: Option<&Value>,
    ) -> Result<(), FlowError> {
        let mut senders = HashMap::new();
        let mut channels = HashMap::new();
        for &kind in workflow.signal_kinds() {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.insert(kind, tx);
            channels.insert(kind, rx);
        }

        // Replay before the instance is visible to live signalers.
        for (kind, payload) in replay {
            match senders.get(kind.as_str()) {
                Some(tx) => {
                    let _ = tx.send(payload);
                }
                None => {
                    tracing::warn!(instance = %key, kind = %kind, "journaled signal has no channel, skipping");
                }
            }
        }

        {
            let mut instances = self.instances.lock().await;
            if instances.contains_key(key) {
                return Err(FlowError::DuplicateInstance(key.to_string()));
            }
            instances.insert(key.to_string(), InstanceHandle { senders });
        }

        if let Some(initial) = initial {
            if let Err(err) = self.journal.append(key, STARTED_KIND, initial).await {
                self.instances.lock().await.remove(key);
                return Err(err);
            }
        }

        let registry = self.clone();
        let instance_key = key.to_string();
        let ctx = WorkflowContext {
            key: instance_key.clone(),
            channels,
        };
        tokio::spawn(async move {
            let result = Box::new(workflow).run(ctx).await;
            registry.instances.lock().await.remove(&instance_key);
            match result {
                Ok(()) => {
                    if let Err(err) = registry
                        .journal
                        .append(&instance_key, COMPLETED_KIND, &Value::Null)
                        .await
                    {
                        tracing::error!(instance = %instance_key, error = %err, "failed to journal instance completion");
                    }
                    tracing::info!(instance = %instance_key, "workflow instance completed");
                }
                Err(err) => {
                    tracing::error!(instance = %instance_key, error = %err, "workflow instance failed terminally");
                }
            }
        });

        Ok(())
    }

    /// Delivers a signal to a live instance.
    ///
    /// The signal is journaled before it is enqueued. A queue whose receiver
    /// was dropped (the instance stopped consuming that kind) yields
    /// [`FlowError::SignalRejected`]; the journaled record stays.
    pub async fn signal(&self, key: &str, kind: &str, payload: Value) -> Result<(), FlowError> {
        let sender = {
            let instances = self.instances.lock().await;
            let handle = instances
                .get(key)
                .ok_or_else(|| FlowError::UnknownInstance(key.to_string()))?;
            handle
                .senders
                .get(kind)
                .ok_or_else(|| FlowError::UnknownSignal {
                    key: key.to_string(),
                    kind: kind.to_string(),
                })?
                .clone()
        };

        self.journal.append(key, kind, &payload).await?;

        sender.send(payload).map_err(|_| {
            tracing::warn!(instance = %key, kind, "signal dropped, instance no longer consuming this kind");
            FlowError::SignalRejected {
                key: key.to_string(),
                kind: kind.to_string(),
            }
        })
    }

    /// True while an instance is registered under `key`.
    pub async fn is_running(&self, key: &str) -> bool {
        self.instances.lock().await.contains_key(key)
    }

    /// Keys with a start record and no completion record in the journal.
    pub async fn open_keys(&self) -> Result<Vec<String>, FlowError> {
        self.journal.open_keys().await
    }

    /// The initial payload recorded when the instance started, if any.
    pub async fn started_payload(&self, key: &str) -> Result<Option<Value>, FlowError> {
        let records = self.journal.load(key).await?;
        Ok(records
            .into_iter()
            .find(|r| r.kind == STARTED_KIND)
            .map(|r| r.payload))
    }
}
