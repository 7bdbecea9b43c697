//! Engine error types

use thiserror::Error;

/// Errors raised by the durable execution engine.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A live instance already exists for this key.
    #[error("workflow instance already running: {0}")]
    DuplicateInstance(String),

    /// No live instance is registered under this key.
    #[error("no running workflow instance: {0}")]
    UnknownInstance(String),

    /// The instance does not subscribe to this signal kind.
    #[error("instance {key} has no signal channel for {kind}")]
    UnknownSignal { key: String, kind: String },

    /// The instance stopped consuming this signal kind (e.g. it is
    /// finalizing); the signal was journaled but dropped.
    #[error("instance {key} rejected signal {kind}")]
    SignalRejected { key: String, kind: String },

    /// Journal read or write failed.
    #[error("journal failure: {0}")]
    Journal(String),

    /// Signal payload could not be serialized or deserialized.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// All signal sources closed while the workflow was still waiting.
    #[error("signal channels closed for instance {0}")]
    ChannelsClosed(String),

    /// A retried step exhausted its attempt budget. Terminal for the
    /// instance; surfaced on the operator log as an alert condition.
    #[error("step {step} failed after {attempts} attempts: {message}")]
    StepFailed {
        step: &'static str,
        attempts: u32,
        message: String,
    },
}
