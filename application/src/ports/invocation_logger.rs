//! Port for structured invocation logging.
//!
//! Defines the [`InvocationLogger`] trait for recording one audit record per
//! tool call (tool, entity, outcome) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable trail of what the agent did to which entity (JSONL).

use serde_json::Value;

/// A structured invocation event for logging.
pub struct InvocationEvent {
    /// Event type identifier (e.g., "tool_invocation", "finder_resolved").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl InvocationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging invocation events.
///
/// The `log` method is synchronous and non-fallible: a failing audit sink
/// must never change the outcome of a tool call.
pub trait InvocationLogger: Send + Sync {
    fn log(&self, event: InvocationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoInvocationLogger;

impl InvocationLogger for NoInvocationLogger {
    fn log(&self, _event: InvocationEvent) {}
}
