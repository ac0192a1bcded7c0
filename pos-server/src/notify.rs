//! Notification sink collaborator
//!
//! The engine calls the sink synchronously after every command: once per
//! committed event, or once with the error when the command fails. UI layers
//! use this to drive toasts/indicators without polling.

use shared::order::{CommandError, OrderEvent};

/// Receives success/failure callbacks from the engine.
pub trait NotificationSink: Send + Sync {
    /// Called once per committed event, after the transaction commits.
    fn notify_event(&self, event: &OrderEvent);

    /// Called when a command fails. The stored order is untouched.
    fn notify_failure(&self, command_id: &str, error: &CommandError);
}

/// Default sink: structured log lines via `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify_event(&self, event: &OrderEvent) {
        tracing::info!(
            order_id = %event.order_id,
            event_type = %event.event_type,
            sequence = event.sequence,
            "order event"
        );
    }

    fn notify_failure(&self, command_id: &str, error: &CommandError) {
        tracing::warn!(
            command_id = %command_id,
            code = ?error.code,
            message = %error.message,
            "command failed"
        );
    }
}
