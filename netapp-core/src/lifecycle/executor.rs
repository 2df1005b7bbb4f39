//! Interface to the download/install executor.
//!
//! The executor performs the actual transfer and installation. It reports
//! back through an event channel that the lifecycle manager consumes.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::state::LifecycleEvent;
use super::types::ApplicationRecord;

// =============================================================================
// Events
// =============================================================================

/// Feedback for one application, sent from the executor to the manager.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorEvent {
    pub app_id: String,
    pub event: LifecycleEvent,
}

impl ExecutorEvent {
    pub fn progress(app_id: impl Into<String>, fraction: f32) -> Self {
        Self {
            app_id: app_id.into(),
            event: LifecycleEvent::Progress(fraction),
        }
    }

    pub fn completed(app_id: impl Into<String>, version: Option<String>) -> Self {
        Self {
            app_id: app_id.into(),
            event: LifecycleEvent::Completed { version },
        }
    }

    pub fn failed(app_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            event: LifecycleEvent::Failed(error.into()),
        }
    }
}

// =============================================================================
// Channel Types
// =============================================================================

/// Sender for executor events.
pub type EventSender = mpsc::UnboundedSender<ExecutorEvent>;

/// Receiver for executor events.
pub type EventReceiver = mpsc::UnboundedReceiver<ExecutorEvent>;

/// Create an event channel for executor feedback.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

// =============================================================================
// Executor
// =============================================================================

/// External collaborator that moves bytes and installs bundles.
///
/// Each method starts work and returns once it has been handed off; progress
/// and the terminal outcome arrive later on `events`. An `Err` means the work
/// could not be started at all.
#[async_trait]
pub trait InstallExecutor: Send + Sync {
    async fn download_and_install(
        &self,
        app: ApplicationRecord,
        events: EventSender,
    ) -> anyhow::Result<()>;

    async fn pause(&self, app_id: &str) -> anyhow::Result<()>;

    async fn resume(&self, app: ApplicationRecord, events: EventSender) -> anyhow::Result<()>;

    async fn cancel(&self, app_id: &str) -> anyhow::Result<()>;

    async fn uninstall(&self, app: ApplicationRecord, events: EventSender) -> anyhow::Result<()>;

    async fn update(&self, app: ApplicationRecord, events: EventSender) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_channel_delivers_in_order() {
        let (tx, mut rx) = event_channel();
        tx.send(ExecutorEvent::progress("a", 0.5)).unwrap();
        tx.send(ExecutorEvent::completed("a", Some("1.0.0".to_string())))
            .unwrap();
        drop(tx);

        assert_eq!(rx.recv().await, Some(ExecutorEvent::progress("a", 0.5)));
        assert_eq!(
            rx.recv().await.unwrap().event,
            LifecycleEvent::Completed {
                version: Some("1.0.0".to_string())
            }
        );
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_failed_constructor() {
        let event = ExecutorEvent::failed("a", "network unreachable");
        assert_eq!(event.app_id, "a");
        assert_eq!(
            event.event,
            LifecycleEvent::Failed("network unreachable".to_string())
        );
    }
}
