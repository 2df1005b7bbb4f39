//! Lifecycle manager coordinating probes, transitions and the executor.
//!
//! The `LifecycleManager` is the main entry point for front ends. It owns the
//! resolver/prober/version reader trio, applies user triggers to the shared
//! store, hands applied transitions to the executor, and folds executor
//! feedback back into the store.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::error::{LifecycleError, ProbeError};
use super::executor::{event_channel, EventReceiver, EventSender, ExecutorEvent, InstallExecutor};
use super::notify::{Connectivity, Notification, NotificationSender};
use super::prober::InstallProber;
use super::resolver::PlatformResolver;
use super::state::{LifecycleEvent, Phase, Transition, Trigger};
use super::store::AppStore;
use super::types::ApplicationRecord;
use super::version::VersionReader;
use crate::config::LifecycleConfig;

// ============================================================================
// Local Status
// ============================================================================

/// What a refresh found on disk for one application.
#[derive(Debug)]
pub struct LocalStatus {
    pub app_id: String,
    pub installed: bool,
    pub version: Option<String>,
    /// Probe problems encountered on the way. Empty on a clean probe.
    pub diagnostics: Vec<ProbeError>,
}

// ============================================================================
// Lifecycle Manager
// ============================================================================

pub struct LifecycleManager {
    resolver: PlatformResolver,
    prober: InstallProber,
    versions: VersionReader,
    store: AppStore,
    executor: Arc<dyn InstallExecutor>,
    connectivity: Arc<dyn Connectivity>,
    notifications: NotificationSender,
    events: EventSender,
}

impl LifecycleManager {
    /// Creates a manager and the receiver for executor events.
    ///
    /// Feed the receiver to [`LifecycleManager::run`].
    pub fn new(
        config: LifecycleConfig,
        store: AppStore,
        executor: Arc<dyn InstallExecutor>,
        connectivity: Arc<dyn Connectivity>,
        notifications: NotificationSender,
    ) -> (Self, EventReceiver) {
        let resolver = PlatformResolver::new(Arc::new(config));
        let prober = InstallProber::new(resolver.clone());
        let versions = VersionReader::new(prober.clone(), store.clone());
        let (events, receiver) = event_channel();

        info!(
            platform = ?resolver.config().platform,
            channel = %resolver.config().release_channel,
            root = %resolver.install_root().display(),
            "LifecycleManager initialized"
        );

        let manager = Self {
            resolver,
            prober,
            versions,
            store,
            executor,
            connectivity,
            notifications,
            events,
        };
        (manager, receiver)
    }

    /// Shared record store.
    pub fn store(&self) -> &AppStore {
        &self.store
    }

    /// Platform resolver built from the config.
    pub fn resolver(&self) -> &PlatformResolver {
        &self.resolver
    }

    /// Local install prober.
    pub fn prober(&self) -> &InstallProber {
        &self.prober
    }

    /// Installed version reader.
    pub fn versions(&self) -> &VersionReader {
        &self.versions
    }

    /// Sender executors can use outside of a dispatched call.
    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Probes one application and syncs its steady phase and version.
    pub async fn refresh(&self, app_id: &str) -> Result<LocalStatus, LifecycleError> {
        let record = self.record(app_id).await?;
        let mut diagnostics = Vec::new();

        let (installed, diagnostic) = self.prober.is_installed_locally(&record).await?.into_parts();
        diagnostics.extend(diagnostic);

        let version = if installed {
            let (version, diagnostic) = self
                .versions
                .read_local_version(&record)
                .await?
                .into_parts();
            diagnostics.extend(diagnostic);
            version
        } else {
            None
        };

        // A failed probe says nothing about the disk, so leave the phase alone.
        if diagnostics.is_empty() {
            self.store
                .update(app_id, |record| record.sync_installed(installed))
                .await;
        }

        Ok(LocalStatus {
            app_id: app_id.to_string(),
            installed,
            version,
            diagnostics,
        })
    }

    /// Refreshes every application concurrently.
    pub async fn refresh_all(&self) -> Result<Vec<LocalStatus>, LifecycleError> {
        let ids = self.store.ids().await;
        join_all(ids.iter().map(|id| self.refresh(id)))
            .await
            .into_iter()
            .collect()
    }

    // ========================================================================
    // Triggers
    // ========================================================================

    /// Applies a user trigger and starts the matching executor work.
    pub async fn trigger(&self, app_id: &str, trigger: Trigger) -> Result<Transition, LifecycleError> {
        let record = self.record(app_id).await?;

        // Dry run first so illegal triggers never produce an offline notice.
        let dry_run = record.clone().apply_trigger(trigger);
        if !dry_run.is_applied() {
            debug!(app = %app_id, %trigger, "Trigger not legal in current phase");
            return Ok(dry_run);
        }

        if trigger.requires_network() && !self.connectivity.is_online() {
            info!(app = %app_id, %trigger, "Refusing trigger while offline");
            if self.notifications.send(Notification::no_internet(&record)).is_err() {
                warn!("Notification channel closed, offline notice dropped");
            }
            return Ok(Transition::RefusedOffline);
        }

        let (transition, snapshot) = self
            .store
            .update(app_id, |record| (record.apply_trigger(trigger), record.clone()))
            .await
            .ok_or_else(|| LifecycleError::UnknownApplication(app_id.to_string()))?;

        // Another caller may have moved the record since the dry run.
        if transition.is_applied() {
            info!(app = %app_id, %trigger, "Trigger applied");
            self.dispatch(trigger, snapshot).await;
        }

        Ok(transition)
    }

    async fn dispatch(&self, trigger: Trigger, app: ApplicationRecord) {
        let app_id = app.id.clone();
        let events = self.events.clone();

        let result = match trigger {
            Trigger::Download => self.executor.download_and_install(app, events).await,
            Trigger::Resume => self.executor.resume(app, events).await,
            Trigger::Update => self.executor.update(app, events).await,
            Trigger::Uninstall => self.executor.uninstall(app, events).await,
            Trigger::Pause => self.executor.pause(&app_id).await,
            Trigger::Cancel => self.executor.cancel(&app_id).await,
            Trigger::Reset => Ok(()),
        };

        if let Err(e) = result {
            match trigger {
                Trigger::Pause | Trigger::Cancel => {
                    warn!(app = %app_id, %trigger, error = %e, "Executor did not acknowledge");
                }
                _ => {
                    error!(app = %app_id, %trigger, error = %e, "Executor failed to start");
                    self.handle_event(ExecutorEvent::failed(app_id, e.to_string()))
                        .await;
                }
            }
        }
    }

    // ========================================================================
    // Executor Events
    // ========================================================================

    /// Folds one executor event into the store.
    ///
    /// Returns `None` for events about unknown applications.
    pub async fn handle_event(&self, event: ExecutorEvent) -> Option<Transition> {
        let ExecutorEvent { app_id, event } = event;
        let needs_version = matches!(event, LifecycleEvent::Completed { version: None });

        let Some((transition, record)) = self
            .store
            .update(&app_id, |record| (record.apply_event(event), record.clone()))
            .await
        else {
            warn!(app = %app_id, "Executor event for unknown application");
            return None;
        };

        if let Some(error) = record.error() {
            if transition.is_applied() {
                warn!(app = %app_id, %error, "Installation failed");
            }
        }

        if transition.is_applied() && needs_version && record.phase == Phase::Installed {
            if let Err(e) = self.versions.read_local_version(&record).await {
                error!(app = %app_id, error = %e, "Could not read version after install");
            }
        }

        Some(transition)
    }

    /// Consumes executor events until every sender is dropped.
    pub async fn run(&self, mut receiver: EventReceiver) {
        while let Some(event) = receiver.recv().await {
            self.handle_event(event).await;
        }
        debug!("Executor event channel closed");
    }

    async fn record(&self, app_id: &str) -> Result<ApplicationRecord, LifecycleError> {
        self.store
            .get(app_id)
            .await
            .ok_or_else(|| LifecycleError::UnknownApplication(app_id.to_string()))
    }
}
