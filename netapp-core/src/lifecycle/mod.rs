//! Application lifecycle management.
//!
//! This module tracks installable applications from "not installed" through
//! download, pause, install, update and uninstall. The actual transfer is
//! delegated to an [`InstallExecutor`]; everything here is bookkeeping and
//! local-disk probing.
//!
//! # Architecture
//!
//! - `types`: Core types (Platform, AppKind, ApplicationRecord)
//! - `paths`: Default install roots and version marker locations
//! - `resolver`: Platform-specific executable names
//! - `prober`: Local install detection, including the Linux AppImage search
//! - `version`: Installed version discovery and normalization
//! - `state`: Phase enum, transition table and UI action derivation
//! - `store`: Shared in-memory record store
//! - `catalog`: JSON catalog of known applications
//! - `executor`: Executor trait and feedback channel
//! - `notify`: User notifications and connectivity
//! - `manager`: High-level API tying it all together
//!
//! # Example
//!
//! ```ignore
//! use netapp_core::lifecycle::{LifecycleManager, Trigger};
//!
//! let (manager, events) = LifecycleManager::new(config, store, executor, online, notices);
//! manager.refresh_all().await?;
//!
//! // Start a download; a second click while downloading is a no-op
//! manager.trigger("safe-browser", Trigger::Download).await?;
//!
//! // Fold executor progress back into the store
//! manager.run(events).await;
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod manager;
pub mod notify;
pub mod paths;
pub mod probed;
pub mod prober;
pub mod resolver;
pub mod state;
pub mod store;
pub mod types;
pub mod version;

// Re-export commonly used types
pub use catalog::{load_catalog_from, save_catalog_to, Catalog, CatalogEntry};
pub use error::{LifecycleError, ProbeError};
pub use executor::{event_channel, EventReceiver, EventSender, ExecutorEvent, InstallExecutor};
pub use manager::{LifecycleManager, LocalStatus};
pub use notify::{
    notification_channel, Connectivity, Notification, NotificationKind, NotificationReceiver,
    NotificationSender, OnlineFlag,
};
pub use paths::{default_install_root, macos_version_file, WINDOWS_VERSION_FILE};
pub use probed::Probed;
pub use prober::InstallProber;
pub use resolver::{linux_appimage_name, ExecutableName, PlatformResolver};
pub use state::{
    ActionState, LifecycleEvent, LifecycleFlags, Phase, PhaseKind, PrimaryAction, Transition,
    Trigger, CANCELLED_MESSAGE,
};
pub use store::AppStore;
pub use types::{AppKind, ApplicationRecord, Platform, VersionSelector};
pub use version::{extract_semver, normalize_version, VersionReader};
