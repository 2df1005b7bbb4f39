//! NetApp Core Library
//!
//! This crate provides the core functionality for the NetApp launcher, which
//! installs and keeps desktop applications up to date. It includes:
//!
//! - Platform-specific executable name resolution
//! - Local install probing and installed-version discovery
//! - The installation state machine and its UI action view
//! - Configuration management (release channel, install root)

pub mod config;
pub mod lifecycle;

// Re-exports for convenience
pub use config::{LifecycleConfig, ReleaseChannel};

pub use lifecycle::{
    load_catalog_from, AppKind, AppStore, ApplicationRecord, Catalog, ExecutorEvent,
    InstallExecutor, InstallProber, LifecycleError, LifecycleManager, Phase, Platform,
    PlatformResolver, PrimaryAction, Probed, Transition, Trigger, VersionReader,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
