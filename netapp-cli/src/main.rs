//! NetApp command line front end
//!
//! Lists the applications in a catalog together with their local install
//! state and the action a user could take next.
//!
//! ```text
//! netapp [--json] [CATALOG]
//! ```

mod report;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use netapp_core::config::{LifecycleConfig, CONFIG_PATH_ENV};
use netapp_core::lifecycle::{
    notification_channel, EventSender, LifecycleManager, OnlineFlag,
};
use netapp_core::{load_catalog_from, AppStore, ApplicationRecord, InstallExecutor};
use std::path::PathBuf;
use std::sync::Arc;

/// netapp - application launcher status
#[derive(Parser, Debug)]
#[command(name = "netapp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Print rows as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Path to the application catalog
    #[arg(default_value = "catalog.json")]
    catalog: PathBuf,
}

/// Executor for a read-only front end: refuses to start any work.
struct ReadOnlyExecutor;

impl ReadOnlyExecutor {
    fn refuse(action: &str, app_id: &str) -> Result<()> {
        anyhow::bail!("cannot {action} {app_id}: this front end is read-only")
    }
}

#[async_trait]
impl InstallExecutor for ReadOnlyExecutor {
    async fn download_and_install(&self, app: ApplicationRecord, _events: EventSender) -> Result<()> {
        Self::refuse("download", &app.id)
    }

    async fn pause(&self, app_id: &str) -> Result<()> {
        Self::refuse("pause", app_id)
    }

    async fn resume(&self, app: ApplicationRecord, _events: EventSender) -> Result<()> {
        Self::refuse("resume", &app.id)
    }

    async fn cancel(&self, app_id: &str) -> Result<()> {
        Self::refuse("cancel", app_id)
    }

    async fn uninstall(&self, app: ApplicationRecord, _events: EventSender) -> Result<()> {
        Self::refuse("uninstall", &app.id)
    }

    async fn update(&self, app: ApplicationRecord, _events: EventSender) -> Result<()> {
        Self::refuse("update", &app.id)
    }
}

fn load_config() -> LifecycleConfig {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => LifecycleConfig::load_from(&PathBuf::from(path))
            .with_env_overrides(|key| std::env::var(key).ok()),
        None => LifecycleConfig::from_env(),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("netapp=debug".parse()?)
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting NetApp v{}", netapp_core::VERSION);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let config = load_config();
    let catalog = load_catalog_from(&args.catalog)?;
    if catalog.is_empty() {
        tracing::warn!(path = %args.catalog.display(), "Catalog is empty");
    }

    let store = AppStore::from_records(catalog.into_records());
    let (notifications, _notices) = notification_channel();
    let (manager, _events) = LifecycleManager::new(
        config,
        store,
        Arc::new(ReadOnlyExecutor),
        Arc::new(OnlineFlag::default()),
        notifications,
    );

    let statuses = manager.refresh_all().await?;
    for status in &statuses {
        for diagnostic in &status.diagnostics {
            tracing::warn!(app = %status.app_id, %diagnostic, "Probe incomplete");
        }
    }

    let records = manager.store().snapshot().await;
    let rows = report::rows(manager.resolver(), &records);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report::to_json(&rows))?);
    } else {
        print!("{}", report::to_table(&rows));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["netapp"]).unwrap();
        assert!(!args.json);
        assert_eq!(args.catalog, PathBuf::from("catalog.json"));
    }

    #[test]
    fn test_args_json_and_catalog() {
        let args = Args::try_parse_from(["netapp", "--json", "apps.json"]).unwrap();
        assert!(args.json);
        assert_eq!(args.catalog, PathBuf::from("apps.json"));
    }

    #[test]
    fn test_args_reject_unknown_flags() {
        assert!(Args::try_parse_from(["netapp", "--jsn"]).is_err());
        assert!(Args::try_parse_from(["netapp", "a.json", "b.json"]).is_err());
    }

    #[test]
    fn test_args_help_is_not_a_catalog() {
        let err = Args::try_parse_from(["netapp", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
