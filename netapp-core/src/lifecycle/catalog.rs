//! Application catalog persistence.
//!
//! The catalog lists the applications the launcher can manage. It is
//! produced elsewhere and read from a JSON file:
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "applications": [
//!     { "id": "safe-browser", "name": "Safe Browser", "packageName": "safe-browser",
//!       "latestVersion": "v0.15.4", "type": "userland" }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::state::Phase;
use super::types::{AppKind, ApplicationRecord};

/// Current schema version for the catalog file.
const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Catalog Data Structures
// ============================================================================

/// One catalog entry as published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: AppKind,
    #[serde(default)]
    pub icon_path: Option<String>,
}

impl From<CatalogEntry> for ApplicationRecord {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            package_name: entry.package_name,
            current_version: None,
            latest_version: entry.latest_version,
            kind: entry.kind,
            icon_path: entry.icon_path,
            phase: Phase::NotInstalled,
        }
    }
}

/// Root structure for the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    #[serde(default)]
    pub applications: Vec<CatalogEntry>,
    /// When the catalog was read, not persisted.
    #[serde(skip, default = "Utc::now")]
    pub loaded_at: DateTime<Utc>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            applications: Vec::new(),
            loaded_at: Utc::now(),
        }
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    /// Converts entries into fresh records. Entries without an id are skipped.
    pub fn into_records(self) -> Vec<ApplicationRecord> {
        self.applications
            .into_iter()
            .filter(|entry| {
                let keep = !entry.id.trim().is_empty();
                if !keep {
                    warn!(name = %entry.name, "Skipping catalog entry without an id");
                }
                keep
            })
            .map(ApplicationRecord::from)
            .collect()
    }
}

// ============================================================================
// Catalog Persistence
// ============================================================================

/// Loads the catalog from disk.
///
/// If the file doesn't exist, returns an empty catalog.
/// If the file exists but is corrupted, logs a warning and returns empty.
pub fn load_catalog_from(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        debug!("Catalog not found at {}, starting empty", path.display());
        return Ok(Catalog::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog from {}", path.display()))?;

    match serde_json::from_str::<Catalog>(&content) {
        Ok(mut catalog) => {
            if catalog.schema_version != SCHEMA_VERSION {
                info!(
                    "Catalog schema version {} differs from current {}, reading anyway",
                    catalog.schema_version, SCHEMA_VERSION
                );
                catalog.schema_version = SCHEMA_VERSION;
            }
            info!(
                "Loaded {} applications from {}",
                catalog.applications.len(),
                path.display()
            );
            Ok(catalog)
        }
        Err(e) => {
            warn!(
                "Failed to parse catalog at {}: {}. Starting empty.",
                path.display(),
                e
            );
            Ok(Catalog::new())
        }
    }
}

/// Saves the catalog to disk.
pub fn save_catalog_to(catalog: &Catalog, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create catalog directory: {}", parent.display())
        })?;
    }

    let content = serde_json::to_string_pretty(catalog).context("Failed to serialize catalog")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write catalog to {}", path.display()))?;

    debug!("Catalog saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.applications.push(CatalogEntry {
            id: "safe-browser".to_string(),
            name: "Safe Browser".to_string(),
            package_name: Some("safe-browser".to_string()),
            latest_version: Some("v0.15.4".to_string()),
            kind: AppKind::Userland,
            icon_path: None,
        });
        catalog.applications.push(CatalogEntry {
            id: "safe-cli".to_string(),
            name: "Safe CLI".to_string(),
            package_name: None,
            latest_version: Some("v0.9.0".to_string()),
            kind: AppKind::Bin,
            icon_path: Some("icons/cli.png".to_string()),
        });
        catalog
    }

    #[test]
    fn test_catalog_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.json");

        save_catalog_to(&create_test_catalog(), &path).unwrap();
        let loaded = load_catalog_from(&path).unwrap();

        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
        assert_eq!(loaded.applications, create_test_catalog().applications);
    }

    #[test]
    fn test_catalog_missing_file_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent").join("catalog.json");

        let catalog = load_catalog_from(&path).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_catalog_corrupted_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.json");
        fs::write(&path, "not valid json {{{{").unwrap();

        let catalog = load_catalog_from(&path).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_catalog_json_format() {
        let json = serde_json::to_string_pretty(&create_test_catalog()).unwrap();
        assert!(json.contains("schema_version"));
        assert!(json.contains("packageName"));
        assert!(json.contains("latestVersion"));
        assert!(json.contains("\"type\": \"bin\""));
        assert!(!json.contains("loaded_at"));
    }

    #[test]
    fn test_into_records() {
        let mut catalog = create_test_catalog();
        catalog.applications.push(CatalogEntry {
            id: "  ".to_string(),
            name: "Nameless".to_string(),
            package_name: None,
            latest_version: None,
            kind: AppKind::Userland,
            icon_path: None,
        });

        let records = catalog.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].phase, Phase::NotInstalled);
        assert!(records[0].current_version.is_none());
        assert_eq!(records[1].kind, AppKind::Bin);
    }

    #[test]
    fn test_entry_minimal_json() {
        let entry: CatalogEntry = serde_json::from_str(r#"{ "id": "x" }"#).unwrap();
        assert_eq!(entry.kind, AppKind::Userland);
        assert!(entry.name.is_empty());
    }
}
