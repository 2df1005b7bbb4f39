//! Local version discovery.
//!
//! Linux installs encode the version in the AppImage file name. macOS and
//! Windows installs ship a plain-text `version` marker next to the bundle.
//! Every discovered version is normalized to a `v`-prefixed form before it
//! is stored.

use regex::Regex;
use std::io;
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

use super::error::{LifecycleError, ProbeError};
use super::paths::{macos_version_file, WINDOWS_VERSION_FILE};
use super::probed::Probed;
use super::prober::InstallProber;
use super::store::AppStore;
use super::types::{ApplicationRecord, Platform};

/// `major.minor.patch`, optionally `-alpha`/`-beta` and a numeric build suffix.
const SEMVER_PATTERN: &str = r"(\d+\.)(\d+\.)(\d+)(-alpha|-beta)?(\.\d+)?";

fn semver_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SEMVER_PATTERN).expect("semver pattern is valid"))
}

/// Returns the first semantic-version token found in `text`.
///
/// `myapp-v1.2.3-beta.4-linux-x64.AppImage` yields `1.2.3-beta.4`.
pub fn extract_semver(text: &str) -> Option<&str> {
    semver_regex().find(text).map(|m| m.as_str())
}

/// Trims a raw version and prefixes `v` when missing.
///
/// Empty or whitespace-only input yields `None`.
pub fn normalize_version(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('v') {
        Some(trimmed.to_string())
    } else {
        Some(format!("v{}", trimmed))
    }
}

// ============================================================================
// Version Reader
// ============================================================================

/// Reads installed versions and writes them back into the store.
#[derive(Debug, Clone)]
pub struct VersionReader {
    prober: InstallProber,
    store: AppStore,
}

impl VersionReader {
    pub fn new(prober: InstallProber, store: AppStore) -> Self {
        Self { prober, store }
    }

    /// Discovers the locally installed version of `app`.
    ///
    /// On success the normalized version is written into the store. Missing
    /// installs and unreadable files produce `None` and leave the store
    /// untouched.
    pub async fn read_local_version(
        &self,
        app: &ApplicationRecord,
    ) -> Result<Probed<Option<String>>, LifecycleError> {
        info!(app = %app.id, "Checking locally installed version");

        let platform = self.prober.resolver().platform()?;
        let raw = match platform {
            Platform::Linux => self.linux_version(app).await,
            Platform::MacOs | Platform::Windows => self.marker_file_version(app, platform).await?,
        };

        let (raw, diagnostic) = raw.into_parts();
        let version = raw.as_deref().and_then(normalize_version);

        match &version {
            Some(version) => {
                info!(app = %app.id, %version, "Local version found");
                self.store.set_current_version(&app.id, version.clone()).await;
            }
            None => info!(app = %app.id, "No local version found"),
        }

        Ok(Probed::from_parts(version, diagnostic))
    }

    async fn linux_version(&self, app: &ApplicationRecord) -> Probed<Option<String>> {
        self.prober
            .locate_installed_linux_package(app)
            .await
            .map(|file_name| {
                let file_name = file_name?;
                debug!(app = %app.id, %file_name, "Installed linux package found");
                let version = extract_semver(&file_name);
                if version.is_none() {
                    debug!(app = %app.id, %file_name, "No version token in file name");
                }
                version.map(str::to_string)
            })
    }

    async fn marker_file_version(
        &self,
        app: &ApplicationRecord,
        platform: Platform,
    ) -> Result<Probed<Option<String>>, LifecycleError> {
        let Some(location) = self.prober.resolver().installed_location(app)? else {
            return Ok(Probed::ok(None));
        };

        let version_file = match platform {
            Platform::Windows => location
                .parent()
                .map(|dir| dir.join(WINDOWS_VERSION_FILE))
                .unwrap_or_else(|| self.prober.resolver().install_root().join(WINDOWS_VERSION_FILE)),
            _ => location.join(macos_version_file()),
        };
        debug!(app = %app.id, path = %version_file.display(), "Version file location to check");

        match tokio::fs::read_to_string(&version_file).await {
            Ok(contents) => Ok(Probed::ok(Some(contents))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    app = %app.id,
                    path = %version_file.display(),
                    "Version file was not found. This may be due to an update in progress"
                );
                Ok(Probed::ok(None))
            }
            Err(e) => {
                error!(app = %app.id, path = %version_file.display(), error = %e, "Error reading local app version");
                Ok(Probed::degraded(None, ProbeError::io(version_file, e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LifecycleConfig, ReleaseChannel};
    use crate::lifecycle::resolver::PlatformResolver;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn reader(platform: Platform, channel: &str, root: &Path, store: &AppStore) -> VersionReader {
        let config = LifecycleConfig::new(Some(platform), ReleaseChannel::new(channel), root);
        let prober = InstallProber::new(PlatformResolver::new(Arc::new(config)));
        VersionReader::new(prober, store.clone())
    }

    #[test]
    fn test_extract_semver_from_linux_file_name() {
        assert_eq!(
            extract_semver("myapp-v1.2.3-beta.4-linux-x64.AppImage"),
            Some("1.2.3-beta.4")
        );
        assert_eq!(
            extract_semver("safe-browser-v0.10.2-linux-x64.AppImage"),
            Some("0.10.2")
        );
        assert_eq!(extract_semver("safe-browser-alpha-linux-x64.AppImage"), None);
    }

    #[test]
    fn test_extract_semver_first_match_wins() {
        assert_eq!(
            extract_semver("app-v1.0.0-linux-x64.AppImage\napp-v2.0.0-linux-x64.AppImage"),
            Some("1.0.0")
        );
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("1.0.0").as_deref(), Some("v1.0.0"));
        assert_eq!(normalize_version("v1.0.0").as_deref(), Some("v1.0.0"));
        assert_eq!(normalize_version("1.0.0\n").as_deref(), Some("v1.0.0"));
        assert_eq!(normalize_version(""), None);
        assert_eq!(normalize_version("   \n"), None);
    }

    #[tokio::test]
    async fn test_linux_version_from_file_name() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("myapp-v1.2.3-beta.4-linux-x64.AppImage"),
            b"",
        )
        .unwrap();

        let store = AppStore::from_records([ApplicationRecord::new("myapp", "My App").with_package_name("myapp")]);
        let app = store.get("myapp").await.unwrap();
        let reader = reader(Platform::Linux, "beta", temp.path(), &store);

        let version = reader.read_local_version(&app).await.unwrap();
        assert_eq!(version.value().as_deref(), Some("v1.2.3-beta.4"));
        assert!(!version.is_degraded());
        assert_eq!(
            store.get("myapp").await.unwrap().current_version.as_deref(),
            Some("v1.2.3-beta.4")
        );
    }

    #[tokio::test]
    async fn test_linux_not_installed_leaves_store_untouched() {
        let temp = TempDir::new().unwrap();
        let store = AppStore::from_records([ApplicationRecord::new("myapp", "My App")
            .with_package_name("myapp")
            .with_current_version("v0.9.0")]);
        let mut app = store.get("myapp").await.unwrap();
        app.current_version = None;

        let version = reader(Platform::Linux, "", temp.path(), &store)
            .read_local_version(&app)
            .await
            .unwrap();
        assert!(version.value().is_none());
        assert_eq!(
            store.get("myapp").await.unwrap().current_version.as_deref(),
            Some("v0.9.0")
        );
    }

    #[tokio::test]
    async fn test_macos_version_file_is_normalized() {
        let temp = TempDir::new().unwrap();
        let resources = temp.path().join("Safe Browser Beta.app/Contents/Resources");
        std::fs::create_dir_all(&resources).unwrap();
        std::fs::write(resources.join("version"), "0.5.1\n").unwrap();

        let store = AppStore::from_records([ApplicationRecord::new("browser", "Safe Browser")]);
        let app = store.get("browser").await.unwrap();

        let version = reader(Platform::MacOs, "beta", temp.path(), &store)
            .read_local_version(&app)
            .await
            .unwrap();
        assert_eq!(version.value().as_deref(), Some("v0.5.1"));
        assert_eq!(
            store.get("browser").await.unwrap().current_version.as_deref(),
            Some("v0.5.1")
        );
    }

    #[tokio::test]
    async fn test_windows_version_file_next_to_executable() {
        let temp = TempDir::new().unwrap();
        let app_dir = temp.path().join("Safe Browser");
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("version"), "v2.0.0").unwrap();

        let store = AppStore::from_records([ApplicationRecord::new("browser", "Safe Browser")]);
        let app = store.get("browser").await.unwrap();

        let version = reader(Platform::Windows, "", temp.path(), &store)
            .read_local_version(&app)
            .await
            .unwrap();
        assert_eq!(version.value().as_deref(), Some("v2.0.0"));
    }

    #[tokio::test]
    async fn test_missing_version_file_returns_none() {
        let temp = TempDir::new().unwrap();
        let store = AppStore::from_records([ApplicationRecord::new("browser", "Safe Browser")]);
        let app = store.get("browser").await.unwrap();

        let version = reader(Platform::MacOs, "", temp.path(), &store)
            .read_local_version(&app)
            .await
            .unwrap();
        assert!(version.value().is_none());
        assert!(!version.is_degraded());
        assert!(store.get("browser").await.unwrap().current_version.is_none());
    }

    #[tokio::test]
    async fn test_empty_version_file_is_not_written_back() {
        let temp = TempDir::new().unwrap();
        let resources = temp.path().join("Safe Browser.app/Contents/Resources");
        std::fs::create_dir_all(&resources).unwrap();
        std::fs::write(resources.join("version"), "  \n").unwrap();

        let store = AppStore::from_records([ApplicationRecord::new("browser", "Safe Browser")]);
        let app = store.get("browser").await.unwrap();

        let version = reader(Platform::MacOs, "", temp.path(), &store)
            .read_local_version(&app)
            .await
            .unwrap();
        assert!(version.value().is_none());
        assert!(store.get("browser").await.unwrap().current_version.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_version_file_is_degraded() {
        let temp = TempDir::new().unwrap();
        // A directory where the marker file should be makes the read fail.
        let marker = temp.path().join("Safe Browser.app/Contents/Resources/version");
        std::fs::create_dir_all(&marker).unwrap();

        let store = AppStore::from_records([ApplicationRecord::new("browser", "Safe Browser")]);
        let app = store.get("browser").await.unwrap();

        let version = reader(Platform::MacOs, "", temp.path(), &store)
            .read_local_version(&app)
            .await
            .unwrap();
        assert!(version.value().is_none());
        assert!(version.is_degraded());
    }

    #[tokio::test]
    async fn test_unsupported_platform_propagates() {
        let temp = TempDir::new().unwrap();
        let store = AppStore::new();
        let config = LifecycleConfig::new(None, ReleaseChannel::stable(), temp.path());
        let reader = VersionReader::new(
            InstallProber::new(PlatformResolver::new(Arc::new(config))),
            store,
        );

        let result = reader
            .read_local_version(&ApplicationRecord::new("x", "X"))
            .await;
        assert!(matches!(result, Err(LifecycleError::UnsupportedPlatform(_))));
    }
}
