//! Platform-specific executable naming.
//!
//! Maps an application to the name of its bundle or executable relative to
//! the install root. No I/O happens here.
//!
//! | Platform | Name |
//! |----------|------|
//! | macOS    | `<name>[ <Channel>].app` |
//! | Windows  | `<name>/<name>[ <Channel>].exe` |
//! | Linux    | `<package>-<version>-linux-x64.AppImage` |

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

use super::error::LifecycleError;
use super::types::{ApplicationRecord, Platform, VersionSelector};
use crate::config::LifecycleConfig;

/// Resolver output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableName {
    /// Path relative to the install root.
    Resolved(PathBuf),
    /// Linux only: the selected version is unknown, so the file name cannot
    /// be built. Callers fall back to searching the install root.
    VersionUnknown,
}

impl ExecutableName {
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Resolved(path) => Some(path),
            Self::VersionUnknown => None,
        }
    }
}

/// Builds executable names and display names from the lifecycle config.
#[derive(Debug, Clone)]
pub struct PlatformResolver {
    config: Arc<LifecycleConfig>,
}

impl PlatformResolver {
    pub fn new(config: Arc<LifecycleConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn install_root(&self) -> &Path {
        &self.config.install_root
    }

    /// Returns the configured platform or the unsupported-platform error.
    pub fn platform(&self) -> Result<Platform, LifecycleError> {
        self.config
            .platform
            .ok_or_else(LifecycleError::unsupported_here)
    }

    /// Resolves the bundle/executable name for `app`.
    pub fn resolve_executable_name(
        &self,
        app: &ApplicationRecord,
        selector: VersionSelector,
    ) -> Result<ExecutableName, LifecycleError> {
        let platform = self.platform()?;
        let modifier = self.config.release_channel.modifier();

        let name = match platform {
            Platform::MacOs => ExecutableName::Resolved(PathBuf::from(format!(
                "{}{}.app",
                app.name_or_package(),
                modifier
            ))),
            Platform::Windows => ExecutableName::Resolved(
                PathBuf::from(&app.name).join(format!("{}{}.exe", app.name_or_package(), modifier)),
            ),
            Platform::Linux => {
                let version = match selector {
                    VersionSelector::Current => app.current_version.as_deref(),
                    VersionSelector::Latest => app.latest_version.as_deref(),
                };
                trace!(app = %app.id, ?selector, ?version, "Target version of app executable");

                match version.filter(|v| !v.is_empty()) {
                    Some(version) => ExecutableName::Resolved(PathBuf::from(linux_appimage_name(
                        app.package_or_name(),
                        version,
                    ))),
                    None => ExecutableName::VersionUnknown,
                }
            }
        };

        trace!(app = %app.id, ?name, "Executable is called");
        Ok(name)
    }

    /// Display name with the release-channel modifier (`Safe Browser Beta`).
    pub fn display_name(&self, app: &ApplicationRecord) -> String {
        format!("{}{}", app.name_or_package(), self.config.release_channel.modifier())
    }

    /// Absolute path of the installed bundle when it can be named without
    /// searching.
    pub fn installed_location(
        &self,
        app: &ApplicationRecord,
    ) -> Result<Option<PathBuf>, LifecycleError> {
        let name = self.resolve_executable_name(app, VersionSelector::Current)?;
        Ok(name.as_path().map(|rel| self.install_root().join(rel)))
    }
}

/// `<package>-<version>-linux-x64.AppImage`
pub fn linux_appimage_name(package: &str, version: &str) -> String {
    format!("{}-{}-linux-x64.AppImage", package, version)
}
