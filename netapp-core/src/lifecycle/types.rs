//! Core types for application lifecycle management.
//!
//! This module defines the foundational types used across the lifecycle
//! infrastructure: platform detection, application classification and the
//! application record that every other component reads and mutates.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::Phase;

// ============================================================================
// Platform Detection
// ============================================================================

/// Operating system family that decides how executables are named and found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    /// Detects the current platform at runtime.
    ///
    /// Returns `None` if the platform is unsupported.
    pub fn detect() -> Option<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps an OS discriminator (as found in `std::env::consts::OS`) to a platform.
    pub fn from_os(os: &str) -> Option<Self> {
        match os {
            "macos" => Some(Self::MacOs),
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            _ => None,
        }
    }

    /// Returns a human-readable description of the platform.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::Windows => "Windows",
            Self::Linux => "Linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Application Classification
// ============================================================================

/// Distribution kind of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    /// Regular user-facing application that can be updated and removed.
    #[default]
    Userland,
    /// Binary/system application. Once installed it can only be opened.
    Bin,
}

/// Which known version the resolver should build a file name for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    /// The locally installed version.
    Current,
    /// The newest version known to the catalog.
    Latest,
}

// ============================================================================
// Application Record
// ============================================================================

/// The unit of management: one catalog application and its local lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    /// Stable opaque identifier.
    pub id: String,
    /// Display name, also used for macOS/Windows bundle names.
    pub name: String,
    /// Packaging name, preferred for Linux AppImage file names.
    #[serde(default)]
    pub package_name: Option<String>,
    /// Installed version, always `v`-prefixed once known.
    #[serde(default)]
    pub current_version: Option<String>,
    /// Latest version known remotely.
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub kind: AppKind,
    #[serde(default)]
    pub icon_path: Option<String>,
    /// Single active lifecycle phase.
    #[serde(default)]
    pub phase: Phase,
}

impl ApplicationRecord {
    /// Creates a not-installed record with no known versions.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            package_name: None,
            current_version: None,
            latest_version: None,
            kind: AppKind::default(),
            icon_path: None,
            phase: Phase::NotInstalled,
        }
    }

    /// Sets the packaging name used for Linux file names.
    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    /// Sets the latest version known remotely.
    pub fn with_latest_version(mut self, version: impl Into<String>) -> Self {
        self.latest_version = Some(version.into());
        self
    }

    /// Sets the installed version.
    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = Some(version.into());
        self
    }

    /// Sets the application kind.
    pub fn with_kind(mut self, kind: AppKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the lifecycle phase.
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// `name`, or the package name when the name is empty.
    pub fn name_or_package(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.package_name.as_deref().unwrap_or(&self.name)
    }

    /// Package name when present and non-empty, otherwise `name`.
    pub fn package_or_name(&self) -> &str {
        match self.package_name.as_deref() {
            Some(pkg) if !pkg.is_empty() => pkg,
            _ => &self.name,
        }
    }

    /// Binary applications can be installed but never updated or uninstalled.
    pub fn is_bin(&self) -> bool {
        self.kind == AppKind::Bin
    }

    /// True when `latest_version` is newer than `current_version`.
    ///
    /// Both sides are compared as semantic versions with any leading `v`
    /// stripped. When either side is not valid semver the versions are
    /// compared as plain strings and any difference counts as an update.
    pub fn has_update(&self) -> bool {
        let (Some(current), Some(latest)) = (&self.current_version, &self.latest_version) else {
            return false;
        };

        match (parse_semver(current), parse_semver(latest)) {
            (Some(current), Some(latest)) => latest > current,
            _ => strip_v(current) != strip_v(latest),
        }
    }
}

fn strip_v(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Parses a version string with an optional leading `v`.
pub(crate) fn parse_semver(version: &str) -> Option<semver::Version> {
    semver::Version::parse(strip_v(version.trim())).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_os() {
        assert_eq!(Platform::from_os("macos"), Some(Platform::MacOs));
        assert_eq!(Platform::from_os("windows"), Some(Platform::Windows));
        assert_eq!(Platform::from_os("linux"), Some(Platform::Linux));
        assert_eq!(Platform::from_os("freebsd"), None);
    }

    #[test]
    fn test_platform_detect() {
        let platform = Platform::detect();
        #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
        assert!(platform.is_some());
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        assert!(platform.is_none());
    }

    #[test]
    fn test_platform_serialization() {
        let json = serde_json::to_string(&Platform::MacOs).unwrap();
        assert_eq!(json, "\"macos\"");
        let parsed: Platform = serde_json::from_str("\"linux\"").unwrap();
        assert_eq!(parsed, Platform::Linux);
    }

    #[test]
    fn test_name_fallbacks() {
        let app = ApplicationRecord::new("browser", "Safe Browser").with_package_name("safe-browser");
        assert_eq!(app.name_or_package(), "Safe Browser");
        assert_eq!(app.package_or_name(), "safe-browser");

        let unnamed = ApplicationRecord::new("cli", "").with_package_name("safe-cli");
        assert_eq!(unnamed.name_or_package(), "safe-cli");

        let no_pkg = ApplicationRecord::new("browser", "Safe Browser");
        assert_eq!(no_pkg.package_or_name(), "Safe Browser");

        let empty_pkg = ApplicationRecord::new("browser", "Safe Browser").with_package_name("");
        assert_eq!(empty_pkg.package_or_name(), "Safe Browser");
    }

    #[test]
    fn test_has_update_semver() {
        let app = ApplicationRecord::new("a", "A")
            .with_current_version("v1.2.3")
            .with_latest_version("v1.10.0");
        assert!(app.has_update());

        let same = ApplicationRecord::new("a", "A")
            .with_current_version("v1.2.3")
            .with_latest_version("1.2.3");
        assert!(!same.has_update());

        let older_latest = ApplicationRecord::new("a", "A")
            .with_current_version("v2.0.0")
            .with_latest_version("v1.9.9");
        assert!(!older_latest.has_update());

        let prerelease = ApplicationRecord::new("a", "A")
            .with_current_version("v1.0.0-beta.1")
            .with_latest_version("v1.0.0-beta.2");
        assert!(prerelease.has_update());
    }

    #[test]
    fn test_has_update_requires_both_versions() {
        let app = ApplicationRecord::new("a", "A").with_latest_version("v1.0.0");
        assert!(!app.has_update());

        let app = ApplicationRecord::new("a", "A").with_current_version("v1.0.0");
        assert!(!app.has_update());
    }

    #[test]
    fn test_has_update_non_semver_falls_back_to_inequality() {
        let app = ApplicationRecord::new("a", "A")
            .with_current_version("v2020.01")
            .with_latest_version("v2020.02");
        assert!(app.has_update());
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let app: ApplicationRecord =
            serde_json::from_str(r#"{ "id": "x", "name": "X" }"#).unwrap();
        assert_eq!(app.kind, AppKind::Userland);
        assert_eq!(app.phase, Phase::NotInstalled);
        assert!(app.current_version.is_none());
    }
}
