//! Lifecycle configuration.
//!
//! Platform, release channel and install root are resolved once and passed
//! to the resolver and prober explicitly. Settings can be persisted as JSON
//! and overlaid with environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::lifecycle::paths::default_install_root;
use crate::lifecycle::types::Platform;

/// Environment variable naming the release channel (`beta`, `alpha`, ...).
pub const RELEASE_CHANNEL_ENV: &str = "RELEASE_CHANNEL";

/// Environment variable overriding the install root.
pub const INSTALL_DIR_ENV: &str = "NETAPP_INSTALL_DIR";

/// Environment variable pointing at a JSON settings file.
pub const CONFIG_PATH_ENV: &str = "NETAPP_CONFIG";

// =============================================================================
// Release Channel
// =============================================================================

/// A named distribution track. Empty means the stable channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseChannel(String);

impl ReleaseChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn stable() -> Self {
        Self::default()
    }

    pub fn is_stable(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw channel name as configured.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Channel name with its first letter upper-cased (`beta` -> `Beta`).
    pub fn capitalized(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Suffix appended to display and bundle names: `" Beta"`, or empty.
    pub fn modifier(&self) -> String {
        if self.is_stable() {
            String::new()
        } else {
            format!(" {}", self.capitalized())
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_stable() {
            f.write_str("stable")
        } else {
            f.write_str(&self.0)
        }
    }
}

// =============================================================================
// Lifecycle Configuration
// =============================================================================

/// Process-wide lifecycle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Target platform. `None` when running on an unsupported OS.
    #[serde(default = "Platform::detect")]
    pub platform: Option<Platform>,

    /// Release channel participating in every generated name.
    #[serde(default)]
    pub release_channel: ReleaseChannel,

    /// Directory applications are installed into.
    #[serde(default)]
    pub install_root: PathBuf,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        let platform = Platform::detect();
        Self {
            platform,
            release_channel: ReleaseChannel::stable(),
            install_root: default_install_root(platform),
        }
    }
}

impl LifecycleConfig {
    /// Creates a config for an explicit platform and install root.
    pub fn new(
        platform: Option<Platform>,
        release_channel: ReleaseChannel,
        install_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            platform,
            release_channel,
            install_root: install_root.into(),
        }
    }

    /// Defaults overlaid with `RELEASE_CHANNEL` and `NETAPP_INSTALL_DIR`.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies environment overrides using the given lookup.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(channel) = lookup(RELEASE_CHANNEL_ENV) {
            self.release_channel = ReleaseChannel::new(channel);
        }
        if let Some(dir) = lookup(INSTALL_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            self.install_root = PathBuf::from(dir.trim());
        }
        self.validate();
        self
    }

    /// Loads settings from a JSON file.
    ///
    /// If the file doesn't exist or can't be parsed, returns defaults.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Self::default();

        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<LifecycleConfig>(&json) {
                Ok(loaded) => config = loaded,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Failed to parse settings, using defaults");
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to read settings, using defaults");
            }
        }

        config.validate();
        config
    }

    /// Saves settings to a JSON file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// Normalizes the channel and fills an empty install root.
    pub fn validate(&mut self) {
        self.release_channel = ReleaseChannel::new(self.release_channel.as_str());

        if self.install_root.as_os_str().is_empty() {
            self.install_root = default_install_root(self.platform);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
