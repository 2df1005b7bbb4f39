//! Local install probing.
//!
//! Answers whether an application is present in the install root. Absence is
//! the common case and is never an error; filesystem problems are logged and
//! reported as a diagnostic on the [`Probed`] result.

use glob::Pattern;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::error::{LifecycleError, ProbeError};
use super::probed::Probed;
use super::resolver::{ExecutableName, PlatformResolver};
use super::types::{parse_semver, ApplicationRecord, Platform, VersionSelector};
use super::version::extract_semver;

#[derive(Debug, Clone)]
pub struct InstallProber {
    resolver: PlatformResolver,
}

impl InstallProber {
    pub fn new(resolver: PlatformResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PlatformResolver {
        &self.resolver
    }

    /// Glob matched against file names in the install root:
    /// `<package>-v[0-9]*<channel>*`.
    pub fn linux_search_pattern(&self, app: &ApplicationRecord) -> String {
        let channel = self.resolver.config().release_channel.as_str();
        let mut pattern = format!("{}-v[0-9]*", Pattern::escape(app.package_or_name()));
        if !channel.is_empty() {
            pattern.push_str(&Pattern::escape(channel));
            pattern.push('*');
        }
        pattern
    }

    /// Finds an installed AppImage for `app` when its version is unknown.
    ///
    /// Returns the file name (not the full path). When several versions are
    /// installed side by side the highest version wins.
    pub async fn locate_installed_linux_package(
        &self,
        app: &ApplicationRecord,
    ) -> Probed<Option<String>> {
        let root = self.resolver.install_root();
        let pattern_str = self.linux_search_pattern(app);
        debug!(app = %app.id, root = %root.display(), pattern = %pattern_str, "Attempting to locate an installed linux version");

        let pattern = match Pattern::new(&pattern_str) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!(app = %app.id, pattern = %pattern_str, error = %e, "Invalid search pattern");
                return Probed::degraded(
                    None,
                    ProbeError::Search {
                        pattern: pattern_str,
                        message: e.to_string(),
                    },
                );
            }
        };

        let mut entries = match tokio::fs::read_dir(root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(root = %root.display(), "Install root does not exist");
                return Probed::ok(None);
            }
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Error checking for local linux AppImage");
                return Probed::degraded(None, ProbeError::io(root, e));
            }
        };

        let mut matches = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let file_name = entry.file_name();
                    if let Some(name) = file_name.to_str() {
                        if pattern.matches(name) {
                            matches.push(name.to_string());
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Error reading install root entry");
                    return Probed::degraded(pick_newest(matches), ProbeError::io(root, e));
                }
            }
        }

        if matches.len() > 1 {
            info!(app = %app.id, candidates = ?matches, "Several installed versions found, using the newest");
        }

        let found = pick_newest(matches);
        if let Some(name) = &found {
            info!(app = %app.id, file = %name, "Installed linux version found");
        }
        Probed::ok(found)
    }

    /// Absolute path of the installed bundle, searching on Linux when the
    /// current version is unknown.
    pub async fn locate_installed(
        &self,
        app: &ApplicationRecord,
    ) -> Result<Probed<Option<PathBuf>>, LifecycleError> {
        let root = self.resolver.install_root();
        match self
            .resolver
            .resolve_executable_name(app, VersionSelector::Current)?
        {
            ExecutableName::Resolved(rel) => Ok(Probed::ok(Some(root.join(rel)))),
            ExecutableName::VersionUnknown => Ok(self
                .locate_installed_linux_package(app)
                .await
                .map(|name| name.map(|name| root.join(name)))),
        }
    }

    /// Checks whether `app` exists in the install root.
    ///
    /// On Linux a missing AppImage for the recorded version falls back to the
    /// search. I/O errors other than "not found" yield `false` with a
    /// diagnostic.
    pub async fn is_installed_locally(
        &self,
        app: &ApplicationRecord,
    ) -> Result<Probed<bool>, LifecycleError> {
        let (path, search_diagnostic) = self.locate_installed(app).await?.into_parts();
        let Some(path) = path else {
            debug!(app = %app.id, "No installed package located");
            return Ok(Probed::from_parts(false, search_diagnostic));
        };

        let can_search = app.current_version.is_some() && self.resolver.platform()? == Platform::Linux;
        match tokio::fs::try_exists(&path).await {
            Ok(false) if can_search => {
                // The recorded version may be stale after an out-of-band upgrade.
                debug!(app = %app.id, path = %path.display(), "Recorded AppImage missing, searching for another version");
                Ok(self
                    .locate_installed_linux_package(app)
                    .await
                    .map(|name| name.is_some()))
            }
            Ok(exists) => {
                info!(app = %app.id, path = %path.display(), exists, "Checking if path exists");
                Ok(Probed::ok(exists))
            }
            Err(e) => {
                warn!(app = %app.id, path = %path.display(), error = %e, "Could not check install path, treating as not installed");
                Ok(Probed::degraded(false, ProbeError::io(path, e)))
            }
        }
    }
}

/// Highest extracted version wins; file name breaks ties.
fn pick_newest(mut candidates: Vec<String>) -> Option<String> {
    candidates.sort_by(|a, b| {
        let va = extract_semver(a).and_then(parse_semver);
        let vb = extract_semver(b).and_then(parse_semver);
        va.cmp(&vb).then_with(|| a.cmp(b))
    });
    candidates.pop()
}
