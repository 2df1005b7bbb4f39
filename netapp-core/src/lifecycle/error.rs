//! Error types for lifecycle operations.
//!
//! Only conditions that must abort the calling operation live in
//! [`LifecycleError`]. Filesystem and search problems are reported as
//! [`ProbeError`] diagnostics attached to a [`Probed`](super::Probed) value.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Unsupported platform for desktop applications: {0}")]
    UnsupportedPlatform(String),
    #[error("Unknown application: {0}")]
    UnknownApplication(String),
}

impl LifecycleError {
    /// Unsupported-platform error for the OS this process runs on.
    pub fn unsupported_here() -> Self {
        Self::UnsupportedPlatform(std::env::consts::OS.to_string())
    }
}

/// A filesystem or search failure observed while probing.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Search for '{pattern}' failed: {message}")]
    Search { pattern: String, message: String },
}

impl ProbeError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_message() {
        let err = LifecycleError::UnsupportedPlatform("plan9".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported platform for desktop applications: plan9"
        );
    }

    #[test]
    fn test_probe_error_keeps_source() {
        let err = ProbeError::io(
            "/opt/apps/thing",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/opt/apps/thing"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
