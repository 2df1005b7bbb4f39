//! Install-root path resolution.
//!
//! Applications are installed into one directory per platform:
//!
//! - macOS: `/Applications/`
//! - Windows: `C:\Users\<User>\AppData\Local\Programs\`
//! - Linux: `~/Applications/`
//!
//! The root can be overridden through configuration; these are only the
//! defaults used when nothing else is set.

use std::path::PathBuf;

use super::types::Platform;

/// Subdirectory used under the temp folder when no home directory exists.
const FALLBACK_DIR: &str = "netapp";

/// Returns the default install root for a platform.
pub fn default_install_root(platform: Option<Platform>) -> PathBuf {
    match platform {
        Some(Platform::MacOs) => PathBuf::from("/Applications"),
        Some(Platform::Windows) => dirs::data_local_dir()
            .map(|dir| dir.join("Programs"))
            .unwrap_or_else(fallback_root),
        Some(Platform::Linux) => dirs::home_dir()
            .map(|home| home.join("Applications"))
            .unwrap_or_else(fallback_root),
        None => fallback_root(),
    }
}

fn fallback_root() -> PathBuf {
    std::env::temp_dir().join(FALLBACK_DIR)
}

/// Version marker file inside a macOS bundle, relative to the bundle root.
pub fn macos_version_file() -> PathBuf {
    PathBuf::from("Contents").join("Resources").join("version")
}

/// Name of the version marker file next to a Windows executable.
pub const WINDOWS_VERSION_FILE: &str = "version";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_root_is_applications() {
        assert_eq!(
            default_install_root(Some(Platform::MacOs)),
            PathBuf::from("/Applications")
        );
    }

    #[test]
    fn test_linux_root_ends_with_applications() {
        let root = default_install_root(Some(Platform::Linux));
        assert!(
            root.ends_with("Applications") || root.ends_with(FALLBACK_DIR),
            "Unexpected linux root: {}",
            root.display()
        );
    }

    #[test]
    fn test_unsupported_platform_uses_temp() {
        let root = default_install_root(None);
        assert!(root.starts_with(std::env::temp_dir()));
        assert!(root.ends_with(FALLBACK_DIR));
    }

    #[test]
    fn test_macos_version_file() {
        let path = macos_version_file();
        assert!(path.ends_with("Contents/Resources/version"));
    }
}
