//! Configuration module for the launcher.
//!
//! Manages lifecycle settings stored as JSON and read from the environment.

mod settings;

pub use settings::{
    LifecycleConfig, ReleaseChannel, CONFIG_PATH_ENV, INSTALL_DIR_ENV, RELEASE_CHANNEL_ENV,
};
