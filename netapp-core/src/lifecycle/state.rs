//! Installation state machine.
//!
//! Every application is in exactly one [`Phase`]. User intent arrives as a
//! [`Trigger`], executor feedback as a [`LifecycleEvent`]; both are applied
//! to an [`ApplicationRecord`] and yield a [`Transition`] describing what
//! happened. Anything not listed in the transition table is ignored without
//! touching the record.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::types::ApplicationRecord;
use super::version::normalize_version;

/// Error recorded when the user cancels an active download.
pub const CANCELLED_MESSAGE: &str = "Download cancelled";

// ============================================================================
// Phase
// ============================================================================

/// The single active lifecycle state of an application.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    NotInstalled,
    /// Downloading or installing. Progress is a fraction in `0.0..=1.0`.
    Downloading { progress: f32 },
    Paused { progress: f32 },
    Installed,
    Updating { progress: f32 },
    Uninstalling,
    Failed { error: String },
}

/// Data-free discriminant of [`Phase`], used in logs and transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    NotInstalled,
    Downloading,
    Paused,
    Installed,
    Updating,
    Uninstalling,
    Failed,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::NotInstalled => PhaseKind::NotInstalled,
            Self::Downloading { .. } => PhaseKind::Downloading,
            Self::Paused { .. } => PhaseKind::Paused,
            Self::Installed => PhaseKind::Installed,
            Self::Updating { .. } => PhaseKind::Updating,
            Self::Uninstalling => PhaseKind::Uninstalling,
            Self::Failed { .. } => PhaseKind::Failed,
        }
    }

    /// Progress of the active transfer, `0.0` outside of one.
    pub fn progress(&self) -> f32 {
        match self {
            Self::Downloading { progress }
            | Self::Paused { progress }
            | Self::Updating { progress } => *progress,
            _ => 0.0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// True for phases that wait on the external executor.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Downloading { .. } | Self::Paused { .. } | Self::Updating { .. } | Self::Uninstalling
        )
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotInstalled => "not installed",
            Self::Downloading => "downloading",
            Self::Paused => "paused",
            Self::Installed => "installed",
            Self::Updating => "updating",
            Self::Uninstalling => "uninstalling",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Triggers, Events, Transitions
// ============================================================================

/// User-issued lifecycle intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Download,
    Pause,
    Resume,
    Cancel,
    Reset,
    Uninstall,
    Update,
}

impl Trigger {
    /// Triggers that start a transfer and are refused while offline.
    pub fn requires_network(&self) -> bool {
        matches!(self, Self::Download | Self::Resume | Self::Update)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Download => "download",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Cancel => "cancel",
            Self::Reset => "reset",
            Self::Uninstall => "uninstall",
            Self::Update => "update",
        };
        f.write_str(name)
    }
}

/// Feedback reported by the download/install executor.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// Transfer progress as a fraction in `0.0..=1.0`.
    Progress(f32),
    /// The active phase finished. `version` is the installed version when
    /// the executor knows it.
    Completed { version: Option<String> },
    Failed(String),
}

/// What applying a trigger or event did to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied { from: PhaseKind, to: PhaseKind },
    /// Not legal in the current phase. The record is unchanged.
    Ignored { phase: PhaseKind },
    /// A network trigger was refused because the device is offline.
    RefusedOffline,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

// ============================================================================
// Transition Table
// ============================================================================

impl ApplicationRecord {
    /// Applies a user trigger. Offline checks happen before this is called.
    pub fn apply_trigger(&mut self, trigger: Trigger) -> Transition {
        let next = match (&self.phase, trigger) {
            (Phase::NotInstalled, Trigger::Download) => Some(Phase::Downloading { progress: 0.0 }),
            (Phase::Downloading { progress }, Trigger::Pause) => Some(Phase::Paused {
                progress: *progress,
            }),
            (Phase::Paused { progress }, Trigger::Resume) => Some(Phase::Downloading {
                progress: *progress,
            }),
            (Phase::Downloading { .. } | Phase::Paused { .. }, Trigger::Cancel) => {
                Some(Phase::Failed {
                    error: CANCELLED_MESSAGE.to_string(),
                })
            }
            (Phase::Failed { .. }, Trigger::Reset) => Some(Phase::NotInstalled),
            (Phase::Installed, Trigger::Uninstall) if !self.is_bin() => Some(Phase::Uninstalling),
            (Phase::Installed, Trigger::Update) if !self.is_bin() && self.has_update() => {
                Some(Phase::Updating { progress: 0.0 })
            }
            _ => None,
        };

        self.enter(next, format_args!("trigger {}", trigger))
    }

    /// Applies executor feedback for this application.
    pub fn apply_event(&mut self, event: LifecycleEvent) -> Transition {
        let next = match (&self.phase, event) {
            (Phase::Downloading { .. }, LifecycleEvent::Progress(p)) if !p.is_nan() => {
                Some(Phase::Downloading {
                    progress: p.clamp(0.0, 1.0),
                })
            }
            (Phase::Updating { .. }, LifecycleEvent::Progress(p)) if !p.is_nan() => {
                Some(Phase::Updating {
                    progress: p.clamp(0.0, 1.0),
                })
            }
            (
                Phase::Downloading { .. } | Phase::Paused { .. } | Phase::Updating { .. },
                LifecycleEvent::Completed { version },
            ) => {
                self.current_version = version
                    .as_deref()
                    .and_then(normalize_version)
                    .or_else(|| self.latest_version.as_deref().and_then(normalize_version));
                Some(Phase::Installed)
            }
            (Phase::Uninstalling, LifecycleEvent::Completed { .. }) => {
                self.current_version = None;
                Some(Phase::NotInstalled)
            }
            (
                Phase::Downloading { .. }
                | Phase::Paused { .. }
                | Phase::Updating { .. }
                | Phase::Uninstalling,
                LifecycleEvent::Failed(error),
            ) => Some(Phase::Failed { error }),
            _ => None,
        };

        self.enter(next, format_args!("executor event"))
    }

    /// Aligns a steady phase with what the prober found on disk.
    ///
    /// Active and failed phases are left alone so detection never races a
    /// running executor.
    pub fn sync_installed(&mut self, installed: bool) -> Transition {
        let next = match (&self.phase, installed) {
            (Phase::NotInstalled, true) => Some(Phase::Installed),
            (Phase::Installed, false) => {
                self.current_version = None;
                Some(Phase::NotInstalled)
            }
            _ => None,
        };

        self.enter(next, format_args!("local install detection"))
    }

    fn enter(&mut self, next: Option<Phase>, cause: fmt::Arguments<'_>) -> Transition {
        let from = self.phase.kind();
        match next {
            Some(phase) => {
                let to = phase.kind();
                if from != to {
                    debug!(app = %self.id, %from, %to, "Phase change on {}", cause);
                }
                self.phase = phase;
                Transition::Applied { from, to }
            }
            None => {
                debug!(app = %self.id, phase = %from, "Ignoring {}", cause);
                Transition::Ignored { phase: from }
            }
        }
    }
}

// ============================================================================
// Flag View
// ============================================================================

/// Boolean projection of a record's phase for front ends that render flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleFlags {
    pub is_downloading_and_installing: bool,
    pub is_paused: bool,
    pub is_installed: bool,
    pub is_uninstalling: bool,
    pub is_updating: bool,
    pub install_failed: bool,
    pub has_update: bool,
    pub error: Option<String>,
    pub progress: f32,
}

impl ApplicationRecord {
    pub fn is_downloading_and_installing(&self) -> bool {
        matches!(self.phase, Phase::Downloading { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, Phase::Paused { .. })
    }

    /// Installed on disk, including while being updated or removed.
    pub fn is_installed(&self) -> bool {
        matches!(
            self.phase,
            Phase::Installed | Phase::Updating { .. } | Phase::Uninstalling
        )
    }

    pub fn is_uninstalling(&self) -> bool {
        matches!(self.phase, Phase::Uninstalling)
    }

    pub fn is_updating(&self) -> bool {
        matches!(self.phase, Phase::Updating { .. })
    }

    pub fn install_failed(&self) -> bool {
        matches!(self.phase, Phase::Failed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        self.phase.error()
    }

    pub fn progress(&self) -> f32 {
        self.phase.progress()
    }

    pub fn flags(&self) -> LifecycleFlags {
        LifecycleFlags {
            is_downloading_and_installing: self.is_downloading_and_installing(),
            is_paused: self.is_paused(),
            is_installed: self.is_installed(),
            is_uninstalling: self.is_uninstalling(),
            is_updating: self.is_updating(),
            install_failed: self.install_failed(),
            has_update: self.has_update(),
            error: self.error().map(str::to_string),
            progress: self.progress(),
        }
    }
}

// ============================================================================
// Primary Action
// ============================================================================

/// The main affordance a front end should offer for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Install,
    Open,
    Pause,
    Resume,
    CancelInstall,
    Uninstalling,
    Update,
    Updating,
    /// An installed binary application: shown, never clickable.
    InstalledBinary,
}

impl PrimaryAction {
    /// The trigger dispatched when the action is clicked. `Open` launches the
    /// application and has no lifecycle trigger.
    pub fn trigger(&self) -> Option<Trigger> {
        match self {
            Self::Install => Some(Trigger::Download),
            Self::Pause => Some(Trigger::Pause),
            Self::Resume => Some(Trigger::Resume),
            Self::CancelInstall => Some(Trigger::Reset),
            Self::Update => Some(Trigger::Update),
            Self::Open | Self::Uninstalling | Self::Updating | Self::InstalledBinary => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Install => "Install",
            Self::Open => "Open",
            Self::Pause => "Pause",
            Self::Resume => "Resume",
            Self::CancelInstall => "Cancel Install",
            Self::Uninstalling => "Uninstalling",
            Self::Update => "Update",
            Self::Updating => "Updating",
            Self::InstalledBinary => "Installed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionState {
    pub action: PrimaryAction,
    pub enabled: bool,
    /// Status line, only populated when the caller asked for it.
    pub status_message: Option<String>,
}

impl ApplicationRecord {
    /// Chooses the primary action.
    ///
    /// Precedence: error, downloading, paused, uninstalling, installed with
    /// an update, installed.
    pub fn primary_action(&self, show_status: bool) -> ActionState {
        let action = match &self.phase {
            Phase::Failed { .. } => PrimaryAction::CancelInstall,
            Phase::Downloading { .. } => PrimaryAction::Pause,
            Phase::Paused { .. } => PrimaryAction::Resume,
            Phase::Uninstalling => PrimaryAction::Uninstalling,
            Phase::Updating { .. } => PrimaryAction::Updating,
            Phase::Installed if self.is_bin() => PrimaryAction::InstalledBinary,
            Phase::Installed if self.has_update() => PrimaryAction::Update,
            Phase::Installed => PrimaryAction::Open,
            Phase::NotInstalled => PrimaryAction::Install,
        };

        let enabled = !matches!(
            action,
            PrimaryAction::Uninstalling | PrimaryAction::Updating | PrimaryAction::InstalledBinary
        );

        let status_message = if show_status {
            self.status_text()
        } else {
            None
        };

        ActionState {
            action,
            enabled,
            status_message,
        }
    }

    /// Short human status for active and failed phases.
    pub fn status_text(&self) -> Option<String> {
        let percent = |p: f32| (p * 100.0).round() as u32;
        match &self.phase {
            Phase::Failed { error } => Some(error.clone()),
            Phase::Downloading { progress } => Some(format!("Installing {}%", percent(*progress))),
            Phase::Paused { progress } => Some(format!("Paused at {}%", percent(*progress))),
            Phase::Uninstalling => Some("Uninstalling".to_string()),
            Phase::Updating { progress } => Some(format!("Updating {}%", percent(*progress))),
            Phase::Installed | Phase::NotInstalled => None,
        }
    }
}
