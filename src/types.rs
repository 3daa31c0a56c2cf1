//! Core value types shared across the provisioner.
//!
//! Plain enums instead of booleans and strings, so every branch on mode,
//! outcome or severity is an exhaustive match.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Whether mutating actions are applied or only described.
///
/// Parsed once from the command line and threaded through every step by
/// value; nothing reads it from global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum RunMode {
    #[default]
    Live,
    DryRun,
}

impl RunMode {
    /// Build the mode from the `--dry-run` flag
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Live }
    }

    /// Returns true if mutating actions must be replaced by descriptions
    pub fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// Terminal severity tag printed in front of every user-facing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Severity {
    #[strum(serialize = "INFO")]
    Info,
    #[strum(serialize = "OK")]
    Success,
    #[strum(serialize = "WARN")]
    Warning,
    #[strum(serialize = "ERROR")]
    Error,
    #[strum(serialize = "DRY RUN")]
    DryRun,
}

/// What a step did when it ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Changes were made (or, in dry-run, described)
    Applied,
    /// Target state was already present; nothing was done
    AlreadySatisfied,
    /// Step did not apply to this host
    Skipped(String),
    /// Operator answered no to the step's confirmation
    Declined,
}

impl StepOutcome {
    /// Short label for summaries
    pub fn label(&self) -> &str {
        match self {
            Self::Applied => "applied",
            Self::AlreadySatisfied => "already satisfied",
            Self::Skipped(reason) => reason,
            Self::Declined => "declined",
        }
    }
}

/// Final status of a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    /// Map a raw exit code onto a status
    pub fn from_code(code: i32) -> Self {
        if code == 0 { Self::Success } else { Self::Failure }
    }

    /// Numeric process exit code
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_mode_from_flag() {
        assert_eq!(RunMode::from_dry_run(true), RunMode::DryRun);
        assert_eq!(RunMode::from_dry_run(false), RunMode::Live);
        assert!(RunMode::DryRun.is_dry_run());
        assert!(!RunMode::Live.is_dry_run());
    }

    #[test]
    fn test_run_mode_display() {
        assert_eq!(RunMode::DryRun.to_string(), "dry-run");
        assert_eq!("live".parse::<RunMode>().unwrap(), RunMode::Live);
    }

    #[test]
    fn test_severity_tags() {
        assert_eq!(Severity::Warning.to_string(), "WARN");
        assert_eq!(Severity::DryRun.to_string(), "DRY RUN");
    }

    #[test]
    fn test_exit_status_codes() {
        assert_eq!(ExitStatus::from_code(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from_code(1), ExitStatus::Failure);
        assert_eq!(ExitStatus::Failure.code(), 1);
        assert!(ExitStatus::Success.is_success());
    }
}
