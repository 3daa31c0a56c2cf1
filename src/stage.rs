//! Provisioning stage machine.
//!
//! The tracker is the single owner of "where the run is". It only accepts a
//! transition to the immediately following stage, so steps cannot run out
//! of their declared order.
//!
//! ```text
//! NotStarted -> Preflight -> Dependencies -> ServiceAccount -> Deployment
//!            -> ServiceUnit -> Cleanup -> Finish -> Completed
//!
//! (any non-terminal stage can transition to Failed)
//! ```

use std::fmt;
use thiserror::Error;

use crate::error::ProvisionError;

/// Provisioning stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ProvisionStage {
    NotStarted = 0,
    /// Privilege, platform and artifact checks plus the proceed gate
    Preflight = 1,
    Dependencies = 2,
    ServiceAccount = 3,
    Deployment = 4,
    ServiceUnit = 5,
    Cleanup = 6,
    Finish = 7,
    Completed = 8,
    Failed = 255,
}

impl ProvisionStage {
    #[inline]
    pub const fn order(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Next stage in sequence, or None at a terminal state
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::Preflight),
            Self::Preflight => Some(Self::Dependencies),
            Self::Dependencies => Some(Self::ServiceAccount),
            Self::ServiceAccount => Some(Self::Deployment),
            Self::Deployment => Some(Self::ServiceUnit),
            Self::ServiceUnit => Some(Self::Cleanup),
            Self::Cleanup => Some(Self::Finish),
            Self::Finish => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::Preflight => "Pre-flight checks",
            Self::Dependencies => "Installing system dependencies",
            Self::ServiceAccount => "Provisioning service account",
            Self::Deployment => "Deploying application",
            Self::ServiceUnit => "Generating service unit",
            Self::Cleanup => "Cleaning up",
            Self::Finish => "Finishing",
            Self::Completed => "Provisioning complete",
            Self::Failed => "Provisioning failed",
        }
    }
}

impl fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during stage transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageTransitionError {
    #[error("Cannot skip from {from} to {to}")]
    SkippedStage {
        from: ProvisionStage,
        to: ProvisionStage,
    },

    #[error("Cannot go backwards from {from} to {to}")]
    BackwardTransition {
        from: ProvisionStage,
        to: ProvisionStage,
    },

    #[error("Cannot leave terminal stage {from}")]
    FromTerminalState { from: ProvisionStage },
}

impl From<StageTransitionError> for ProvisionError {
    fn from(err: StageTransitionError) -> Self {
        ProvisionError::stage(err.to_string())
    }
}

/// Owns the current stage and validates every transition.
#[derive(Debug, Clone)]
pub struct StageTracker {
    current: ProvisionStage,
    failed_at: Option<ProvisionStage>,
    history: Vec<ProvisionStage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            current: ProvisionStage::NotStarted,
            failed_at: None,
            history: vec![ProvisionStage::NotStarted],
        }
    }

    #[inline]
    pub fn current(&self) -> ProvisionStage {
        self.current
    }

    #[inline]
    pub fn failed_at(&self) -> Option<ProvisionStage> {
        self.failed_at
    }

    /// Every stage entered so far, in order
    pub fn history(&self) -> &[ProvisionStage] {
        &self.history
    }

    /// Move to `target`, which must be the stage right after the current one.
    pub fn transition_to(&mut self, target: ProvisionStage) -> Result<(), StageTransitionError> {
        let from = self.current;
        if from.is_terminal() {
            return Err(StageTransitionError::FromTerminalState { from });
        }
        if target.order() <= from.order() {
            return Err(StageTransitionError::BackwardTransition { from, to: target });
        }
        if from.next() != Some(target) {
            return Err(StageTransitionError::SkippedStage { from, to: target });
        }

        tracing::debug!("Stage transition: {} -> {}", from, target);
        self.current = target;
        self.history.push(target);
        Ok(())
    }

    /// Mark the run failed at the current stage. No-op once terminal.
    pub fn fail(&mut self) {
        if self.current.is_terminal() {
            return;
        }
        tracing::debug!("Stage {} failed", self.current);
        self.failed_at = Some(self.current);
        self.current = ProvisionStage::Failed;
        self.history.push(ProvisionStage::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_forward_walk() {
        let mut tracker = StageTracker::new();
        let mut stage = ProvisionStage::NotStarted;
        while let Some(next) = stage.next() {
            tracker.transition_to(next).unwrap();
            stage = next;
        }
        assert_eq!(tracker.current(), ProvisionStage::Completed);
        assert_eq!(tracker.history().len(), 9);
    }

    #[test]
    fn test_cannot_skip() {
        let mut tracker = StageTracker::new();
        tracker.transition_to(ProvisionStage::Preflight).unwrap();
        let err = tracker.transition_to(ProvisionStage::Deployment).unwrap_err();
        assert!(matches!(err, StageTransitionError::SkippedStage { .. }));
    }

    #[test]
    fn test_cannot_go_backwards() {
        let mut tracker = StageTracker::new();
        tracker.transition_to(ProvisionStage::Preflight).unwrap();
        tracker.transition_to(ProvisionStage::Dependencies).unwrap();
        let err = tracker.transition_to(ProvisionStage::Preflight).unwrap_err();
        assert!(matches!(err, StageTransitionError::BackwardTransition { .. }));
    }

    #[test]
    fn test_fail_records_stage() {
        let mut tracker = StageTracker::new();
        tracker.transition_to(ProvisionStage::Preflight).unwrap();
        tracker.fail();
        assert_eq!(tracker.current(), ProvisionStage::Failed);
        assert_eq!(tracker.failed_at(), Some(ProvisionStage::Preflight));

        let err = tracker.transition_to(ProvisionStage::Dependencies).unwrap_err();
        assert!(matches!(err, StageTransitionError::FromTerminalState { .. }));
    }

    #[test]
    fn test_error_converts_to_provision_error() {
        let err: ProvisionError = StageTransitionError::FromTerminalState {
            from: ProvisionStage::Completed,
        }
        .into();
        assert!(matches!(err, ProvisionError::Stage(_)));
    }
}
