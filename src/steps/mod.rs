//! Provisioning steps.
//!
//! A step inspects the host through the [`Context`], decides which actions
//! are needed, and hands them to the executor. A step whose target state is
//! already present issues no actions and reports `AlreadySatisfied`.

pub mod account;
pub mod cleanup;
pub mod dependencies;
pub mod deploy;
pub mod finish;
pub mod unit;

use crate::config::ProvisionConfig;
use crate::error::Result;
use crate::executor::Executor;
use crate::platform::Platform;
use crate::prompt::{Confirmation, Prompter};
use crate::stage::ProvisionStage;
use crate::system::System;
use crate::types::{RunMode, StepOutcome};

pub use account::ServiceAccountStep;
pub use cleanup::CleanupStep;
pub use dependencies::DependencyStep;
pub use deploy::{verify_artifacts, DeploymentStep};
pub use finish::FinishStep;
pub use unit::ServiceUnitStep;

/// Everything a step may touch while it runs.
pub struct Context<'a> {
    pub config: &'a ProvisionConfig,
    pub platform: Platform,
    pub executor: Executor<'a>,
    pub prompter: &'a mut dyn Prompter,
}

impl<'a> Context<'a> {
    pub fn mode(&self) -> RunMode {
        self.executor.mode()
    }

    /// Read-only host queries
    pub fn system(&self) -> &dyn System {
        self.executor.system()
    }

    pub fn confirm(&mut self, confirmation: &Confirmation) -> Result<bool> {
        self.prompter.ask(confirmation)
    }
}

/// One ordered, idempotent unit of provisioning work.
pub trait Step {
    /// Human-readable name for progress lines
    fn name(&self) -> &'static str;

    /// Stage this step runs in; steps must be declared in stage order
    fn stage(&self) -> ProvisionStage;

    /// Question asked before the step runs; declining skips the step
    fn confirmation(&self, _ctx: &Context<'_>) -> Option<Confirmation> {
        None
    }

    /// Hard preconditions. An error here aborts the whole run.
    fn check(&self, _ctx: &Context<'_>) -> Result<()> {
        Ok(())
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<StepOutcome>;
}

/// The full provisioning sequence in execution order.
pub fn standard_sequence() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(DependencyStep),
        Box::new(ServiceAccountStep),
        Box::new(DeploymentStep),
        Box::new(ServiceUnitStep),
        Box::new(CleanupStep),
        Box::new(FinishStep),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_sequence_is_in_stage_order() {
        let stages: Vec<ProvisionStage> = standard_sequence().iter().map(|s| s.stage()).collect();
        let mut expected = Vec::new();
        let mut stage = ProvisionStage::Preflight;
        while let Some(next) = stage.next() {
            if next == ProvisionStage::Completed {
                break;
            }
            expected.push(next);
            stage = next;
        }
        assert_eq!(stages, expected);
    }
}
