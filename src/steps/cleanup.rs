//! Step 5: package cache cleanup.

use crate::commands::packages::{PackageArgs, PackageOp};
use crate::error::Result;
use crate::prompt::Confirmation;
use crate::stage::ProvisionStage;
use crate::steps::{Context, Step};
use crate::types::StepOutcome;

pub struct CleanupStep;

impl Step for CleanupStep {
    fn name(&self) -> &'static str {
        "Cleanup"
    }

    fn stage(&self) -> ProvisionStage {
        ProvisionStage::Cleanup
    }

    fn confirmation(&self, ctx: &Context<'_>) -> Option<Confirmation> {
        ctx.platform
            .is_supported()
            .then(|| Confirmation::yes("Clear package manager caches?"))
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<StepOutcome> {
        let Some(caps) = ctx.platform.capabilities() else {
            return Ok(StepOutcome::Skipped("unsupported platform".to_string()));
        };

        ctx.executor.run(&PackageArgs::new(caps, PackageOp::Clean))?;
        ctx.executor.run(&PackageArgs::new(caps, PackageOp::Autoremove))?;

        Ok(StepOutcome::Applied)
    }
}
