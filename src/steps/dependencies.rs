//! Step 1: system package installation.

use crate::commands::packages::{PackageArgs, PackageOp};
use crate::console;
use crate::error::Result;
use crate::prompt::Confirmation;
use crate::stage::ProvisionStage;
use crate::steps::{Context, Step};
use crate::types::StepOutcome;

/// Refreshes package lists, optionally upgrades the host, then installs the
/// platform's dependency list. Re-installing present packages is a no-op for
/// the package manager, so the step converges on re-runs.
pub struct DependencyStep;

impl Step for DependencyStep {
    fn name(&self) -> &'static str {
        "System dependencies"
    }

    fn stage(&self) -> ProvisionStage {
        ProvisionStage::Dependencies
    }

    fn confirmation(&self, ctx: &Context<'_>) -> Option<Confirmation> {
        ctx.platform
            .is_supported()
            .then(|| Confirmation::yes("Install system dependencies?"))
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<StepOutcome> {
        let Some(caps) = ctx.platform.capabilities() else {
            console::warn(&format!(
                "No package manager known for {}; install these manually: {}",
                ctx.platform,
                crate::platform::DEPENDENCIES.join(" ")
            ));
            return Ok(StepOutcome::Skipped("unsupported platform".to_string()));
        };

        ctx.executor.run(&PackageArgs::new(caps, PackageOp::Update))?;

        let upgrade = Confirmation::yes("Upgrade installed system packages first? This can take a while.");
        if ctx.confirm(&upgrade)? {
            ctx.executor.run(&PackageArgs::new(caps, PackageOp::Upgrade))?;
        } else {
            console::warn("Skipping system upgrade");
        }

        let packages = caps.packages.iter().map(|p| p.to_string()).collect();
        ctx.executor.run(&PackageArgs::new(caps, PackageOp::Install(packages)))?;

        Ok(StepOutcome::Applied)
    }
}
