//! Step 6: reboot or hand over to the operator.

use crate::command_traits::CommandArgs;
use crate::commands::service::{SystemctlAction, SystemctlArgs};
use crate::console;
use crate::error::Result;
use crate::prompt::Confirmation;
use crate::stage::ProvisionStage;
use crate::steps::{Context, Step};
use crate::types::StepOutcome;

pub struct FinishStep;

impl Step for FinishStep {
    fn name(&self) -> &'static str {
        "Finish"
    }

    fn stage(&self) -> ProvisionStage {
        ProvisionStage::Finish
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<StepOutcome> {
        let unit_name = ctx.config.unit_file_name();

        let reboot = Confirmation::yes(format!(
            "Reboot now to start {} in kiosk mode?",
            ctx.config.app_name
        ));
        if ctx.confirm(&reboot)? {
            console::info("Rebooting");
            ctx.executor.run(&SystemctlArgs::global(SystemctlAction::Reboot))?;
            return Ok(StepOutcome::Applied);
        }

        let start = SystemctlArgs::unit(SystemctlAction::Start, unit_name.as_str()).command_line();
        console::info(&format!("Start the kiosk manually with: sudo {}", start));
        console::info(&format!("Follow its logs with: journalctl -u {} -f", unit_name));
        Ok(StepOutcome::Declined)
    }
}
