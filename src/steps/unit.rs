//! Step 4: service unit generation and activation.

use crate::commands::service::{SystemctlAction, SystemctlArgs};
use crate::console;
use crate::error::Result;
use crate::executor::Action;
use crate::prompt::Confirmation;
use crate::stage::ProvisionStage;
use crate::steps::{Context, Step};
use crate::types::StepOutcome;
use crate::unit::ServiceUnitSpec;

/// Writes the kiosk unit file when its content changed, reloads the service
/// manager, and (if confirmed) enables the unit at boot.
pub struct ServiceUnitStep;

impl Step for ServiceUnitStep {
    fn name(&self) -> &'static str {
        "Service unit"
    }

    fn stage(&self) -> ProvisionStage {
        ProvisionStage::ServiceUnit
    }

    fn confirmation(&self, ctx: &Context<'_>) -> Option<Confirmation> {
        Some(Confirmation::yes(format!(
            "Install the {} service unit?",
            ctx.config.unit_file_name()
        )))
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<StepOutcome> {
        let config = ctx.config;
        let unit_name = config.unit_file_name();
        let path = config.unit_path();
        let rendered = ServiceUnitSpec::from_config(config).render();
        let mut changed = false;

        if ctx.system().read_file(&path)?.as_deref() == Some(rendered.as_str()) {
            console::info(&format!("{} is up to date", path.display()));
        } else {
            ctx.executor.execute(Action::WriteFile {
                path,
                contents: rendered,
            })?;
            ctx.executor
                .run(&SystemctlArgs::global(SystemctlAction::DaemonReload))?;
            changed = true;
        }

        if ctx.system().unit_enabled(&unit_name)? {
            console::info(&format!("{} is already enabled", unit_name));
        } else {
            let enable = Confirmation::yes(format!("Enable {} to start automatically at boot?", unit_name));
            if ctx.confirm(&enable)? {
                ctx.executor
                    .run(&SystemctlArgs::unit(SystemctlAction::Enable, unit_name.as_str()))?;
                changed = true;
            } else {
                console::warn(&format!("{} will not start at boot", unit_name));
            }
        }

        Ok(if changed {
            StepOutcome::Applied
        } else {
            StepOutcome::AlreadySatisfied
        })
    }
}
