//! Step 2: service account provisioning.

use std::path::PathBuf;

use crate::commands::user::{GroupMembershipArgs, UserAddArgs};
use crate::console;
use crate::error::Result;
use crate::prompt::Confirmation;
use crate::stage::ProvisionStage;
use crate::steps::{Context, Step};
use crate::types::StepOutcome;

/// Creates the unprivileged account the kiosk runs as and gives it access to
/// the display, input and audio devices.
///
/// Group membership is checked per group, so a re-run only touches what is
/// missing. Groups that do not exist on the host are reported and skipped.
pub struct ServiceAccountStep;

impl Step for ServiceAccountStep {
    fn name(&self) -> &'static str {
        "Service account"
    }

    fn stage(&self) -> ProvisionStage {
        ProvisionStage::ServiceAccount
    }

    fn confirmation(&self, ctx: &Context<'_>) -> Option<Confirmation> {
        Some(Confirmation::yes(format!(
            "Create or update the service account '{}'?",
            ctx.config.service_user
        )))
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<StepOutcome> {
        let config = ctx.config;
        let user = &config.service_user;
        let mut changed = false;

        if ctx.system().user_exists(user)? {
            console::info(&format!("User '{}' already exists", user));
        } else {
            ctx.executor.run(&UserAddArgs {
                username: user.clone(),
                home: PathBuf::from("/home").join(user),
                shell: config.service_shell.clone(),
            })?;
            changed = true;
        }

        for group in &config.groups {
            if !ctx.system().group_exists(group)? {
                console::warn(&format!("Group '{}' does not exist on this host, skipping", group));
                continue;
            }
            if ctx.system().user_in_group(user, group)? {
                tracing::debug!("{} already in group {}", user, group);
                continue;
            }
            ctx.executor.run(&GroupMembershipArgs {
                username: user.clone(),
                group: group.clone(),
            })?;
            changed = true;
        }

        Ok(if changed {
            StepOutcome::Applied
        } else {
            StepOutcome::AlreadySatisfied
        })
    }
}
