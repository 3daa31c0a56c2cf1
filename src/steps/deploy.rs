//! Step 3: application deployment.

use crate::commands::runtime::{ChownArgs, PipInstallArgs, PipTarget, VenvArgs};
use crate::config::ProvisionConfig;
use crate::console;
use crate::error::{ProvisionError, Result};
use crate::executor::Action;
use crate::prompt::Confirmation;
use crate::stage::ProvisionStage;
use crate::steps::{Context, Step};
use crate::system::System;
use crate::types::StepOutcome;

/// Source entries never copied into the install root
const COPY_EXCLUDES: &[&str] = &["__pycache__", ".git"];

/// Fail with `MissingArtifact` unless the entrypoint and the dependency
/// manifest are present in the source directory.
pub fn verify_artifacts(config: &ProvisionConfig, system: &dyn System) -> Result<()> {
    for artifact in [config.source_entrypoint(), config.source_manifest()] {
        if !system.path_exists(&artifact) {
            return Err(ProvisionError::missing_artifact(artifact));
        }
    }
    Ok(())
}

/// Copies the application into the install root, builds its isolated
/// runtime, installs its declared dependencies and hands the tree to the
/// service account.
pub struct DeploymentStep;

impl Step for DeploymentStep {
    fn name(&self) -> &'static str {
        "Application deployment"
    }

    fn stage(&self) -> ProvisionStage {
        ProvisionStage::Deployment
    }

    fn confirmation(&self, ctx: &Context<'_>) -> Option<Confirmation> {
        Some(Confirmation::yes(format!(
            "Deploy {} to {}?",
            ctx.config.app_name,
            ctx.config.install_root.display()
        )))
    }

    fn check(&self, ctx: &Context<'_>) -> Result<()> {
        verify_artifacts(ctx.config, ctx.system())
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<StepOutcome> {
        let config = ctx.config;
        let root = &config.install_root;

        ctx.executor.execute(Action::CreateDir(root.clone()))?;

        let mut exclude: Vec<String> = COPY_EXCLUDES.iter().map(|e| e.to_string()).collect();
        // A source tree with its own environment must not clobber ours
        exclude.push(config.venv_dir.clone());
        ctx.executor.execute(Action::CopyTree {
            from: config.source_dir.clone(),
            to: root.clone(),
            exclude,
        })?;

        let python = config.venv_python();
        if ctx.system().path_exists(&python) {
            console::info(&format!("Runtime environment already present at {}", config.venv_path().display()));
        } else {
            ctx.executor.run(&VenvArgs {
                path: config.venv_path(),
            })?;
        }

        ctx.executor.run(&PipInstallArgs {
            python: python.clone(),
            target: PipTarget::SelfUpgrade,
        })?;
        ctx.executor.run(&PipInstallArgs {
            python,
            target: PipTarget::Requirements(root.join(&config.manifest)),
        })?;

        ctx.executor.run(&ChownArgs {
            owner: config.service_user.clone(),
            path: root.clone(),
        })?;

        Ok(StepOutcome::Applied)
    }
}
