//! Run orchestration.
//!
//! [`Provisioner::run`] is the whole program minus argument parsing: pre-flight
//! checks, the proceed gate, then every step in stage order. Errors are
//! surfaced once, here, with their severity tag and the stage they hit.

use crate::config::ProvisionConfig;
use crate::console;
use crate::error::{ProvisionError, Result};
use crate::executor::{Executor, JournalEntry};
use crate::platform::Platform;
use crate::prompt::{Confirmation, Prompter};
use crate::stage::{ProvisionStage, StageTracker};
use crate::steps::{self, verify_artifacts, Context, Step};
use crate::system::System;
use crate::types::{ExitStatus, RunMode, Severity, StepOutcome};

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: RunMode,
    pub platform: Platform,
    /// Step name and outcome, in execution order
    pub outcomes: Vec<(&'static str, StepOutcome)>,
    /// Every action issued, applied or only described
    pub journal: Vec<JournalEntry>,
    /// Stages entered, from `NotStarted` through `Completed`
    pub stages: Vec<ProvisionStage>,
}

impl RunReport {
    pub fn outcome(&self, step: &str) -> Option<&StepOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| *name == step)
            .map(|(_, outcome)| outcome)
    }

    /// Number of actions that actually touched the host
    pub fn applied_actions(&self) -> usize {
        self.journal.iter().filter(|entry| entry.applied).count()
    }
}

pub struct Provisioner<'a> {
    system: &'a mut dyn System,
    prompter: &'a mut dyn Prompter,
    steps: Vec<Box<dyn Step>>,
    tracker: StageTracker,
}

impl<'a> Provisioner<'a> {
    /// Provisioner running the standard step sequence
    pub fn new(system: &'a mut dyn System, prompter: &'a mut dyn Prompter) -> Self {
        Self::with_steps(system, prompter, steps::standard_sequence())
    }

    /// Provisioner running a custom step list. The list must still follow
    /// stage order; a step out of order fails the run before it applies.
    pub fn with_steps(
        system: &'a mut dyn System,
        prompter: &'a mut dyn Prompter,
        steps: Vec<Box<dyn Step>>,
    ) -> Self {
        Self {
            system,
            prompter,
            steps,
            tracker: StageTracker::new(),
        }
    }

    /// Stage bookkeeping of the last run
    pub fn stages(&self) -> &StageTracker {
        &self.tracker
    }

    /// Run and report on the terminal. Never panics on host errors; every
    /// failure ends up as a tagged line and an exit status.
    pub fn run(&mut self, mode: RunMode, config: &ProvisionConfig) -> ExitStatus {
        match self.execute(mode, config) {
            Ok(report) => {
                print_report(&report);
                ExitStatus::Success
            }
            Err(err) => {
                tracing::debug!("Run ended with {:?}", err);
                console::emit(err.severity(), &err.to_string());
                if let Some(stage) = self.tracker.failed_at() {
                    console::error(&format!("Provisioning failed during: {}", stage));
                    console::info("Fix the problem above and run again; finished work is not repeated.");
                }
                ExitStatus::from_code(err.exit_code())
            }
        }
    }

    /// Run and return the structured result instead of printing a summary.
    pub fn execute(&mut self, mode: RunMode, config: &ProvisionConfig) -> Result<RunReport> {
        self.tracker = StageTracker::new();
        let result = self.execute_stages(mode, config);
        match &result {
            Err(ProvisionError::PromptAbort) | Ok(_) => {}
            Err(_) => self.tracker.fail(),
        }
        result
    }

    fn execute_stages(&mut self, mode: RunMode, config: &ProvisionConfig) -> Result<RunReport> {
        self.tracker.transition_to(ProvisionStage::Preflight)?;

        config
            .validate()
            .map_err(|e| ProvisionError::config(format!("{:#}", e)))?;

        if mode.is_dry_run() {
            console::emit(Severity::DryRun, "Dry-run mode: nothing on this host will be changed");
        } else if !self.system.is_elevated() {
            return Err(ProvisionError::permission(
                "Provisioning must run as root (try: sudo deskthing-provision, or --dry-run to preview)",
            ));
        }

        let platform = Platform::from_os_release(&self.system.os_release()?);
        if platform.is_supported() {
            console::success(&format!("Detected {}", platform));
        } else {
            console::warn(&format!(
                "Platform {} is not supported; system packages will not be installed",
                platform
            ));
            if !self.prompter.ask(&Confirmation::yes("Continue anyway?"))? {
                return Err(ProvisionError::unsupported_platform(platform.to_string()));
            }
        }

        verify_artifacts(config, &*self.system)?;
        print_summary(mode, &platform, config);

        let proceed = Confirmation::yes(format!("Proceed with {} provisioning?", config.app_name));
        if !self.prompter.ask(&proceed)? {
            return Err(ProvisionError::PromptAbort);
        }

        let mut ctx = Context {
            config,
            platform: platform.clone(),
            executor: Executor::new(mode, &mut *self.system),
            prompter: &mut *self.prompter,
        };
        let mut outcomes = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            self.tracker.transition_to(step.stage())?;
            console::info(&format!("==> {}", step.stage()));

            step.check(&ctx)?;
            let outcome = match step.confirmation(&ctx) {
                Some(question) if !ctx.confirm(&question)? => StepOutcome::Declined,
                _ => step.apply(&mut ctx)?,
            };
            tracing::info!("{}: {}", step.name(), outcome.label());
            outcomes.push((step.name(), outcome));
        }

        let journal = ctx.executor.into_journal();
        self.tracker.transition_to(ProvisionStage::Completed)?;

        Ok(RunReport {
            mode,
            platform,
            outcomes,
            journal,
            stages: self.tracker.history().to_vec(),
        })
    }
}

fn print_summary(mode: RunMode, platform: &Platform, config: &ProvisionConfig) {
    console::info(&format!("About to provision {} ({})", config.app_name, mode));
    console::info(&format!("  platform:     {}", platform));
    console::info(&format!("  source:       {}", config.source_dir.display()));
    console::info(&format!("  install root: {}", config.install_root.display()));
    console::info(&format!("  service user: {}", config.service_user));
    console::info(&format!("  unit file:    {}", config.unit_path().display()));
}

fn print_report(report: &RunReport) {
    for (name, outcome) in &report.outcomes {
        let line = format!("{}: {}", name, outcome.label());
        match outcome {
            StepOutcome::Applied | StepOutcome::AlreadySatisfied => console::success(&line),
            StepOutcome::Skipped(_) => console::warn(&line),
            StepOutcome::Declined => console::info(&line),
        }
    }

    if report.mode.is_dry_run() {
        console::emit(
            Severity::DryRun,
            &format!("{} action(s) described, none applied", report.journal.len()),
        );
    } else {
        console::success(&format!(
            "Provisioning complete ({} action(s) applied)",
            report.applied_actions()
        ));
    }
}
