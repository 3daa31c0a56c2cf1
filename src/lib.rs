//! DeskThing provisioner library
//!
//! Turns a Debian-family host into a single-purpose DeskThing kiosk: system
//! packages, a dedicated service account, the deployed application with its
//! own Python runtime, and a systemd unit that starts it on boot.

pub mod cli;
pub mod command_runner;
pub mod command_traits;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod executor;
pub mod platform;
pub mod process_guard;
pub mod prompt;
pub mod provisioner;
pub mod stage;
pub mod steps;
pub mod system;
pub mod types;
pub mod unit;

pub use command_runner::{run_command_safe, CommandOutput, OutputMode};
pub use command_traits::{CommandArgs, CommandLine};
pub use config::ProvisionConfig;
pub use error::ProvisionError;
pub use executor::{Action, Executor, JournalEntry};
pub use platform::{Platform, PlatformCaps};
pub use process_guard::{ChildRegistry, CommandProcessGroup};
pub use prompt::{Confirmation, Prompter, ScriptedPrompter, TerminalPrompter};
pub use provisioner::{Provisioner, RunReport};
pub use stage::{ProvisionStage, StageTracker, StageTransitionError};
pub use steps::{Context, Step};
pub use system::{HostSystem, System};
pub use types::{ExitStatus, RunMode, Severity, StepOutcome};
pub use unit::ServiceUnitSpec;
