//! deskthing-provision - main entry point

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use deskthing_provision::cli::Cli;
use deskthing_provision::config::ProvisionConfig;
use deskthing_provision::prompt::TerminalPrompter;
use deskthing_provision::system::HostSystem;
use deskthing_provision::types::ExitStatus;
use deskthing_provision::{console, process_guard, Provisioner};

/// Diagnostics go to stderr; `RUST_LOG` overrides the default filter
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse_args();
    let mode = cli.mode();
    tracing::debug!("Starting in {} mode", mode);

    // Lets Ctrl+C take down apt-get/pip along with us
    if let Err(e) = process_guard::init_signal_handlers() {
        tracing::warn!("Failed to initialize signal handlers: {}", e);
    }

    let config = match ProvisionConfig::load().and_then(|mut config| {
        config.resolve_source_dir()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            console::error(&format!("Invalid configuration: {:#}", e));
            return ExitStatus::Failure.into();
        }
    };

    let mut system = HostSystem::new();
    let mut prompter = TerminalPrompter::new();
    Provisioner::new(&mut system, &mut prompter)
        .run(mode, &config)
        .into()
}
