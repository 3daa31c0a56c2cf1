//! Process-group-isolated command execution.
//!
//! All external commands go through [`run_command_safe`], which:
//!
//! - spawns the child in its own process group,
//! - registers it with the global `ChildRegistry` so an interrupt can stop it,
//! - never hands the child our stdin (prompts belong to the provisioner).

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use crate::command_traits::CommandLine;
use crate::error::ProvisionError;
use crate::process_guard::{ChildRegistry, CommandProcessGroup};

/// Where the child's stdout goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Capture stdout for the caller (queries)
    Captured,
    /// Pass stdout through to the terminal and echo stderr as it arrives,
    /// so long installs show progress and warnings live
    Streamed,
}

/// stderr lines kept from a streamed command for its failure report
const STDERR_TAIL_LINES: usize = 20;

/// Run a command to completion.
///
/// stderr is always collected so failures carry a diagnostic; in streamed
/// mode only its last lines are kept. A non-zero exit
/// is reported through `CommandOutput::success`, not as an `Err`; `Err`
/// means the command could not be spawned or waited on.
pub fn run_command_safe(cmd: &CommandLine, mode: OutputMode) -> Result<CommandOutput> {
    tracing::info!("run_command_safe: {}", cmd);

    let stdout = match mode {
        OutputMode::Captured => Stdio::piped(),
        OutputMode::Streamed => Stdio::inherit(),
    };

    let child = Command::new(&cmd.program)
        .args(&cmd.args)
        .envs(cmd.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(Stdio::piped())
        .in_new_process_group()
        .spawn()
        .with_context(|| format!("Failed to spawn `{}`", cmd.program))?;
    let pid = child.id();

    if let Ok(mut registry) = ChildRegistry::global().lock() {
        registry.register(pid);
    }

    let finished = match mode {
        OutputMode::Captured => child.wait_with_output().map(|output| {
            (
                output.status,
                String::from_utf8_lossy(&output.stdout).to_string(),
                String::from_utf8_lossy(&output.stderr).to_string(),
            )
        }),
        OutputMode::Streamed => wait_streamed(child).map(|(status, stderr)| (status, String::new(), stderr)),
    };

    if let Ok(mut registry) = ChildRegistry::global().lock() {
        registry.unregister(pid);
    }

    let (status, stdout, stderr) =
        finished.with_context(|| format!("Failed waiting for `{}`", cmd.program))?;

    let result = CommandOutput {
        command: cmd.to_string(),
        stdout,
        stderr,
        exit_code: status.code(),
        success: status.success(),
    };

    if result.success {
        tracing::debug!("`{}` succeeded", cmd.program);
    } else {
        tracing::debug!("`{}` exited with {:?}", cmd.program, result.exit_code);
    }

    Ok(result)
}

/// Echo the child's stderr line by line while it runs, keeping the tail.
fn wait_streamed(mut child: Child) -> std::io::Result<(ExitStatus, String)> {
    let reader = child.stderr.take().map(|stderr| {
        thread::spawn(move || {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            for line in BufReader::new(stderr).lines().map_while(std::result::Result::ok) {
                eprintln!("{}", line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Vec::from(tail).join("\n")
        })
    });

    let status = child.wait()?;
    let stderr = match reader {
        Some(handle) => handle.join().unwrap_or_default(),
        None => String::new(),
    };
    Ok((status, stderr))
}

/// Output from a command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Display form of the command that ran
    pub command: String,
    /// Standard output (empty when streamed)
    pub stdout: String,
    pub stderr: String,
    /// Exit code (None if terminated by signal)
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl CommandOutput {
    /// Turn a non-zero exit into `ProvisionError::CommandFailed`
    pub fn ensure_success(&self) -> crate::error::Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(ProvisionError::CommandFailed {
                command: self.command.clone(),
                code: self.exit_code.unwrap_or(-1),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(program: &str, args: &[&str]) -> CommandLine {
        CommandLine {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: vec![],
        }
    }

    #[test]
    fn test_captures_stdout() {
        let output = run_command_safe(&line("echo", &["provisioned"]), OutputMode::Captured).unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "provisioned");
        assert!(output.ensure_success().is_ok());
    }

    #[test]
    fn test_passes_environment() {
        let mut cmd = line("sh", &["-c", "echo $DESKTHING_TEST_VAR"]);
        cmd.env.push(("DESKTHING_TEST_VAR".to_string(), "kiosk".to_string()));
        let output = run_command_safe(&cmd, OutputMode::Captured).unwrap();
        assert_eq!(output.stdout.trim(), "kiosk");
    }

    #[test]
    fn test_failure_maps_to_command_failed() {
        let output = run_command_safe(
            &line("sh", &["-c", "echo broken >&2; exit 3"]),
            OutputMode::Captured,
        )
        .unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(3));

        match output.ensure_success() {
            Err(ProvisionError::CommandFailed { code, stderr, .. }) => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_streamed_failure_keeps_stderr_tail() {
        let output = run_command_safe(
            &line("sh", &["-c", "for i in $(seq 1 30); do echo line$i >&2; done; echo oops >&2; exit 3"]),
            OutputMode::Streamed,
        )
        .unwrap();
        assert!(!output.success);
        assert!(output.stdout.is_empty());

        match output.ensure_success() {
            Err(ProvisionError::CommandFailed { code, stderr, .. }) => {
                assert_eq!(code, 3);
                assert!(stderr.ends_with("oops"));
                assert!(stderr.starts_with("line12\n"));
                assert_eq!(stderr.lines().count(), STDERR_TAIL_LINES);
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let result = run_command_safe(
            &line("this_binary_definitely_does_not_exist_12345", &[]),
            OutputMode::Captured,
        );
        assert!(result.is_err());
    }
}
