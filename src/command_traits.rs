//! Type-safe external command contracts.
//!
//! Every command the provisioner runs is described by a struct implementing
//! [`CommandArgs`]. The struct is the single source of truth for the flags a
//! tool expects; call sites never assemble argument vectors by hand.

use std::fmt;

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: binary to execute (name resolved through `PATH`, or an absolute path).
/// - `to_cli_args()`: arguments exactly as the tool expects them.
/// - `get_env_vars()`: extra environment for the child process.
pub trait CommandArgs {
    /// The binary to execute
    fn program(&self) -> String;

    /// Convert struct fields to CLI arguments
    fn to_cli_args(&self) -> Vec<String>;

    /// Environment variables required by the tool
    fn get_env_vars(&self) -> Vec<(String, String)> {
        vec![]
    }

    /// Freeze the contract into an executable command line
    fn command_line(&self) -> CommandLine {
        CommandLine {
            program: self.program(),
            args: self.to_cli_args(),
            env: self.get_env_vars(),
        }
    }
}

/// A fully resolved command: program, arguments and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandLine {
    /// Program followed by its arguments
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, shell_quote(value))?;
        }
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// Quote a word for display if a shell would split or expand it.
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
