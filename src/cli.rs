use clap::Parser;
use std::ffi::OsString;

use crate::types::RunMode;

/// Flags clap is allowed to see; everything else is dropped before parsing
const KNOWN_FLAGS: &[&str] = &["--dry-run", "-h", "--help", "-V", "--version"];

/// DeskThing provisioner - turns a Debian-family host into a DeskThing kiosk
#[derive(Parser, Debug)]
#[command(name = "deskthing-provision")]
#[command(about = "Install, configure and enable the DeskThing kiosk service")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: show what would be done without changing anything.
    ///
    /// Host state is still inspected (users, groups, unit files) so the
    /// preview matches what a real run would do. Root is not required.
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse the process arguments, ignoring unknown ones
    pub fn parse_args() -> Self {
        Self::parse_lenient(std::env::args_os())
    }

    /// Parse `args` (program name first), silently dropping unrecognized
    /// arguments instead of rejecting them.
    pub fn parse_lenient<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into);
        let program = args.next().unwrap_or_else(|| OsString::from("deskthing-provision"));

        let filtered = std::iter::once(program).chain(args.filter(|arg| {
            let known = arg.to_str().is_some_and(|a| KNOWN_FLAGS.contains(&a));
            if !known {
                tracing::debug!("Ignoring unrecognized argument {:?}", arg);
            }
            known
        }));

        <Self as Parser>::parse_from(filtered)
    }

    pub fn mode(&self) -> RunMode {
        RunMode::from_dry_run(self.dry_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_args() {
        let cli = Cli::try_parse_from(["deskthing-provision"]).unwrap();
        assert!(!cli.dry_run);
        assert_eq!(cli.mode(), RunMode::Live);
    }

    #[test]
    fn test_cli_dry_run() {
        let cli = Cli::try_parse_from(["deskthing-provision", "--dry-run"]).unwrap();
        assert_eq!(cli.mode(), RunMode::DryRun);
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert!(Cli::try_parse_from(["deskthing-provision", "--verbose"]).is_err());
    }

    #[test]
    fn test_lenient_parse_ignores_unknown() {
        let cli = Cli::parse_lenient([
            "deskthing-provision",
            "--verbose",
            "--dry-run",
            "extra",
            "-x",
        ]);
        assert_eq!(cli.mode(), RunMode::DryRun);
    }

    #[test]
    fn test_lenient_parse_only_unknown() {
        let cli = Cli::parse_lenient(["deskthing-provision", "--force", "now"]);
        assert_eq!(cli.mode(), RunMode::Live);
    }

    #[test]
    fn test_lenient_parse_empty_argv() {
        let cli = Cli::parse_lenient(Vec::<String>::new());
        assert!(!cli.dry_run);
    }
}
