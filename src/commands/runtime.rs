//! Type-safe arguments for the application runtime environment.

use std::path::PathBuf;

use crate::command_traits::CommandArgs;

/// `python3 -m venv <path>`
#[derive(Debug, Clone)]
pub struct VenvArgs {
    pub path: PathBuf,
}

impl CommandArgs for VenvArgs {
    fn program(&self) -> String {
        "python3".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["-m".to_string(), "venv".to_string(), self.path.display().to_string()]
    }
}

/// What pip should install into the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipTarget {
    /// Upgrade pip itself
    SelfUpgrade,
    /// Install from a requirements manifest
    Requirements(PathBuf),
}

/// `<venv python> -m pip install ...`, run through the environment's own
/// interpreter so nothing leaks into the system site-packages.
#[derive(Debug, Clone)]
pub struct PipInstallArgs {
    pub python: PathBuf,
    pub target: PipTarget,
}

impl CommandArgs for PipInstallArgs {
    fn program(&self) -> String {
        self.python.display().to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            "-m".to_string(),
            "pip".to_string(),
            "install".to_string(),
            "--no-input".to_string(),
        ];
        match &self.target {
            PipTarget::SelfUpgrade => {
                args.push("--upgrade".to_string());
                args.push("pip".to_string());
            }
            PipTarget::Requirements(manifest) => {
                args.push("-r".to_string());
                args.push(manifest.display().to_string());
            }
        }
        args
    }
}

/// `chown -R <owner>:<owner> <path>`
#[derive(Debug, Clone)]
pub struct ChownArgs {
    pub owner: String,
    pub path: PathBuf,
}

impl CommandArgs for ChownArgs {
    fn program(&self) -> String {
        "chown".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "-R".to_string(),
            format!("{0}:{0}", self.owner),
            self.path.display().to_string(),
        ]
    }
}
