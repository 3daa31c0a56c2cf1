//! Type-safe arguments for the host package manager.

use crate::command_traits::CommandArgs;
use crate::platform::PlatformCaps;

/// Package manager operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOp {
    /// Refresh package lists
    Update,
    /// Upgrade installed packages
    Upgrade,
    /// Install the listed packages (already-installed ones are left alone)
    Install(Vec<String>),
    /// Drop downloaded archives
    Clean,
    /// Remove orphaned dependencies
    Autoremove,
}

/// Type-safe arguments for a package manager invocation.
///
/// # Field to Flag Mapping (apt-get)
///
/// | Operation    | Arguments                     |
/// |--------------|-------------------------------|
/// | `Update`     | `update`                      |
/// | `Upgrade`    | `upgrade -y`                  |
/// | `Install`    | `install -y <packages...>`    |
/// | `Clean`      | `clean`                       |
/// | `Autoremove` | `autoremove -y`               |
#[derive(Debug, Clone)]
pub struct PackageArgs {
    pub caps: &'static PlatformCaps,
    pub op: PackageOp,
}

impl PackageArgs {
    pub fn new(caps: &'static PlatformCaps, op: PackageOp) -> Self {
        Self { caps, op }
    }
}

impl CommandArgs for PackageArgs {
    fn program(&self) -> String {
        self.caps.package_manager.to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        let args: Vec<&str> = match &self.op {
            PackageOp::Update => vec!["update"],
            PackageOp::Upgrade => vec!["upgrade", "-y"],
            PackageOp::Install(packages) => {
                let mut args = vec!["install", "-y"];
                args.extend(packages.iter().map(String::as_str));
                args
            }
            PackageOp::Clean => vec!["clean"],
            PackageOp::Autoremove => vec!["autoremove", "-y"],
        };
        args.into_iter().map(String::from).collect()
    }

    fn get_env_vars(&self) -> Vec<(String, String)> {
        self.caps
            .env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}
