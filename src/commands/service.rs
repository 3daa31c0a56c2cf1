//! Type-safe arguments for `systemctl`.

use strum::Display;

use crate::command_traits::CommandArgs;

/// systemctl verbs the provisioner uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SystemctlAction {
    /// Re-read unit files after writing one
    DaemonReload,
    /// Start the unit at boot
    Enable,
    /// Query whether the unit is enabled (read-only)
    IsEnabled,
    /// Start the unit now
    Start,
    Reboot,
}

impl SystemctlAction {
    /// Whether the verb operates on a named unit
    pub fn takes_unit(self) -> bool {
        matches!(self, Self::Enable | Self::IsEnabled | Self::Start)
    }
}

/// Type-safe arguments for a systemctl invocation.
#[derive(Debug, Clone)]
pub struct SystemctlArgs {
    pub action: SystemctlAction,
    pub unit: Option<String>,
}

impl SystemctlArgs {
    /// A verb without a unit (`daemon-reload`, `reboot`)
    pub fn global(action: SystemctlAction) -> Self {
        Self { action, unit: None }
    }

    /// A verb on a named unit
    pub fn unit(action: SystemctlAction, unit: impl Into<String>) -> Self {
        Self {
            action,
            unit: Some(unit.into()),
        }
    }
}

impl CommandArgs for SystemctlArgs {
    fn program(&self) -> String {
        "systemctl".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![self.action.to_string()];
        if self.action.takes_unit() {
            if let Some(ref unit) = self.unit {
                args.push(unit.clone());
            }
        }
        args
    }
}
