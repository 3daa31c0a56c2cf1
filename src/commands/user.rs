//! Type-safe arguments for account management tools:
//! - `UserAddArgs` for `useradd`
//! - `GroupMembershipArgs` for `usermod`

use std::path::PathBuf;

use crate::command_traits::CommandArgs;

// ============================================================================
// Add User
// ============================================================================

/// Type-safe arguments for creating the service account.
///
/// The account is a system account (no aging, UID below `UID_MIN`) with its
/// own group, a home directory, and a shell that refuses interactive login.
#[derive(Debug, Clone)]
pub struct UserAddArgs {
    pub username: String,
    pub home: PathBuf,
    pub shell: PathBuf,
}

impl CommandArgs for UserAddArgs {
    fn program(&self) -> String {
        "useradd".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "--system".to_string(),
            "--create-home".to_string(),
            "--home-dir".to_string(),
            self.home.display().to_string(),
            "--shell".to_string(),
            self.shell.display().to_string(),
            "--user-group".to_string(),
            self.username.clone(),
        ]
    }
}

// ============================================================================
// Group Membership
// ============================================================================

/// Type-safe arguments for appending a user to a supplementary group.
#[derive(Debug, Clone)]
pub struct GroupMembershipArgs {
    pub username: String,
    pub group: String,
}

impl CommandArgs for GroupMembershipArgs {
    fn program(&self) -> String {
        "usermod".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "--append".to_string(),
            "--groups".to_string(),
            self.group.clone(),
            self.username.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_useradd_args() {
        let args = UserAddArgs {
            username: "deskthing".to_string(),
            home: PathBuf::from("/home/deskthing"),
            shell: PathBuf::from("/usr/sbin/nologin"),
        };
        assert_eq!(
            args.command_line().to_string(),
            "useradd --system --create-home --home-dir /home/deskthing --shell /usr/sbin/nologin --user-group deskthing"
        );
    }

    #[test]
    fn test_usermod_appends() {
        let args = GroupMembershipArgs {
            username: "deskthing".to_string(),
            group: "video".to_string(),
        };
        assert_eq!(args.to_cli_args(), vec!["--append", "--groups", "video", "deskthing"]);
    }
}
