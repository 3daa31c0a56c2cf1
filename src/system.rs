//! The host seam.
//!
//! [`System`] is everything the provisioner knows about the machine: a set of
//! read-only queries, which run in every mode so dry-run previews reflect the
//! real host, and [`System::apply`], the only way anything gets mutated.
//! [`HostSystem`] is the real implementation; tests substitute an in-memory
//! one.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;
use nix::unistd::{Group, User};
use walkdir::WalkDir;

use crate::command_runner::{run_command_safe, OutputMode};
use crate::command_traits::CommandArgs;
use crate::commands::service::{SystemctlAction, SystemctlArgs};
use crate::error::Result;
use crate::executor::Action;
use crate::platform::OS_RELEASE_PATH;

/// Queries and effects against the host.
pub trait System {
    /// Running with an effective UID of 0
    fn is_elevated(&self) -> bool;

    /// Contents of the os-release file, empty if absent
    fn os_release(&self) -> Result<String>;

    fn path_exists(&self, path: &Path) -> bool;

    /// File contents, `None` if the file does not exist
    fn read_file(&self, path: &Path) -> Result<Option<String>>;

    fn user_exists(&self, name: &str) -> Result<bool>;

    fn group_exists(&self, name: &str) -> Result<bool>;

    /// Whether `user` is in `group`, as primary or supplementary member
    fn user_in_group(&self, user: &str, group: &str) -> Result<bool>;

    /// Whether the service manager starts `unit` at boot
    fn unit_enabled(&self, unit: &str) -> Result<bool>;

    /// Perform one mutating action. Never called in dry-run.
    fn apply(&mut self, action: &Action) -> Result<()>;
}

/// The machine the provisioner is running on.
#[derive(Debug, Default)]
pub struct HostSystem;

impl HostSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for HostSystem {
    fn is_elevated(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    fn os_release(&self) -> Result<String> {
        Ok(self.read_file(Path::new(OS_RELEASE_PATH))?.unwrap_or_default())
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_file(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn user_exists(&self, name: &str) -> Result<bool> {
        Ok(User::from_name(name).map_err(io::Error::from)?.is_some())
    }

    fn group_exists(&self, name: &str) -> Result<bool> {
        Ok(Group::from_name(name).map_err(io::Error::from)?.is_some())
    }

    fn user_in_group(&self, user: &str, group: &str) -> Result<bool> {
        let Some(group) = Group::from_name(group).map_err(io::Error::from)? else {
            return Ok(false);
        };
        if group.mem.iter().any(|member| member == user) {
            return Ok(true);
        }
        let primary = User::from_name(user)
            .map_err(io::Error::from)?
            .is_some_and(|u| u.gid == group.gid);
        Ok(primary)
    }

    fn unit_enabled(&self, unit: &str) -> Result<bool> {
        let query = SystemctlArgs::unit(SystemctlAction::IsEnabled, unit).command_line();
        let output = run_command_safe(&query, OutputMode::Captured)?;
        // is-enabled exits non-zero for disabled or unknown units
        Ok(output.success && output.stdout.trim() == "enabled")
    }

    fn apply(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Run(cmd) => run_command_safe(cmd, OutputMode::Streamed)?.ensure_success(),
            Action::CreateDir(path) => Ok(fs::create_dir_all(path)?),
            Action::CopyTree { from, to, exclude } => copy_tree(from, to, exclude),
            Action::WriteFile { path, contents } => Ok(fs::write(path, contents)?),
        }
    }
}

/// Recursively copy `from` into `to`, overwriting existing files.
///
/// Entries whose file name is in `exclude` are pruned at any depth below the
/// root. Symlinks are recreated as links rather than followed.
pub fn copy_tree(from: &Path, to: &Path, exclude: &[String]) -> Result<()> {
    let is_excluded = |entry: &walkdir::DirEntry| {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| exclude.iter().any(|e| e == name))
    };

    for entry in WalkDir::new(from)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            let skip = is_excluded(e);
            if skip {
                tracing::debug!("Skipping excluded entry {:?}", e.path());
            }
            !skip
        })
    {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .with_context(|| format!("{:?} is outside {:?}", entry.path(), from))?;
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path())?;
            if fs::symlink_metadata(&target).is_ok() {
                fs::remove_file(&target)?;
            }
            std::os::unix::fs::symlink(link, &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}
