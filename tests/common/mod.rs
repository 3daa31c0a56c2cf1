//! In-memory host used by the provisioning integration tests.
//!
//! Interprets the handful of commands the provisioner issues closely enough
//! that a second run observes the effects of the first one.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use deskthing_provision::error::{ProvisionError, Result};
use deskthing_provision::{Action, CommandLine, ProvisionConfig, System};

pub const DEBIAN_OS_RELEASE: &str = "PRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\nID=debian\n";
pub const ARCH_OS_RELEASE: &str = "NAME=\"Arch Linux\"\nID=arch\n";

pub const DEVICE_GROUPS: &[&str] = &["video", "input", "render", "audio", "tty"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeSystem {
    pub elevated: bool,
    pub os_release: String,
    pub files: BTreeMap<PathBuf, String>,
    pub dirs: BTreeSet<PathBuf>,
    pub users: BTreeSet<String>,
    /// Group name to member names
    pub groups: BTreeMap<String, BTreeSet<String>>,
    pub enabled_units: BTreeSet<String>,
    pub packages: BTreeSet<String>,
    /// argv of every command run, joined by spaces
    pub commands: Vec<String>,
    /// Program whose invocations fail
    pub failing_program: Option<String>,
}

/// Config pointing at absolute fake paths
pub fn test_config() -> ProvisionConfig {
    ProvisionConfig {
        source_dir: PathBuf::from("/srv/deskthing/app"),
        ..ProvisionConfig::default()
    }
}

impl FakeSystem {
    /// Elevated Debian host with the application sources in place
    pub fn debian_host(config: &ProvisionConfig) -> Self {
        let mut host = Self {
            elevated: true,
            os_release: DEBIAN_OS_RELEASE.to_string(),
            ..Self::default()
        };
        for group in DEVICE_GROUPS {
            host.groups.insert(group.to_string(), BTreeSet::new());
        }
        host.dirs.insert(PathBuf::from("/etc/systemd/system"));

        let src = &config.source_dir;
        host.add_file(src.join(&config.entrypoint), "print('deskthing')\n");
        host.add_file(src.join(&config.manifest), "flask==3.0\n");
        host.add_file(src.join("static/style.css"), "body {}\n");
        host.add_file(src.join("__pycache__/main.cpython-311.pyc"), "junk");
        host
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: &str) {
        let path = path.into();
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
        self.files.insert(path, contents.to_string());
    }

    pub fn ran(&self, prefix: &str) -> usize {
        self.commands.iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn fail(cmd: &CommandLine, code: i32, stderr: &str) -> ProvisionError {
        ProvisionError::CommandFailed {
            command: cmd.to_string(),
            code,
            stderr: stderr.to_string(),
        }
    }

    fn run(&mut self, cmd: &CommandLine) -> Result<()> {
        self.commands.push(cmd.argv().join(" "));

        if self.failing_program.as_deref() == Some(cmd.program.as_str()) {
            return Err(Self::fail(cmd, 100, "simulated failure"));
        }

        let args: Vec<&str> = cmd.args.iter().map(String::as_str).collect();
        match (cmd.program.as_str(), args.as_slice()) {
            ("apt-get", ["install", "-y", packages @ ..]) => {
                self.packages.extend(packages.iter().map(|p| p.to_string()));
            }
            ("apt-get", _) => {}
            ("useradd", [.., name]) => {
                if !self.users.insert(name.to_string()) {
                    return Err(Self::fail(cmd, 9, "user already exists"));
                }
                self.groups
                    .entry(name.to_string())
                    .or_default()
                    .insert(name.to_string());
            }
            ("usermod", ["--append", "--groups", group, user]) => {
                let Some(members) = self.groups.get_mut(*group) else {
                    return Err(Self::fail(cmd, 6, "group does not exist"));
                };
                members.insert(user.to_string());
            }
            ("systemctl", ["enable", unit]) => {
                self.enabled_units.insert(unit.to_string());
            }
            ("systemctl", _) => {}
            ("python3", ["-m", "venv", path]) => {
                self.add_file(Path::new(path).join("bin/python"), "");
            }
            (python, ["-m", "pip", "install", "--no-input", rest @ ..]) => {
                if !self.files.contains_key(Path::new(python)) {
                    return Err(Self::fail(cmd, 127, "interpreter not found"));
                }
                if let ["-r", manifest] = rest {
                    if !self.files.contains_key(Path::new(manifest)) {
                        return Err(Self::fail(cmd, 1, "requirements file not found"));
                    }
                }
            }
            ("chown", ["-R", owner, path]) => {
                let user = owner.split(':').next().unwrap_or_default();
                if !self.users.contains(user) || !self.dirs.contains(Path::new(path)) {
                    return Err(Self::fail(cmd, 1, "invalid user or path"));
                }
            }
            _ => return Err(Self::fail(cmd, 127, "command not found")),
        }
        Ok(())
    }

    fn copy_tree(&mut self, from: &Path, to: &Path, exclude: &[String]) {
        let copies: Vec<(PathBuf, String)> = self
            .files
            .iter()
            .filter_map(|(path, contents)| {
                let relative = path.strip_prefix(from).ok()?;
                let excluded = relative
                    .components()
                    .any(|c| exclude.iter().any(|e| c.as_os_str() == e.as_str()));
                (!excluded).then(|| (to.join(relative), contents.clone()))
            })
            .collect();
        self.dirs.insert(to.to_path_buf());
        for (path, contents) in copies {
            self.add_file(path, &contents);
        }
    }
}

impl System for FakeSystem {
    fn is_elevated(&self) -> bool {
        self.elevated
    }

    fn os_release(&self) -> Result<String> {
        Ok(self.os_release.clone())
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.dirs.contains(path)
    }

    fn read_file(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }

    fn user_exists(&self, name: &str) -> Result<bool> {
        Ok(self.users.contains(name))
    }

    fn group_exists(&self, name: &str) -> Result<bool> {
        Ok(self.groups.contains_key(name))
    }

    fn user_in_group(&self, user: &str, group: &str) -> Result<bool> {
        Ok(self.groups.get(group).is_some_and(|members| members.contains(user)))
    }

    fn unit_enabled(&self, unit: &str) -> Result<bool> {
        Ok(self.enabled_units.contains(unit))
    }

    fn apply(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Run(cmd) => self.run(cmd)?,
            Action::CreateDir(path) => {
                let mut dir = Some(path.as_path());
                while let Some(d) = dir {
                    if d.as_os_str().is_empty() {
                        break;
                    }
                    self.dirs.insert(d.to_path_buf());
                    dir = d.parent();
                }
            }
            Action::CopyTree { from, to, exclude } => self.copy_tree(from, to, exclude),
            Action::WriteFile { path, contents } => self.add_file(path.clone(), contents),
        }
        Ok(())
    }
}
