//! Provisioning configuration.
//!
//! Built-in defaults describe the stock DeskThing kiosk layout. An operator
//! can overlay them with a JSON file named by `DESKTHING_PROVISION_CONFIG`;
//! any field left out of the file keeps its default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an optional JSON overlay file.
pub const CONFIG_ENV_VAR: &str = "DESKTHING_PROVISION_CONFIG";

/// Everything the provisioning steps need to know about the target layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Human-readable application name used in messages
    pub app_name: String,

    // Application source
    /// Directory holding the application sources
    pub source_dir: PathBuf,
    /// Entrypoint file inside `source_dir`
    pub entrypoint: String,
    /// Dependency manifest inside `source_dir`
    pub manifest: String,

    // Target layout
    /// Install root the application is copied into
    pub install_root: PathBuf,
    /// Name of the runtime environment directory inside the install root
    pub venv_dir: String,

    // Service account
    pub service_user: String,
    /// Login shell for the service account
    pub service_shell: PathBuf,
    /// Device-access groups the account joins
    pub groups: Vec<String>,

    // Service unit
    /// Unit name without the `.service` suffix
    pub service_name: String,
    /// Directory the unit file is written to
    pub unit_dir: PathBuf,
    /// Kiosk compositor wrapping the application
    pub kiosk_command: Vec<String>,
    /// Virtual terminal the kiosk session owns
    pub tty: String,
    /// Seconds systemd waits before restarting the service
    pub restart_sec: u32,
    /// Environment exported to the application
    pub environment: BTreeMap<String, String>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        let environment = [
            ("QT_QPA_PLATFORM", "wayland"),
            ("QTWEBENGINE_DISABLE_SANDBOX", "1"),
            ("PYTHONUNBUFFERED", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            app_name: "DeskThing".to_string(),
            source_dir: PathBuf::from("app"),
            entrypoint: "main.py".to_string(),
            manifest: "requirements.txt".to_string(),
            install_root: PathBuf::from("/opt/deskthing"),
            venv_dir: "venv".to_string(),
            service_user: "deskthing".to_string(),
            service_shell: PathBuf::from("/usr/sbin/nologin"),
            groups: ["video", "input", "render", "audio", "tty"]
                .into_iter()
                .map(String::from)
                .collect(),
            service_name: "deskthing".to_string(),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            kiosk_command: vec!["/usr/bin/cage".to_string(), "-s".to_string(), "--".to_string()],
            tty: "tty1".to_string(),
            restart_sec: 5,
            environment,
        }
    }
}

impl ProvisionConfig {
    /// Load configuration: the file named by `DESKTHING_PROVISION_CONFIG`
    /// if set, defaults otherwise.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load_from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a JSON file, defaulting missing fields
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !is_valid_account_name(&self.service_user) {
            anyhow::bail!(
                "Service user '{}' must start with a lowercase letter or underscore and contain only [a-z0-9_-] (max 32 chars)",
                self.service_user
            );
        }

        if !self.install_root.is_absolute() {
            anyhow::bail!("Install root {:?} must be an absolute path", self.install_root);
        }
        if !self.unit_dir.is_absolute() {
            anyhow::bail!("Unit directory {:?} must be an absolute path", self.unit_dir);
        }

        if self.service_name.is_empty()
            || !self
                .service_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
        {
            anyhow::bail!("Service name '{}' is not a valid unit name", self.service_name);
        }

        for (label, name) in [
            ("Entrypoint", &self.entrypoint),
            ("Manifest", &self.manifest),
            ("Runtime directory", &self.venv_dir),
        ] {
            if name.trim().is_empty() || name.contains('/') {
                anyhow::bail!("{} must be a plain file name, got '{}'", label, name);
            }
        }

        if self.kiosk_command.is_empty() {
            anyhow::bail!("Kiosk command must not be empty");
        }

        if let Some(group) = self.groups.iter().find(|g| !is_valid_account_name(g)) {
            anyhow::bail!("Group '{}' is not a valid group name", group);
        }

        if let Some(key) = self.environment.keys().find(|k| {
            k.is_empty() || !k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }) {
            anyhow::bail!("Environment variable name '{}' is invalid", key);
        }

        if !is_valid_tty(&self.tty) {
            anyhow::bail!("TTY {:?} must name a virtual terminal such as tty1", self.tty);
        }

        // Everything below ends up in the unit file, one directive per line
        let mut unit_values = vec![
            ("Application name", self.app_name.clone()),
            ("Install root", self.install_root.display().to_string()),
            ("Entrypoint", self.entrypoint.clone()),
            ("Runtime directory", self.venv_dir.clone()),
        ];
        unit_values.extend(self.kiosk_command.iter().map(|w| ("Kiosk command", w.clone())));
        unit_values.extend(self.environment.values().map(|v| ("Environment value", v.clone())));
        if let Some((label, value)) = unit_values
            .iter()
            .find(|(_, value)| value.chars().any(char::is_control))
        {
            anyhow::bail!("{} {:?} must not contain control characters", label, value);
        }

        Ok(())
    }

    /// Make a relative `source_dir` absolute. The working directory wins
    /// when the tree exists there, otherwise the directory holding the
    /// provisioner binary is used.
    pub fn resolve_source_dir(&mut self) -> Result<()> {
        let cwd = std::env::current_dir().context("Failed to read the working directory")?;
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        self.anchor_source_dir(&cwd, exe_dir.as_deref());
        Ok(())
    }

    fn anchor_source_dir(&mut self, cwd: &Path, exe_dir: Option<&Path>) {
        if self.source_dir.is_absolute() {
            return;
        }
        let from_cwd = cwd.join(&self.source_dir);
        self.source_dir = match exe_dir {
            Some(dir) if !from_cwd.exists() => dir.join(&self.source_dir),
            _ => from_cwd,
        };
        tracing::debug!("Application source resolved to {:?}", self.source_dir);
    }

    /// Full path of the application entrypoint in the source tree
    pub fn source_entrypoint(&self) -> PathBuf {
        self.source_dir.join(&self.entrypoint)
    }

    /// Full path of the dependency manifest in the source tree
    pub fn source_manifest(&self) -> PathBuf {
        self.source_dir.join(&self.manifest)
    }

    /// Runtime environment directory
    pub fn venv_path(&self) -> PathBuf {
        self.install_root.join(&self.venv_dir)
    }

    /// Interpreter inside the runtime environment
    pub fn venv_python(&self) -> PathBuf {
        self.venv_path().join("bin").join("python")
    }

    /// Unit file name, e.g. `deskthing.service`
    pub fn unit_file_name(&self) -> String {
        format!("{}.service", self.service_name)
    }

    /// Full path of the generated unit file
    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(self.unit_file_name())
    }
}

/// `tty` followed by a number, e.g. `tty1`
fn is_valid_tty(name: &str) -> bool {
    name.strip_prefix("tty")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Account and group names as accepted by `useradd` without `--badname`.
fn is_valid_account_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= 32
        && (first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProvisionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.unit_path(), PathBuf::from("/etc/systemd/system/deskthing.service"));
        assert_eq!(config.venv_python(), PathBuf::from("/opt/deskthing/venv/bin/python"));
        assert_eq!(config.source_entrypoint(), PathBuf::from("app/main.py"));
    }

    #[test]
    fn test_invalid_service_user() {
        let mut config = ProvisionConfig::default();
        config.service_user = "Desk Thing".to_string();
        assert!(config.validate().is_err());

        config.service_user = "9lives".to_string();
        assert!(config.validate().is_err());

        config.service_user = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relative_install_root_rejected() {
        let mut config = ProvisionConfig::default();
        config.install_root = PathBuf::from("opt/deskthing");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_entrypoint_must_be_file_name() {
        let mut config = ProvisionConfig::default();
        config.entrypoint = "../main.py".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_environment_key() {
        let mut config = ProvisionConfig::default();
        config.environment.insert("BAD KEY".to_string(), "1".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tty_must_be_virtual_terminal() {
        let mut config = ProvisionConfig::default();
        config.tty = "tty1\nExecStartPre=/bin/rm -rf /".to_string();
        assert!(config.validate().is_err());

        config.tty = "ttyS".to_string();
        assert!(config.validate().is_err());

        config.tty = "tty12".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_control_characters_rejected_in_unit_values() {
        let mut config = ProvisionConfig::default();
        config.app_name = "DeskThing\n[Install]".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Application name"));

        let mut config = ProvisionConfig::default();
        config.kiosk_command.push("--flag\rExecStartPre=/bin/true".to_string());
        assert!(config.validate().is_err());

        let mut config = ProvisionConfig::default();
        config.environment.insert("QT_SCALE".to_string(), "1\nUser=root".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_dir_prefers_working_directory() {
        let cwd = tempfile::tempdir().unwrap();
        let exe = tempfile::tempdir().unwrap();
        fs::create_dir(cwd.path().join("app")).unwrap();

        let mut config = ProvisionConfig::default();
        config.anchor_source_dir(cwd.path(), Some(exe.path()));
        assert_eq!(config.source_dir, cwd.path().join("app"));
    }

    #[test]
    fn test_source_dir_falls_back_to_binary_directory() {
        let cwd = tempfile::tempdir().unwrap();
        let exe = tempfile::tempdir().unwrap();

        let mut config = ProvisionConfig::default();
        config.anchor_source_dir(cwd.path(), Some(exe.path()));
        assert_eq!(config.source_dir, exe.path().join("app"));

        // Absolute paths are left alone
        config.anchor_source_dir(cwd.path(), None);
        assert_eq!(config.source_dir, exe.path().join("app"));
    }

    #[test]
    fn test_partial_file_overlays_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provision.json");
        fs::write(&path, r#"{ "service_user": "kiosk", "restart_sec": 10 }"#).unwrap();

        let config = ProvisionConfig::load_from_file(&path).unwrap();
        assert_eq!(config.service_user, "kiosk");
        assert_eq!(config.restart_sec, 10);
        assert_eq!(config.install_root, PathBuf::from("/opt/deskthing"));
        assert_eq!(config.entrypoint, "main.py");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provision.json");
        let mut config = ProvisionConfig::default();
        config.tty = "tty2".to_string();

        config.save_to_file(&path).unwrap();
        let loaded = ProvisionConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ProvisionConfig::load_from_file("/nonexistent/provision.json").unwrap_err();
        assert!(err.to_string().contains("provision.json"));
    }
}
