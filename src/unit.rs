//! systemd unit generation for the kiosk service.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::ProvisionConfig;

/// Template parameters for the kiosk unit file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUnitSpec {
    pub description: String,
    /// Working directory; the application keeps its settings file here
    pub install_dir: PathBuf,
    pub user: String,
    /// Interpreter that runs the entrypoint
    pub executable: PathBuf,
    pub entrypoint: PathBuf,
    /// Compositor command prefix (e.g. `cage -s --`)
    pub kiosk_command: Vec<String>,
    pub environment: BTreeMap<String, String>,
    /// Virtual terminal name without `/dev/` (e.g. `tty1`)
    pub tty: String,
    pub restart_sec: u32,
}

impl ServiceUnitSpec {
    pub fn from_config(config: &ProvisionConfig) -> Self {
        Self {
            description: format!("{} kiosk client", config.app_name),
            install_dir: config.install_root.clone(),
            user: config.service_user.clone(),
            executable: config.venv_python(),
            entrypoint: config.install_root.join(&config.entrypoint),
            kiosk_command: config.kiosk_command.clone(),
            environment: config.environment.clone(),
            tty: config.tty.clone(),
            restart_sec: config.restart_sec,
        }
    }

    /// Full `ExecStart=` command line
    pub fn exec_start(&self) -> String {
        self.kiosk_command
            .iter()
            .map(String::as_str)
            .chain([
                self.executable.to_str().unwrap_or_default(),
                self.entrypoint.to_str().unwrap_or_default(),
            ])
            .map(quote_word)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render the unit file. Equal inputs give byte-identical output, which
    /// is what lets a re-run detect an up-to-date unit.
    pub fn render(&self) -> String {
        let getty = format!("getty@{}.service", self.tty);

        let mut lines = vec![
            "[Unit]".to_string(),
            format!("Description={}", escape_specifiers(&self.description)),
            format!(
                "After=systemd-user-sessions.service plymouth-quit-wait.service network-online.target {}",
                getty
            ),
            "Wants=network-online.target".to_string(),
            format!("Conflicts={}", getty),
            String::new(),
            "[Service]".to_string(),
            "Type=simple".to_string(),
            format!("User={}", self.user),
            format!(
                "WorkingDirectory={}",
                escape_specifiers(&self.install_dir.display().to_string())
            ),
            "PAMName=login".to_string(),
            format!("TTYPath=/dev/{}", self.tty),
            "TTYReset=yes".to_string(),
            "TTYVHangup=yes".to_string(),
            "TTYVTDisallocate=yes".to_string(),
            "StandardInput=tty-fail".to_string(),
        ];
        lines.extend(
            self.environment
                .iter()
                .map(|(key, value)| format!("Environment={}", quoted(&format!("{}={}", key, value)))),
        );
        lines.extend([
            format!("ExecStart={}", self.exec_start()),
            "Restart=always".to_string(),
            format!("RestartSec={}", self.restart_sec),
            String::new(),
            "[Install]".to_string(),
            "WantedBy=graphical.target".to_string(),
        ]);

        let mut unit = lines.join("\n");
        unit.push('\n');
        unit
    }
}

/// Double `%` so systemd does not read it as a specifier
fn escape_specifiers(value: &str) -> String {
    value.replace('%', "%%")
}

/// Double-quote a value, escaping what systemd would otherwise interpret
fn quoted(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escape_specifiers(&escaped))
}

/// Quote a command-line word only when systemd would split or expand it
fn quote_word(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@+,".contains(c));
    if plain { word.to_string() } else { quoted(word) }
}
