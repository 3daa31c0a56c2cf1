//! Host platform detection.
//!
//! Identifies the OS family from `/etc/os-release` and maps it onto a closed
//! set of variants, each with a capability table describing how packages are
//! installed. Unsupported hosts carry no capabilities; the provisioner then
//! leaves dependency management to the operator.

use std::fmt;

/// Path of the os-release file consulted for detection.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Packages required on the host for the kiosk session and the Python runtime.
pub const DEPENDENCIES: &[&str] = &[
    "python3",
    "python3-venv",
    "python3-pip",
    "cage",             // Wayland kiosk compositor
    "xterm",            // Recovery terminal launched from the client
    "fonts-dejavu-core",
    "libgl1",
    "libegl1",
    "libxkbcommon0",
    "libnss3",          // QtWebEngine
    "libasound2",
];

/// Supported OS families, plus a catch-all for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Raspberry Pi OS (legacy `raspbian` ID)
    Raspbian,
    /// Debian and Debian derivatives matched through `ID_LIKE`
    Debian,
    Ubuntu,
    /// Anything else, with its os-release `ID` (or "unknown")
    Unsupported(String),
}

/// How to drive the package manager on a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCaps {
    /// Package manager binary
    pub package_manager: &'static str,
    /// Environment needed to keep the package manager non-interactive
    pub env: &'static [(&'static str, &'static str)],
    /// Packages to install
    pub packages: &'static [&'static str],
}

const APT_CAPS: PlatformCaps = PlatformCaps {
    package_manager: "apt-get",
    env: &[("DEBIAN_FRONTEND", "noninteractive")],
    packages: DEPENDENCIES,
};

impl Platform {
    /// Classify the contents of an os-release file.
    pub fn from_os_release(contents: &str) -> Self {
        let id = os_release_field(contents, "ID").unwrap_or_default();
        let id_like = os_release_field(contents, "ID_LIKE").unwrap_or_default();

        match id.as_str() {
            "raspbian" => Self::Raspbian,
            "debian" => Self::Debian,
            "ubuntu" => Self::Ubuntu,
            _ if id_like.split_whitespace().any(|like| like == "debian") => Self::Debian,
            "" => Self::Unsupported("unknown".to_string()),
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Capability table, or `None` when the host is unsupported.
    pub fn capabilities(&self) -> Option<&'static PlatformCaps> {
        match self {
            Self::Raspbian | Self::Debian | Self::Ubuntu => Some(&APT_CAPS),
            Self::Unsupported(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.capabilities().is_some()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raspbian => write!(f, "Raspberry Pi OS"),
            Self::Debian => write!(f, "Debian"),
            Self::Ubuntu => write!(f, "Ubuntu"),
            Self::Unsupported(id) => write!(f, "unsupported ({})", id),
        }
    }
}

/// Extract a `KEY=value` field, stripping optional quotes.
fn os_release_field(contents: &str, key: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        if k != key {
            return None;
        }
        Some(v.trim().trim_matches('"').trim_matches('\'').to_lowercase())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RASPBIAN: &str = r#"PRETTY_NAME="Raspbian GNU/Linux 11 (bullseye)"
NAME="Raspbian GNU/Linux"
VERSION_ID="11"
ID=raspbian
ID_LIKE=debian
"#;

    const BOOKWORM: &str = r#"PRETTY_NAME="Debian GNU/Linux 12 (bookworm)"
ID=debian
"#;

    #[test]
    fn test_detects_raspbian() {
        assert_eq!(Platform::from_os_release(RASPBIAN), Platform::Raspbian);
    }

    #[test]
    fn test_detects_debian() {
        assert_eq!(Platform::from_os_release(BOOKWORM), Platform::Debian);
    }

    #[test]
    fn test_detects_debian_derivative_through_id_like() {
        let mint = "ID=linuxmint\nID_LIKE=\"ubuntu debian\"\n";
        assert_eq!(Platform::from_os_release(mint), Platform::Debian);
    }

    #[test]
    fn test_unsupported_platform() {
        let arch = "NAME=\"Arch Linux\"\nID=arch\n";
        let platform = Platform::from_os_release(arch);
        assert_eq!(platform, Platform::Unsupported("arch".to_string()));
        assert!(!platform.is_supported());
        assert!(platform.capabilities().is_none());
    }

    #[test]
    fn test_empty_os_release_is_unknown() {
        assert_eq!(
            Platform::from_os_release(""),
            Platform::Unsupported("unknown".to_string())
        );
    }

    #[test]
    fn test_id_like_substring_is_not_debian() {
        // "debian-ish" is not a word match
        let odd = "ID=odd\nID_LIKE=debianish\n";
        assert!(!Platform::from_os_release(odd).is_supported());
    }

    #[test]
    fn test_apt_capabilities() {
        let caps = Platform::Raspbian.capabilities().unwrap();
        assert_eq!(caps.package_manager, "apt-get");
        assert!(caps.packages.contains(&"cage"));
        assert!(caps.packages.contains(&"python3-venv"));
        assert!(caps.env.contains(&("DEBIAN_FRONTEND", "noninteractive")));
    }
}
