//! Environment context for better command generation.
//!
//! Collects information about the user's environment so the model can pick
//! commands that fit the OS, shell and working directory.

use std::path::PathBuf;

/// Snapshot of the user's environment, gathered once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Current working directory.
    pub cwd: PathBuf,
    /// User's shell (from $SHELL).
    pub shell: String,
    /// Operating system info (uname -a output).
    pub os: String,
    /// Linux distribution or macOS version.
    pub distro: Option<String>,
}

/// Gather system context for the model.
pub fn gather_context() -> Context {
    Context {
        cwd: get_cwd(),
        shell: get_shell(),
        os: get_os_info(),
        distro: get_distro_info(),
    }
}

fn get_cwd() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn get_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

fn get_os_info() -> String {
    #[cfg(unix)]
    {
        use std::process::Command;
        if let Ok(output) = Command::new("uname").arg("-a").output() {
            if output.status.success() {
                let info = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !info.is_empty() {
                    return info;
                }
            }
        }
    }

    format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
}

fn get_distro_info() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        if let Ok(contents) = std::fs::read_to_string("/etc/os-release") {
            return parse_os_release(&contents);
        }
    }

    #[cfg(target_os = "macos")]
    {
        use std::process::Command;
        if let Ok(output) = Command::new("sw_vers").arg("-productVersion").output() {
            if output.status.success() {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                return Some(format!("macOS {}", version));
            }
        }
    }

    None
}

/// Extract `PRETTY_NAME` from an os-release file.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_os_release(contents: &str) -> Option<String> {
    contents
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
