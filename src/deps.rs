//! Environment preparation
//!
//! Verifies the external commands the workflow shells out to and installs missing
//! ones through whichever system package manager is present. Installation may need
//! root; if the current user is unprivileged the command is prefixed with sudo.

use crate::error::{Result, UpdockError};
use console::style;
use std::path::Path;
use std::process::Command;

/// Commands the workflow cannot run without.
const REQUIRED_TOOLS: &[&str] = &["docker", "hostname"];

/// Ordered preference list of supported package managers.
const PACKAGE_MANAGERS: &[(&str, &[&str])] = &[
    ("apt-get", &["install", "-y"]),
    ("dnf", &["install", "-y"]),
    ("yum", &["install", "-y"]),
    ("zypper", &["install", "-y"]),
    ("pacman", &["-S", "--noconfirm"]),
    ("apk", &["add"]),
];

/// Ensure every required external command is callable, installing missing ones.
pub fn ensure_tools() -> Result<()> {
    let missing: Vec<&str> = REQUIRED_TOOLS
        .iter()
        .copied()
        .filter(|tool| !command_exists(tool))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let Some((manager, args)) = detect_package_manager() else {
        return Err(UpdockError::NoPackageManager);
    };

    let need_sudo = !is_root();
    if need_sudo && !command_exists("sudo") {
        return Err(UpdockError::PrivilegeRequired {
            name: missing[0].to_string(),
        });
    }

    for tool in missing {
        println!(
            "{} installing '{}' via {}",
            style("Preparing:").yellow().bold(),
            tool,
            manager
        );
        install_tool(tool, manager, args, need_sudo)?;
        if !command_exists(tool) {
            return Err(UpdockError::MissingTool {
                name: tool.to_string(),
            });
        }
    }

    Ok(())
}

fn install_tool(tool: &str, manager: &str, args: &[&str], need_sudo: bool) -> Result<()> {
    // The docker CLI ships under a distribution-specific package name.
    let package = match (tool, manager) {
        ("docker", "apt-get") => "docker.io",
        ("docker", _) => "docker",
        (other, _) => other,
    };

    let mut cmd = if need_sudo {
        let mut c = Command::new("sudo");
        c.arg(manager);
        c
    } else {
        Command::new(manager)
    };
    cmd.args(args).arg(package);

    let status = cmd.status().map_err(|e| UpdockError::IoError {
        message: format!("Failed to run {}: {}", manager, e),
        source: Some(Box::new(e)),
    })?;

    if !status.success() {
        return Err(UpdockError::InstallFailed {
            name: tool.to_string(),
            manager: manager.to_string(),
        });
    }

    Ok(())
}

fn detect_package_manager() -> Option<(&'static str, &'static [&'static str])> {
    PACKAGE_MANAGERS
        .iter()
        .find(|(name, _)| command_exists(name))
        .map(|(name, args)| (*name, *args))
}

fn is_root() -> bool {
    // `id -u` rather than a libc binding keeps this a plain subprocess like the
    // rest of the workflow's host interactions.
    Command::new("id")
        .arg("-u")
        .output()
        .ok()
        .map(|out| String::from_utf8_lossy(&out.stdout).trim() == "0")
        .unwrap_or(false)
}

/// Check whether `name` resolves to an executable file on PATH.
pub fn command_exists(name: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(name)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
