//! Update notification
//!
//! Composes a plain-text report (host, container, new version, timestamp) and
//! hands it to whichever mail tool is installed, preferring `mailx` and falling
//! back to `sendmail -t`. A run that updated successfully is never failed by the
//! notifier: delivery problems and a missing mail tool are printed warnings.

use crate::config::Config;
use crate::deps::command_exists;
use crate::docker::Docker;
use crate::error::{Result, UpdockError};
use chrono::{DateTime, Utc};
use console::style;
use regex::Regex;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Send the update report if notifications are enabled.
pub fn send_report(docker: &Docker, config: &Config) -> Result<()> {
    if !config.notify_enabled {
        return Ok(());
    }

    let version = query_service_version(docker, config);
    let body = compose_body(
        &host_name(),
        &config.container_name,
        &version,
        Utc::now(),
    );

    let scratch = ScratchFile::create(&config.mail_body_file, &body)?;

    let delivered = if command_exists("mailx") {
        send_mailx(config, scratch.path())
    } else if command_exists("sendmail") {
        send_sendmail(config, scratch.path(), &body)
    } else {
        eprintln!(
            "{} no mail tool found (tried mailx, sendmail), skipping notification",
            style("Warning:").yellow().bold()
        );
        return Ok(());
    };

    match delivered {
        Ok(()) => println!("Notification sent to {}", config.notify_to),
        Err(e) => eprintln!(
            "{} notification delivery failed: {}",
            style("Warning:").yellow().bold(),
            e
        ),
    }

    Ok(())
}

/// Ask the running instance for its version and extract a semver-like substring,
/// falling back to "unknown".
fn query_service_version(docker: &Docker, config: &Config) -> String {
    let binary = format!("/{}", config.container_name);
    docker
        .exec_version(&config.container_name, &binary)
        .as_deref()
        .and_then(extract_version)
        .unwrap_or_else(|| "unknown".to_string())
}

/// First `digits.digits[.digits]` match in the tool's version output.
pub fn extract_version(output: &str) -> Option<String> {
    let pattern = Regex::new(r"\d+\.\d+(?:\.\d+)?").ok()?;
    pattern.find(output).map(|m| m.as_str().to_string())
}

/// Fixed plain-text report template.
pub fn compose_body(
    host: &str,
    container: &str,
    version: &str,
    time: DateTime<Utc>,
) -> String {
    format!(
        "Container update report\n\
         \n\
         Host:      {host}\n\
         Container: {container}\n\
         Version:   {version}\n\
         Updated:   {}\n",
        time.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn host_name() -> String {
    Command::new("hostname")
        .output()
        .ok()
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown-host".to_string())
}

fn send_mailx(config: &Config, body_path: &Path) -> Result<()> {
    let stdin = File::open(body_path).map_err(|e| UpdockError::IoError {
        message: format!("Failed to open mail body: {e}"),
        source: Some(Box::new(e)),
    })?;

    run_mail_tool(
        Command::new("mailx")
            .arg("-s")
            .arg(&config.notify_subject)
            .arg("-r")
            .arg(&config.notify_from)
            .arg(&config.notify_to)
            .stdin(Stdio::from(stdin)),
        "mailx",
    )
}

fn send_sendmail(config: &Config, body_path: &Path, body: &str) -> Result<()> {
    // sendmail -t reads the envelope from the message itself.
    let message = format!(
        "To: {}\nFrom: {}\nSubject: {}\n\n{body}",
        config.notify_to, config.notify_from, config.notify_subject
    );
    std::fs::write(body_path, &message).map_err(|e| UpdockError::MailBodyWriteFailed {
        path: body_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let stdin = File::open(body_path).map_err(|e| UpdockError::IoError {
        message: format!("Failed to open mail body: {e}"),
        source: Some(Box::new(e)),
    })?;

    run_mail_tool(Command::new("sendmail").arg("-t").stdin(Stdio::from(stdin)), "sendmail")
}

fn run_mail_tool(command: &mut Command, tool: &str) -> Result<()> {
    let status = command.status().map_err(|e| UpdockError::IoError {
        message: format!("Failed to run {tool}: {e}"),
        source: Some(Box::new(e)),
    })?;

    if !status.success() {
        return Err(UpdockError::IoError {
            message: format!("{tool} exited with {status}"),
            source: None,
        });
    }
    Ok(())
}

/// Mail body scratch file, removed on drop regardless of send outcome. Uses the
/// configured path when set, a temp file otherwise.
enum ScratchFile {
    Configured(PathBuf),
    Temp(tempfile::NamedTempFile),
}

impl ScratchFile {
    fn create(configured: &str, body: &str) -> Result<Self> {
        if configured.is_empty() {
            let file = tempfile::NamedTempFile::new().map_err(|e| {
                UpdockError::MailBodyWriteFailed {
                    path: "<tempfile>".to_string(),
                    reason: e.to_string(),
                }
            })?;
            std::fs::write(file.path(), body).map_err(|e| UpdockError::MailBodyWriteFailed {
                path: file.path().display().to_string(),
                reason: e.to_string(),
            })?;
            Ok(Self::Temp(file))
        } else {
            let path = PathBuf::from(configured);
            std::fs::write(&path, body).map_err(|e| UpdockError::MailBodyWriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            Ok(Self::Configured(path))
        }
    }

    fn path(&self) -> &Path {
        match self {
            Self::Configured(path) => path,
            Self::Temp(file) => file.path(),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Self::Configured(path) = self {
            let _ = std::fs::remove_file(path);
        }
        // NamedTempFile removes itself.
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extract_version_from_typical_output() {
        assert_eq!(extract_version("2.19.4").as_deref(), Some("2.19.4"));
        assert_eq!(
            extract_version("portainer version 2.19.4\n").as_deref(),
            Some("2.19.4")
        );
        assert_eq!(extract_version("v1.2").as_deref(), Some("1.2"));
    }

    #[test]
    fn test_extract_version_no_match() {
        assert_eq!(extract_version(""), None);
        assert_eq!(extract_version("no digits here"), None);
    }

    #[test]
    fn test_compose_body_contains_all_fields() {
        let time = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
        let body = compose_body("myhost", "portainer", "2.19.4", time);
        assert!(body.contains("Host:      myhost"));
        assert!(body.contains("Container: portainer"));
        assert!(body.contains("Version:   2.19.4"));
        assert!(body.contains("2026-08-23 12:00:00 UTC"));
    }

    #[test]
    fn test_compose_body_unknown_version() {
        // When version extraction finds nothing the body still renders and the
        // mail is still sent with "unknown".
        let time = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
        let body = compose_body("myhost", "portainer", "unknown", time);
        assert!(body.contains("Version:   unknown"));
    }

    #[test]
    fn test_scratch_file_configured_path_removed_on_drop() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("mail_body.txt");
        let path_str = path.display().to_string();

        {
            let scratch = ScratchFile::create(&path_str, "hello").expect("create");
            assert_eq!(std::fs::read_to_string(scratch.path()).unwrap(), "hello");
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_file_temp_when_unconfigured() {
        let removed_path;
        {
            let scratch = ScratchFile::create("", "hello").expect("create");
            removed_path = scratch.path().to_path_buf();
            assert_eq!(std::fs::read_to_string(&removed_path).unwrap(), "hello");
        }
        assert!(!removed_path.exists());
    }
}
