//! Configuration file loading
//!
//! Settings live in a newline-delimited `key="value"` file. A template with safe
//! defaults (notifications disabled) is written on first run; the operator edits it
//! between runs, the program itself never mutates it after creation.

use crate::error::{Result, UpdockError};
use std::path::Path;

/// Host ports the service publishes; conflicting containers on these are stopped.
pub const WATCHED_PORTS: [u16; 3] = [8000, 9000, 9443];

/// Immutable per-run configuration, constructed at startup and passed to every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub notify_enabled: bool,
    pub notify_to: String,
    pub notify_from: String,
    pub notify_subject: String,
    /// Scratch file for the mail body; empty means "use a temp file".
    pub mail_body_file: String,
    pub container_name: String,
    pub image: String,
    pub volume_name: String,
    /// How many timestamped backups to retain after a successful update.
    pub backup_keep: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notify_enabled: false,
            notify_to: "root@localhost".to_string(),
            notify_from: "updock@localhost".to_string(),
            notify_subject: "Container update report".to_string(),
            mail_body_file: String::new(),
            container_name: "portainer".to_string(),
            image: "portainer/portainer-ce:latest".to_string(),
            volume_name: "portainer_data".to_string(),
            backup_keep: 2,
        }
    }
}

const TEMPLATE: &str = r#"# Updock configuration
#
# Values are newline-delimited key="value" assignments. Unknown keys are ignored.

# Send a plain-text report after each completed update.
notify_enabled="false"
notify_to="root@localhost"
notify_from="updock@localhost"
notify_subject="Container update report"
# Scratch file for the mail body; leave empty to use a temporary file.
mail_body_file=""

# The managed service instance.
container_name="portainer"
image="portainer/portainer-ce:latest"
volume_name="portainer_data"

# How many timestamped backup containers to keep.
backup_keep="2"
"#;

impl Config {
    /// Load configuration from `path`, writing the default template first if the
    /// file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            std::fs::write(path, TEMPLATE).map_err(|e| UpdockError::ConfigWriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            println!(
                "Created default configuration at {} (notifications disabled)",
                path.display()
            );
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| UpdockError::ConfigReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Self::parse(&content, &path.display().to_string())
    }

    /// Parse `key="value"` assignments. Comments and blank lines are skipped,
    /// unknown keys are ignored, anything else is a parse error.
    fn parse(content: &str, path: &str) -> Result<Self> {
        let mut config = Config::default();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(UpdockError::ConfigParseFailed {
                    path: path.to_string(),
                    line: idx + 1,
                    text: line.to_string(),
                });
            };

            let key = key.trim();
            let value = unquote(value.trim());

            match key {
                "notify_enabled" => config.notify_enabled = parse_bool(value),
                "notify_to" => config.notify_to = value.to_string(),
                "notify_from" => config.notify_from = value.to_string(),
                "notify_subject" => config.notify_subject = value.to_string(),
                "mail_body_file" => config.mail_body_file = value.to_string(),
                "container_name" => config.container_name = value.to_string(),
                "image" => config.image = value.to_string(),
                "volume_name" => config.volume_name = value.to_string(),
                "backup_keep" => {
                    config.backup_keep =
                        value
                            .parse()
                            .map_err(|_| UpdockError::ConfigParseFailed {
                                path: path.to_string(),
                                line: idx + 1,
                                text: line.to_string(),
                            })?;
                }
                // Operators may keep extra variables in the same file.
                _ => {}
            }
        }

        Ok(config)
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "1"
    )
}
