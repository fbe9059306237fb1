//! Error types and handling for Updock
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Updock operations
#[derive(Error, Diagnostic, Debug)]
pub enum UpdockError {
    // Environment errors
    #[error("Required command not found: {name}")]
    #[diagnostic(
        code(updock::deps::missing_tool),
        help("Install '{name}' manually or re-run with a supported package manager available")
    )]
    MissingTool { name: String },

    #[error("No supported package manager found")]
    #[diagnostic(
        code(updock::deps::no_package_manager),
        help("Supported: apt-get, dnf, yum, zypper, pacman, apk")
    )]
    NoPackageManager,

    #[error("Root privileges required to install '{name}' but sudo is not available")]
    #[diagnostic(
        code(updock::deps::privilege_required),
        help("Re-run as root, or install sudo")
    )]
    PrivilegeRequired { name: String },

    #[error("Failed to install '{name}' via {manager}")]
    #[diagnostic(code(updock::deps::install_failed))]
    InstallFailed { name: String, manager: String },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(updock::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to write configuration file: {path}")]
    #[diagnostic(code(updock::config::write_failed))]
    ConfigWriteFailed { path: String, reason: String },

    #[error("Malformed configuration at {path}:{line}: {text}")]
    #[diagnostic(
        code(updock::config::parse_failed),
        help("Expected newline-delimited key=\"value\" assignments")
    )]
    ConfigParseFailed {
        path: String,
        line: usize,
        text: String,
    },

    // Registry errors
    #[error("Registry request failed: {url}")]
    #[diagnostic(
        code(updock::registry::request_failed),
        help("Check network connectivity and that the image repository exists")
    )]
    RegistryRequestFailed { url: String, reason: String },

    #[error("Registry returned HTTP {status} for {url}")]
    #[diagnostic(code(updock::registry::http_status))]
    RegistryHttpStatus { url: String, status: u16 },

    // Container runtime errors
    #[error("Docker command failed: docker {args}")]
    #[diagnostic(code(updock::docker::command_failed))]
    DockerCommandFailed { args: String, stderr: String },

    #[error("Failed to invoke docker: {reason}")]
    #[diagnostic(
        code(updock::docker::spawn_failed),
        help("Check that the docker daemon is running and accessible")
    )]
    DockerSpawnFailed { reason: String },

    // Notification errors
    #[error("Failed to write mail body file: {path}")]
    #[diagnostic(code(updock::notify::body_write_failed))]
    MailBodyWriteFailed { path: String, reason: String },

    // Generic I/O wrapper
    #[error("I/O error: {message}")]
    #[diagnostic(code(updock::io::error))]
    IoError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for Updock operations
pub type Result<T> = std::result::Result<T, UpdockError>;
