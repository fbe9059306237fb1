//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;

/// Updock - single-service container updater
///
/// Checks the registry for a newer image, replaces the running container while
/// keeping a timestamped backup, prunes old backups and optionally mails a report.
#[derive(Parser, Debug)]
#[command(
    name = "updock",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Safe in-place updater for a single long-running Docker service",
    long_about = "Updock automates the update cycle of one named Docker container: it compares \
                  the registry's published image digest against the running instance, and when \
                  they differ it pulls the new image, renames the old container to a timestamped \
                  backup, starts a fresh instance and prunes stale backups.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  updock                        \x1b[90m# Update if the registry digest changed\x1b[0m\n   \
                  updock --force                \x1b[90m# Update even if digests match\x1b[0m\n   \
                  updock --config /etc/updock.conf\n\n\
                  "
)]
pub struct Cli {
    /// Proceed with the update even when the remote digest matches the running instance
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Configuration file path (created with defaults on first run)
    #[arg(long, short = 'c', env = "UPDOCK_CONFIG", default_value = "updock.conf")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::parse_from(["updock"]);
        assert!(!cli.force);
        assert_eq!(cli.config, PathBuf::from("updock.conf"));
    }

    #[test]
    fn test_cli_parsing_force() {
        let cli = Cli::parse_from(["updock", "--force"]);
        assert!(cli.force);

        let cli = Cli::parse_from(["updock", "-f"]);
        assert!(cli.force);
    }

    #[test]
    fn test_cli_parsing_config_path() {
        let cli = Cli::parse_from(["updock", "--config", "/etc/updock.conf"]);
        assert_eq!(cli.config, PathBuf::from("/etc/updock.conf"));
    }
}
