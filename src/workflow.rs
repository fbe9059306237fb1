//! The update workflow
//!
//! Strictly sequential, non-resumable: prepare environment, load configuration,
//! resolve the remote digest, decide, then stop conflicting containers, run the
//! transition, prune backups and notify. Each stage propagates failure with `?`;
//! the soft stages (prune removals, notification delivery) warn instead.

use crate::cli::Cli;
use crate::config::Config;
use crate::decision::{Decision, decide};
use crate::docker::Docker;
use crate::error::Result;
use crate::registry::{ImageRef, RegistryClient};
use crate::{backup, deps, notify, ports, transition};
use console::style;

/// Outcome of a completed run, for the final status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    AlreadyUpToDate,
}

/// Run the whole update cycle. Both outcomes are a success exit.
pub fn run(cli: &Cli) -> Result<Outcome> {
    deps::ensure_tools()?;
    let config = Config::load_or_create(&cli.config)?;
    let docker = Docker::new();

    let image = ImageRef::parse(&config.image);
    let remote = RegistryClient::new()?.resolve_config_digest(&image)?;
    let local = docker.running_image_digest(&config.container_name);

    match decide(remote.as_deref(), local.as_deref(), cli.force) {
        Decision::Skip => {
            println!(
                "{} '{}' is already up to date ({})",
                style("Up to date:").green().bold(),
                config.container_name,
                remote.as_deref().unwrap_or("unknown digest")
            );
            return Ok(Outcome::AlreadyUpToDate);
        }
        Decision::Proceed => {
            if cli.force {
                println!("Forced update of '{}'", config.container_name);
            } else {
                println!(
                    "Update available for '{}' ({} -> {})",
                    config.container_name,
                    local.as_deref().unwrap_or("none"),
                    remote.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    ports::stop_conflicting(&docker, &config)?;
    transition::execute(&docker, &config)?;
    backup::prune(&docker, &config)?;
    notify::send_report(&docker, &config)?;

    println!(
        "{} '{}' is now running {}",
        style("Done:").green().bold(),
        config.container_name,
        config.image
    );
    Ok(Outcome::Updated)
}
