//! Transition execution
//!
//! The ordered replace sequence: pull the new image, retire the current instance
//! into a timestamped backup, clear any leftover holder of the canonical name and
//! start the fresh instance. Strict-abort throughout; the only tolerated surprise
//! is the instance vanishing between the existence check and the rename.
//!
//! There is no automatic rollback: if the start fails after the rename, the run
//! exits non-zero with the backup left in place for manual recovery.

use crate::backup::unique_backup_name;
use crate::config::Config;
use crate::docker::Docker;
use crate::error::Result;
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Replace the running instance with a fresh one from `config.image`.
///
/// Returns the backup name the old instance was parked under, if there was one.
pub fn execute(docker: &Docker, config: &Config) -> Result<Option<String>> {
    pull_with_spinner(docker, &config.image)?;

    let backup = retire_current(docker, config)?;

    // A stopped leftover may still hold the canonical name (e.g. after an
    // earlier aborted run); clearing it is idempotent.
    docker.try_remove(&config.container_name);

    println!(
        "{} starting '{}' from {}",
        style("Starting:").green().bold(),
        config.container_name,
        config.image
    );
    docker.run_service(config)?;

    Ok(backup)
}

/// Stop the canonical instance and rename it to a fresh backup name.
fn retire_current(docker: &Docker, config: &Config) -> Result<Option<String>> {
    let name = &config.container_name;
    if !docker.container_exists(name)? {
        return Ok(None);
    }

    docker.stop(name)?;

    // The instance can disappear here when its restart policy or another actor
    // removes it on stop; that costs us the backup but not the update.
    if !docker.container_exists(name)? {
        eprintln!(
            "{} '{}' vanished while stopping, no backup taken",
            style("Warning:").yellow().bold(),
            name
        );
        return Ok(None);
    }

    let taken = docker.all_container_names()?;
    let backup = unique_backup_name(name, Utc::now(), &taken);
    docker.rename(name, &backup)?;
    println!("Renamed previous instance to '{backup}'");

    Ok(Some(backup))
}

fn pull_with_spinner(docker: &Docker, image: &str) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(format!("Pulling {image}"));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = docker.pull(image);

    if result.is_ok() {
        spinner.finish_with_message(format!("Pulled {image}"));
    } else {
        spinner.finish_and_clear();
    }
    result
}
