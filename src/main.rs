//! Updock - single-service container updater
//!
//! Checks a Docker Hub repository for a newer image digest than the one the named
//! container is running, and if so replaces the container in place: the old
//! instance is kept as a timestamped backup, stale backups are pruned and an
//! optional plain-text report is mailed to the operator.

use clap::Parser;

mod backup;
mod cli;
mod config;
mod decision;
mod deps;
mod docker;
mod error;
mod notify;
mod ports;
mod registry;
mod transition;
mod workflow;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = workflow::run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
