//! Port conflict resolution
//!
//! Before starting the new instance, any other running container publishing one of
//! the service's host ports is stopped. A stop failure aborts the run (strict-abort
//! policy; conflicts are unexpected state, not routine cleanup).

use crate::config::{Config, WATCHED_PORTS};
use crate::docker::Docker;
use crate::error::Result;
use console::style;

/// Stop every running container that occupies a watched host port, except the
/// canonical service instance itself.
pub fn stop_conflicting(docker: &Docker, config: &Config) -> Result<()> {
    let running = docker.running_containers_with_ports()?;
    let conflicts = find_conflicts(&running, &config.container_name);

    for name in conflicts {
        println!(
            "{} stopping container '{}' (occupies a service port)",
            style("Conflict:").yellow().bold(),
            name
        );
        docker.stop(&name)?;
    }

    Ok(())
}

/// Names of containers publishing any watched host port, excluding the canonical
/// name. `listing` holds `(name, ports)` rows in docker's `ps` port format, e.g.
/// `0.0.0.0:9000->9000/tcp, :::9000->9000/tcp`.
fn find_conflicts(listing: &[(String, String)], canonical: &str) -> Vec<String> {
    listing
        .iter()
        .filter(|(name, ports)| name != canonical && publishes_watched_port(ports))
        .map(|(name, _)| name.clone())
        .collect()
}

fn publishes_watched_port(ports: &str) -> bool {
    WATCHED_PORTS
        .iter()
        .any(|port| ports.contains(&format!(":{port}->")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, ports: &str) -> (String, String) {
        (name.to_string(), ports.to_string())
    }

    #[test]
    fn test_finds_containers_on_watched_ports() {
        let listing = vec![
            row("web", "0.0.0.0:9000->9000/tcp, :::9000->9000/tcp"),
            row("db", "5432/tcp"),
            row("proxy", "0.0.0.0:9443->9443/tcp"),
        ];
        let conflicts = find_conflicts(&listing, "portainer");
        assert_eq!(conflicts, vec!["web", "proxy"]);
    }

    #[test]
    fn test_never_targets_canonical_instance() {
        let listing = vec![
            row("portainer", "0.0.0.0:8000->8000/tcp, 0.0.0.0:9000->9000/tcp"),
            row("other", "0.0.0.0:8000->8000/tcp"),
        ];
        let conflicts = find_conflicts(&listing, "portainer");
        assert_eq!(conflicts, vec!["other"]);
    }

    #[test]
    fn test_unpublished_and_unrelated_ports_ignored() {
        let listing = vec![
            row("a", "0.0.0.0:8080->8080/tcp"),
            // Container port 9000 is not a host publication of 9000.
            row("b", "0.0.0.0:19000->9000/tcp"),
            row("c", ""),
        ];
        assert!(find_conflicts(&listing, "portainer").is_empty());
    }

    #[test]
    fn test_empty_listing() {
        assert!(find_conflicts(&[], "portainer").is_empty());
    }
}
