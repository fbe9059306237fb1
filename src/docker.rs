//! Thin wrapper around the `docker` CLI
//!
//! Every host interaction goes through [`Docker::run`], which captures output and
//! turns a non-zero exit into an error so the workflow's strict-abort policy falls
//! out of plain `?` propagation. Stages that tolerate failure call the `try_`
//! variants instead.

use crate::config::{Config, WATCHED_PORTS};
use crate::error::{Result, UpdockError};
use std::process::Command;

/// Handle for issuing container runtime commands.
#[derive(Debug, Default)]
pub struct Docker;

impl Docker {
    pub fn new() -> Self {
        Self
    }

    /// Run `docker <args>`, returning trimmed stdout. Non-zero exit is an error.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("docker")
            .args(args)
            .output()
            .map_err(|e| UpdockError::DockerSpawnFailed {
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(UpdockError::DockerCommandFailed {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// The image identity (config digest) of the running container, or `None`
    /// when the container does not exist or is not running.
    pub fn running_image_digest(&self, name: &str) -> Option<String> {
        let output = self
            .run(&[
                "inspect",
                "--format",
                "{{.State.Running}} {{.Image}}",
                name,
            ])
            .ok()?;

        let (running, digest) = output.split_once(' ')?;
        if running == "true" && !digest.is_empty() {
            Some(digest.to_string())
        } else {
            None
        }
    }

    /// Whether a container (running or stopped) with exactly this name exists.
    pub fn container_exists(&self, name: &str) -> Result<bool> {
        let names = self.run(&[
            "ps",
            "-a",
            "--format",
            "{{.Names}}",
        ])?;
        Ok(names.lines().any(|line| line.trim() == name))
    }

    /// All container names, including stopped ones.
    pub fn all_container_names(&self) -> Result<Vec<String>> {
        let names = self.run(&["ps", "-a", "--format", "{{.Names}}"])?;
        Ok(names.lines().map(|l| l.trim().to_string()).collect())
    }

    /// Running containers as `(name, ports)` pairs, `ports` in docker's
    /// `0.0.0.0:9000->9000/tcp` listing format.
    pub fn running_containers_with_ports(&self) -> Result<Vec<(String, String)>> {
        let listing = self.run(&["ps", "--format", "{{.Names}}\t{{.Ports}}"])?;
        Ok(listing
            .lines()
            .filter_map(|line| {
                let (name, ports) = line.split_once('\t')?;
                Some((name.trim().to_string(), ports.trim().to_string()))
            })
            .collect())
    }

    pub fn pull(&self, image: &str) -> Result<()> {
        self.run(&["pull", image]).map(|_| ())
    }

    pub fn stop(&self, name: &str) -> Result<()> {
        self.run(&["stop", name]).map(|_| ())
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.run(&["rename", from, to]).map(|_| ())
    }

    /// Force-remove a container, ignoring failure and absence (idempotent cleanup).
    pub fn try_remove(&self, name: &str) -> bool {
        self.run(&["rm", "-f", name]).is_ok()
    }

    /// Start a fresh detached instance with the standard port, volume and restart
    /// configuration.
    pub fn run_service(&self, config: &Config) -> Result<()> {
        let port_args: Vec<String> = WATCHED_PORTS
            .iter()
            .map(|p| format!("{p}:{p}"))
            .collect();
        let data_mount = format!("{}:/data", config.volume_name);

        let mut args = vec![
            "run",
            "-d",
            "--name",
            config.container_name.as_str(),
            "--restart=always",
        ];
        for port in &port_args {
            args.push("-p");
            args.push(port.as_str());
        }
        args.push("-v");
        args.push("/var/run/docker.sock:/var/run/docker.sock");
        args.push("-v");
        args.push(data_mount.as_str());
        args.push(config.image.as_str());

        self.run(&args).map(|_| ())
    }

    /// Ask the service binary inside the container for its version output.
    /// Absence of a usable answer is not an error here; the notifier falls back
    /// to "unknown".
    pub fn exec_version(&self, name: &str, binary: &str) -> Option<String> {
        self.run(&["exec", name, binary, "--version"]).ok()
    }
}
