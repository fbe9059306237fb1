//! Backup naming and pruning
//!
//! A replaced instance is renamed to `<name>_backup_<YYYYMMDD_HHMMSS>` (UTC).
//! Pruning parses the embedded timestamp into a comparable value instead of
//! relying on lexicographic order, keeps the newest `backup_keep` and removes the
//! rest. Removal failures are logged and swallowed so one stuck backup cannot
//! abort cleanup.

use crate::config::Config;
use crate::docker::Docker;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use console::style;

const BACKUP_INFIX: &str = "_backup_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A parsed backup container name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupName {
    pub name: String,
    pub created: NaiveDateTime,
}

/// Format a backup name for `base` at `time`.
pub fn backup_name(base: &str, time: DateTime<Utc>) -> String {
    format!("{base}{BACKUP_INFIX}{}", time.format(TIMESTAMP_FORMAT))
}

/// Pick a backup name not present in `taken`, bumping the timestamp forward one
/// second at a time. Two transitions within the same second therefore never
/// collide.
pub fn unique_backup_name(base: &str, time: DateTime<Utc>, taken: &[String]) -> String {
    let mut time = time;
    loop {
        let candidate = backup_name(base, time);
        if !taken.iter().any(|t| t == &candidate) {
            return candidate;
        }
        time += Duration::seconds(1);
    }
}

/// Parse `name` as a backup of `base`; non-backup names and names whose suffix is
/// not a valid timestamp yield `None`. The canonical name itself never parses.
pub fn parse_backup_name(base: &str, name: &str) -> Option<BackupName> {
    let suffix = name.strip_prefix(base)?.strip_prefix(BACKUP_INFIX)?;
    let created = NaiveDateTime::parse_from_str(suffix, TIMESTAMP_FORMAT).ok()?;
    Some(BackupName {
        name: name.to_string(),
        created,
    })
}

/// Select which backups to remove: everything past the `keep` most recent.
pub fn select_prunable(base: &str, names: &[String], keep: usize) -> Vec<String> {
    let mut backups: Vec<BackupName> = names
        .iter()
        .filter_map(|name| parse_backup_name(base, name))
        .collect();
    backups.sort_by(|a, b| b.created.cmp(&a.created));
    backups.into_iter().skip(keep).map(|b| b.name).collect()
}

/// Remove all but the most recent `backup_keep` backups of the canonical instance.
pub fn prune(docker: &Docker, config: &Config) -> crate::error::Result<()> {
    let names = docker.all_container_names()?;
    let prunable = select_prunable(&config.container_name, &names, config.backup_keep);

    for name in prunable {
        if docker.try_remove(&name) {
            println!("Removed old backup '{name}'");
        } else {
            eprintln!(
                "{} could not remove backup '{}', leaving it in place",
                style("Warning:").yellow().bold(),
                name
            );
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_backup_name_format() {
        let name = backup_name("portainer", at(2026, 8, 23, 14, 5, 9));
        assert_eq!(name, "portainer_backup_20260823_140509");
    }

    #[test]
    fn test_unique_name_bumps_within_same_second() {
        let time = at(2026, 8, 23, 14, 5, 9);
        let taken = vec!["portainer_backup_20260823_140509".to_string()];
        let name = unique_backup_name("portainer", time, &taken);
        assert_eq!(name, "portainer_backup_20260823_140510");

        // And keeps bumping until free.
        let taken = vec![
            "portainer_backup_20260823_140509".to_string(),
            "portainer_backup_20260823_140510".to_string(),
        ];
        let name = unique_backup_name("portainer", time, &taken);
        assert_eq!(name, "portainer_backup_20260823_140511");
    }

    #[test]
    fn test_parse_rejects_canonical_and_foreign_names() {
        assert!(parse_backup_name("portainer", "portainer").is_none());
        assert!(parse_backup_name("portainer", "other_backup_20260823_140509").is_none());
        assert!(parse_backup_name("portainer", "portainer_backup_notadate").is_none());
    }

    #[test]
    fn test_parse_roundtrip() {
        let time = at(2025, 1, 2, 3, 4, 5);
        let name = backup_name("svc", time);
        let parsed = parse_backup_name("svc", &name).expect("should parse");
        assert_eq!(parsed.created, time.naive_utc());
    }

    #[test]
    fn test_prune_keeps_two_newest_of_five() {
        let names: Vec<String> = (1..=5)
            .map(|d| format!("portainer_backup_2026082{d}_120000"))
            .collect();
        let prunable = select_prunable("portainer", &names, 2);
        assert_eq!(
            prunable,
            vec![
                "portainer_backup_20260823_120000",
                "portainer_backup_20260822_120000",
                "portainer_backup_20260821_120000",
            ]
        );
    }

    #[test]
    fn test_prune_with_fewer_backups_than_keep() {
        let names = vec!["portainer_backup_20260823_120000".to_string()];
        assert!(select_prunable("portainer", &names, 2).is_empty());
        assert!(select_prunable("portainer", &[], 2).is_empty());
    }

    #[test]
    fn test_prune_ignores_running_instance_and_strangers() {
        let names = vec![
            "portainer".to_string(),
            "nginx".to_string(),
            "portainer_backup_20260820_120000".to_string(),
            "portainer_backup_20260821_120000".to_string(),
            "portainer_backup_20260822_120000".to_string(),
        ];
        let prunable = select_prunable("portainer", &names, 2);
        assert_eq!(prunable, vec!["portainer_backup_20260820_120000"]);
    }

    #[test]
    fn test_prune_keep_zero_removes_all() {
        let names = vec![
            "svc_backup_20260822_120000".to_string(),
            "svc_backup_20260823_120000".to_string(),
        ];
        let prunable = select_prunable("svc", &names, 0);
        assert_eq!(prunable.len(), 2);
        // Newest first.
        assert_eq!(prunable[0], "svc_backup_20260823_120000");
    }
}
