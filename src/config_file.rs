//! Defaults-file handling for the jobscript generator.
//!
//! A small JSON file can pin the submission defaults (account, queue,
//! walltime, tasks per node) for a site, so batch runs do not repeat the
//! same flags on every invocation. Command-line flags always win over the
//! file; the file wins over the built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Submission defaults loadable from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobscriptDefaults {
    pub account: Option<String>,
    pub queue: Option<String>,
    pub walltime: Option<String>,
    pub tasks_per_node: Option<u32>,
}

impl JobscriptDefaults {
    /// Load defaults from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read defaults file: {}", path.display()))?;
        let defaults: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse defaults file: {}", path.display()))?;
        defaults.validate()?;
        Ok(defaults)
    }

    /// Validate the loaded values
    pub fn validate(&self) -> Result<()> {
        if let Some(walltime) = &self.walltime {
            // Scheduler wallclock format is HH:MM:SS.
            let ok = walltime.split(':').count() == 3
                && walltime
                    .split(':')
                    .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
            if !ok {
                anyhow::bail!("walltime '{walltime}' is not in HH:MM:SS form");
            }
        }
        if let Some(tpn) = self.tasks_per_node {
            if tpn == 0 {
                anyhow::bail!("tasks_per_node must be nonzero");
            }
        }
        if let Some(account) = &self.account {
            if account.trim().is_empty() {
                anyhow::bail!("account must not be empty");
            }
        }
        if let Some(queue) = &self.queue {
            if queue.trim().is_empty() {
                anyhow::bail!("queue must not be empty");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"account": "P93300606", "queue": "main", "tasks_per_node": 36}}"#
        )
        .unwrap();

        let defaults = JobscriptDefaults::load_from_file(file.path()).unwrap();
        assert_eq!(defaults.account.as_deref(), Some("P93300606"));
        assert_eq!(defaults.queue.as_deref(), Some("main"));
        assert_eq!(defaults.walltime, None);
        assert_eq!(defaults.tasks_per_node, Some(36));
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let defaults: JobscriptDefaults = serde_json::from_str("{}").unwrap();
        assert!(defaults.account.is_none());
        assert!(defaults.validate().is_ok());
    }

    #[test]
    fn test_bad_walltime_rejected() {
        let defaults = JobscriptDefaults {
            walltime: Some("12h".into()),
            ..Default::default()
        };
        let err = defaults.validate().unwrap_err();
        assert!(err.to_string().contains("HH:MM:SS"));
    }

    #[test]
    fn test_zero_tasks_per_node_rejected() {
        let defaults = JobscriptDefaults {
            tasks_per_node: Some(0),
            ..Default::default()
        };
        assert!(defaults.validate().is_err());
    }
}
