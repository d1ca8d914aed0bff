//! Repository metadata for the emitted document
//!
//! Derives the `source` block from local git state via subprocess calls,
//! with caller overrides taking precedence field by field. Every lookup is
//! optional: a scan of a plain directory still produces a document, with
//! null repository/commit and the scan time as timestamp.

use std::path::Path;
use std::process::Command;

use chrono::{SecondsFormat, Utc};

use crate::schema::RepoDetails;

/// Caller-supplied overrides for the source block
#[derive(Debug, Clone, Default)]
pub struct SourceOverrides {
    pub repository_url: Option<String>,
    pub commit_hash: Option<String>,
    pub commit_timestamp: Option<String>,
}

/// Collect repository details for the scanned tree.
///
/// Field precedence: override, then local git state, then null (or the
/// current UTC time for the timestamp).
pub fn collect_repo_details(root: &Path, overrides: &SourceOverrides) -> RepoDetails {
    let repository = overrides
        .repository_url
        .clone()
        .or_else(|| git_command_optional(&["config", "--get", "remote.origin.url"], root));

    let commit = overrides
        .commit_hash
        .clone()
        .or_else(|| git_command_optional(&["rev-parse", "HEAD"], root));

    let timestamp = overrides
        .commit_timestamp
        .clone()
        .or_else(|| git_command_optional(&["log", "-1", "--format=%cI"], root))
        .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

    RepoDetails {
        repository,
        commit,
        timestamp,
    }
}

/// Run a git command in `cwd`, returning stdout, or `None` on any failure
fn git_command_optional(args: &[&str], cwd: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        None
    } else {
        Some(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_take_precedence() {
        let dir = TempDir::new().unwrap();
        let overrides = SourceOverrides {
            repository_url: Some("https://example.com/repo.git".to_string()),
            commit_hash: Some("abc123".to_string()),
            commit_timestamp: Some("2024-06-01T12:00:00Z".to_string()),
        };

        let details = collect_repo_details(dir.path(), &overrides);
        assert_eq!(
            details.repository.as_deref(),
            Some("https://example.com/repo.git")
        );
        assert_eq!(details.commit.as_deref(), Some("abc123"));
        assert_eq!(details.timestamp, "2024-06-01T12:00:00Z");
    }

    #[test]
    fn test_plain_directory_falls_back_to_nulls_and_now() {
        let dir = TempDir::new().unwrap();
        let details = collect_repo_details(dir.path(), &SourceOverrides::default());

        assert_eq!(details.repository, None);
        assert_eq!(details.commit, None);
        // RFC 3339 scan time
        assert!(details.timestamp.contains('T'));
    }
}
