use crate::error::{Result, StatsError};
use crate::model::Commit;
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

pub const DEFAULT_PROVIDER: &str = "git-stats-provider";

/// Source of raw per-commit records for a repository.
///
/// Errors are reported as [`StatsError::Provider`] carrying the message meant
/// for the user.
pub trait StatsProvider: Send + Sync {
    fn commit_stats(&self, repo: &Path, pathspec: &[String]) -> Result<Vec<Commit>>;

    /// Number of files matched by `pathspec`. Display only.
    fn file_count(&self, repo: &Path, pathspec: &[String]) -> Result<u64>;
}

/// Runs an external program by name.
///
/// `<program> stats --repo <REPO> [-- <pathspec>...]` prints a JSON array of
/// commit records; `<program> files ...` prints a single integer. A non-zero
/// exit status turns stderr into the error message.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    program: String,
}

impl CommandProvider {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, action: &str, repo: &Path, pathspec: &[String]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(action).arg("--repo").arg(repo);
        if !pathspec.is_empty() {
            cmd.arg("--").args(pathspec);
        }
        debug!(program = %self.program, action, repo = %repo.display(), ?pathspec, "invoking provider");

        let output = cmd
            .output()
            .map_err(|e| StatsError::Provider(format!("failed to run {}: {e}", self.program)))?;
        self.check(output)
    }

    fn check(&self, output: Output) -> Result<String> {
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(StatsError::Provider(message));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl StatsProvider for CommandProvider {
    fn commit_stats(&self, repo: &Path, pathspec: &[String]) -> Result<Vec<Commit>> {
        let stdout = self.run("stats", repo, pathspec)?;
        parse_commits(&stdout)
            .map_err(|e| StatsError::Provider(format!("unexpected output from {}: {e}", self.program)))
    }

    fn file_count(&self, repo: &Path, pathspec: &[String]) -> Result<u64> {
        let stdout = self.run("files", repo, pathspec)?;
        stdout.trim().parse().map_err(|e| {
            StatsError::Provider(format!("unexpected file count from {}: {e}", self.program))
        })
    }
}

pub fn parse_commits(json: &str) -> std::result::Result<Vec<Commit>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_provider_payload() {
        let commits = parse_commits(
            r#"[{"author":"A","commits":1,"insertions":10,"deletions":2,"files_changed":3},
                {"author":"B","commits":1,"insertions":1,"deletions":1,"files_changed":1}]"#,
        )
        .unwrap();
        assert_eq!(commits, vec![Commit::new("A", 10, 2, 3), Commit::new("B", 1, 1, 1)]);
    }

    #[test]
    fn missing_program_is_a_provider_error() {
        let provider = CommandProvider::new("git-stats-provider-that-does-not-exist");
        let err = provider.commit_stats(Path::new("."), &[]).unwrap_err();
        assert!(err.is_provider());
        assert!(err.to_string().starts_with("failed to run git-stats-provider-that-does-not-exist"));
    }

    #[cfg(unix)]
    #[test]
    fn stderr_becomes_the_message() {
        let provider = CommandProvider::new("sh");
        // `sh stats` tries to run a script named "stats" and fails on stderr.
        let err = provider.commit_stats(Path::new("."), &[]).unwrap_err();
        assert!(err.is_provider());
        assert!(!err.to_string().is_empty());
    }
}
