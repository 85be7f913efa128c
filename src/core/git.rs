//! Git operations via the system git binary.

use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::command;

pub fn is_git_repo(dir: &Path) -> bool {
    command::run_in(dir, "git", &["rev-parse", "--git-dir"], "git rev-parse").is_ok()
}

/// Switch the working tree to the given branch.
pub fn checkout(dir: &Path, branch: &str) -> Result<()> {
    command::run_in(dir, "git", &["checkout", branch], "git checkout")
        .map_err(|e| Error::Git(format!("checkout {}: {}", branch, e)))?;
    log_status!("git", "Checked out {}", branch);
    Ok(())
}

pub fn current_branch(dir: &Path) -> Result<String> {
    command::run_in(
        dir,
        "git",
        &["rev-parse", "--abbrev-ref", "HEAD"],
        "git rev-parse",
    )
    .map_err(|e| Error::Git(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn init_repo(dir: &Path) {
        for args in [
            vec!["init", "-b", "master"],
            vec!["config", "user.email", "ci@example.net"],
            vec!["config", "user.name", "ci"],
            vec!["commit", "--allow-empty", "-m", "seed"],
        ] {
            let status = Command::new("git")
                .args(&args)
                .current_dir(dir)
                .status()
                .unwrap();
            assert!(status.success(), "git {:?} failed", args);
        }
    }

    #[test]
    fn detects_git_repo() {
        let dir = TempDir::new().unwrap();
        assert!(!is_git_repo(dir.path()));
        init_repo(dir.path());
        assert!(is_git_repo(dir.path()));
    }

    #[test]
    fn checkout_switches_branch() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        Command::new("git")
            .args(["branch", "work"])
            .current_dir(dir.path())
            .status()
            .unwrap();

        checkout(dir.path(), "work").unwrap();
        assert_eq!(current_branch(dir.path()).unwrap(), "work");

        checkout(dir.path(), "master").unwrap();
        assert_eq!(current_branch(dir.path()).unwrap(), "master");
    }

    #[test]
    fn checkout_unknown_branch_fails() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        let err = checkout(dir.path(), "no-such-branch").unwrap_err();
        assert_eq!(err.code(), "GIT_ERROR");
    }
}
