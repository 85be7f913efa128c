//! Dependency-cache gating on build outcome.
//!
//! The only signal is filesystem evidence: if the installed application
//! binary is absent after the build step, the dependency cache must not
//! be persisted, whatever the build command's exit code claimed. This
//! is what keeps a broken or partial toolchain state from being cached
//! for future runs.

use std::path::Path;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CacheCheck {
    pub binary: String,
    pub present: bool,
    /// False tells the CI platform to skip saving its dependency cache.
    pub persist: bool,
}

pub fn decide(installed_binary: &Path) -> CacheCheck {
    let present = installed_binary.is_file();
    if !present {
        log_status!(
            "cache",
            "{} missing, cache will not be persisted",
            installed_binary.display()
        );
    }
    CacheCheck {
        binary: installed_binary.to_string_lossy().to_string(),
        present,
        persist: present,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn present_binary_keeps_default_persist() {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("Nightjar.exe");
        fs::write(&binary, b"bin").unwrap();

        let check = decide(&binary);
        assert!(check.present);
        assert!(check.persist);
    }

    #[test]
    fn absent_binary_vetoes_persist() {
        let dir = TempDir::new().unwrap();
        let check = decide(&dir.path().join("Nightjar.exe"));
        assert!(!check.present);
        assert!(!check.persist);
    }

    #[test]
    fn directory_does_not_count_as_binary() {
        let dir = TempDir::new().unwrap();
        let check = decide(dir.path());
        assert!(!check.present);
    }
}
