//! Executable path resolution for the DIAMOND aligner
//!
//! Search order:
//! 1. An explicit path given on the command line
//! 2. The `SCORESWEEP_DIAMOND` environment variable
//! 3. PATH

use anyhow::{anyhow, bail, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that can point at a DIAMOND executable
pub const DIAMOND_ENV: &str = "SCORESWEEP_DIAMOND";

/// Resolve the executable to run for `binary_name`
pub fn resolve_binary(binary_name: &str, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if is_executable(path) {
            return Ok(path.to_path_buf());
        }
        bail!("{} executable not found at {}", binary_name, path.display());
    }

    if let Some(path) = env::var_os(DIAMOND_ENV).map(PathBuf::from) {
        if is_executable(&path) {
            return Ok(path);
        }
        log::warn!(
            "{DIAMOND_ENV} is set to {} but it is not an executable file, searching PATH",
            path.display()
        );
    }

    find_in_path(binary_name).ok_or_else(|| {
        anyhow!(
            "'{}' not found in PATH.\n\
             Install DIAMOND or pass its location with --diamond.",
            binary_name
        )
    })
}

/// First PATH entry containing an executable called `binary_name`
pub fn find_in_path(binary_name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(binary_name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_must_exist() {
        let missing = Path::new("/nonexistent/scoresweep/diamond");
        let err = resolve_binary("diamond", Some(missing)).unwrap_err();
        assert!(err.to_string().contains("not found at"));
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_path_is_used() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let exe = dir.path().join("diamond");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(resolve_binary("diamond", Some(&exe)).unwrap(), exe);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("diamond");
        std::fs::write(&file, "not a program").unwrap();

        assert!(resolve_binary("diamond", Some(&file)).is_err());
    }

    #[test]
    fn test_missing_binary_not_found_in_path() {
        assert!(find_in_path("scoresweep-no-such-binary-12345").is_none());
    }
}
