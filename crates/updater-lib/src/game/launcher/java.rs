//! Locating the Java executable used for the relaunch

use crate::config::UpdaterConfig;
use std::path::{Path, PathBuf};

fn executable_name() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// Pick the Java executable: configured override first, then the home of the
/// running runtime, then `JAVA_HOME`, then `java` on `PATH`.
pub fn resolve_java_path(config: &UpdaterConfig, java_home: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = &config.java_path {
        return Some(path.clone());
    }

    if let Some(home) = java_home {
        return Some(home.join("bin").join(executable_name()));
    }

    if let Some(home) = std::env::var_os("JAVA_HOME") {
        let candidate = PathBuf::from(home).join("bin").join(executable_name());
        if candidate.exists() {
            return Some(candidate);
        }
    }

    which::which(executable_name()).ok()
}

/// An existing regular file we are allowed to execute
pub fn check_java_path(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        log::error!("Java executable not found: {:?}", path);
        return false;
    };

    if !meta.is_file() {
        log::error!("Java path is not a file: {:?}", path);
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 == 0 {
            log::error!("Java executable is not executable: {:?}", path);
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_wins() {
        let config = UpdaterConfig {
            java_path: Some(PathBuf::from("/custom/java")),
            ..Default::default()
        };
        assert_eq!(
            resolve_java_path(&config, Some(Path::new("/runtime"))),
            Some(PathBuf::from("/custom/java"))
        );
    }

    #[test]
    fn test_runtime_home_before_environment() {
        let resolved = resolve_java_path(&UpdaterConfig::default(), Some(Path::new("/runtime")));
        assert_eq!(
            resolved,
            Some(Path::new("/runtime").join("bin").join(executable_name()))
        );
    }

    #[test]
    fn test_check_rejects_missing_and_directories() {
        let tmp = TempDir::new().unwrap();
        assert!(!check_java_path(&tmp.path().join("java")));
        assert!(!check_java_path(tmp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_requires_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let java = tmp.path().join("java");
        std::fs::write(&java, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&java, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!check_java_path(&java));

        std::fs::set_permissions(&java, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(check_java_path(&java));
    }
}
