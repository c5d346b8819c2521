//! Updater settings.
//! Stored as JSON next to the rest of the updater state; every field has a
//! default so a missing or partial file still loads.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "updater-config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Java executable to relaunch with. When unset the lookup falls back to
    /// `JAVA_HOME` and then `PATH`.
    pub java_path: Option<PathBuf>,

    /// Scratch directory for hashing copies
    pub work_dir: PathBuf,

    /// Log a warning when relaunching on a non-Windows host
    pub warn_on_unsupported_os: bool,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            java_path: None,
            work_dir: std::env::temp_dir(),
            warn_on_unsupported_os: true,
        }
    }
}

impl UpdaterConfig {
    pub fn config_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILENAME)
    }

    /// Load settings from `path`, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No updater config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Read updater config {:?}", path))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Parse updater config {:?}", path))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Create config dir {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Write updater config {:?}", path))?;
        Ok(())
    }
}
