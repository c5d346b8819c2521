//! Seam to the host mod platform.
//!
//! The updater never discovers the loader on its own; the host tells it which
//! side it runs on, which loader is active and which component versions are
//! installed.

use crate::game::metadata::ModloaderType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which side of the game this process is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvironmentType {
    Client,
    Server,
}

impl EnvironmentType {
    pub fn is_server(&self) -> bool {
        matches!(self, EnvironmentType::Server)
    }
}

/// Capabilities the updater needs from the running mod platform.
pub trait Platform: Send + Sync {
    /// Client or dedicated server
    fn environment(&self) -> EnvironmentType;

    /// Loader the game was started with, `None` if it cannot be told
    fn loader(&self) -> Option<ModloaderType>;

    /// Installed version of a component, e.g. `quilt_loader`
    fn component_version(&self, id: &str) -> Option<String>;
}

/// A platform described by plain values. Hosts that already know everything
/// up front (and tests) use this instead of writing their own impl.
#[derive(Debug, Clone)]
pub struct StaticPlatform {
    pub environment: EnvironmentType,
    pub loader: Option<ModloaderType>,
    pub versions: HashMap<String, String>,
}

impl StaticPlatform {
    pub fn client(loader: ModloaderType) -> Self {
        Self {
            environment: EnvironmentType::Client,
            loader: Some(loader),
            versions: HashMap::new(),
        }
    }

    pub fn server(loader: ModloaderType) -> Self {
        Self {
            environment: EnvironmentType::Server,
            loader: Some(loader),
            versions: HashMap::new(),
        }
    }

    pub fn with_version(mut self, id: &str, version: &str) -> Self {
        self.versions.insert(id.to_string(), version.to_string());
        self
    }
}

impl Platform for StaticPlatform {
    fn environment(&self) -> EnvironmentType {
        self.environment
    }

    fn loader(&self) -> Option<ModloaderType> {
        self.loader
    }

    fn component_version(&self, id: &str) -> Option<String> {
        self.versions.get(id).cloned()
    }
}
