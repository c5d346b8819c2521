//! Launch state captured from the running game

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory next to the original natives that the relaunched game loads
/// its native libraries from
pub const NEW_NATIVES_DIR: &str = "new-natives";

/// Everything needed to reproduce the current launch. Captured once at
/// startup and never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeLaunchContext {
    /// Runtime (JVM) input arguments, in order
    pub input_arguments: Vec<String>,

    /// Classpath entries, in order
    pub classpath: Vec<PathBuf>,

    /// Main class the game was started through
    pub entry_class: String,

    /// Arguments passed to the main class
    pub launch_arguments: Vec<String>,

    /// Native library directory reported by the runtime
    pub library_path: PathBuf,

    /// Sibling of `library_path` the natives are copied to
    pub new_library_path: PathBuf,

    /// Home of the running runtime, if known
    pub java_home: Option<PathBuf>,
}

impl RuntimeLaunchContext {
    pub fn new(
        input_arguments: Vec<String>,
        classpath: Vec<PathBuf>,
        entry_class: impl Into<String>,
        launch_arguments: Vec<String>,
        library_path: PathBuf,
    ) -> Self {
        let new_library_path = new_natives_dir(&library_path);
        Self {
            input_arguments,
            classpath,
            entry_class: entry_class.into(),
            launch_arguments,
            library_path,
            new_library_path,
            java_home: None,
        }
    }

    pub fn with_java_home(mut self, java_home: PathBuf) -> Self {
        self.java_home = Some(java_home);
        self
    }
}

/// `<parent of natives>/new-natives`
pub fn new_natives_dir(library_path: &Path) -> PathBuf {
    library_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(NEW_NATIVES_DIR)
}
