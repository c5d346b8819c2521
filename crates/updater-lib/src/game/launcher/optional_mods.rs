//! Loader-specific property that makes the relaunched game load the
//! freshly synced mods directory

use crate::game::launcher::command::format_path;
use crate::game::metadata::ModloaderType;
use crate::platform::Platform;
use crate::utils::version::compare_versions;
use std::cmp::Ordering;
use std::path::Path;

pub const QUILT_LOADER_COMPONENT: &str = "quilt_loader";

/// First Quilt loader that expects a glob instead of a bare directory
pub const QUILT_GLOB_SINCE: &str = "0.18.1";

/// `-Dfabric.addMods` for Fabric, `-Dloader.addMods` for Quilt. Empty for
/// loaders without such a property.
pub fn optional_mods_property(platform: &dyn Platform, mods_dir: &Path) -> String {
    let absolute = std::path::absolute(mods_dir).unwrap_or_else(|_| mods_dir.to_path_buf());
    let dir = format_path(&dunce::simplified(&absolute).to_string_lossy());
    let dir = dir.trim_end_matches('/');

    match platform.loader() {
        Some(ModloaderType::Fabric) => format!("-Dfabric.addMods=\"{}\"", dir),
        Some(ModloaderType::Quilt) => {
            let version = platform
                .component_version(QUILT_LOADER_COMPONENT)
                .unwrap_or_default();
            if quilt_uses_glob(&version) {
                format!("-Dloader.addMods=\"{}/*\"", dir)
            } else {
                format!("-Dloader.addMods=\"{}\"", dir)
            }
        }
        other => {
            log::error!(
                "Can't get optional mods property, unsupported loader: {}",
                other.map(|l| l.as_str()).unwrap_or("unknown")
            );
            String::new()
        }
    }
}

/// Quilt changed `loader.addMods` to take a glob in 0.18.1. Beta builds
/// compare as their release.
pub fn quilt_uses_glob(loader_version: &str) -> bool {
    let release = strip_beta(loader_version);
    compare_versions(release, QUILT_GLOB_SINCE) != Ordering::Less
}

fn strip_beta(version: &str) -> &str {
    match version.find("-beta.") {
        Some(idx) => &version[..idx],
        None => version,
    }
}

/// True when `dir` exists and holds at least one entry
pub fn has_mods(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
