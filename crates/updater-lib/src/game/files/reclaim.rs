use super::archive::{is_archive, ArchiveIdentity, JarModIdentity, MAX_EMPTY_ARCHIVE_SIZE};
use super::delete::{force_delete, DeleteOutcome};
use super::ignore::IgnoreList;
use std::fs;
use std::path::{Path, PathBuf};

/// Sweep `directory` for leftovers of interrupted updates: zero-byte files,
/// jars too small to hold anything and (with `delete_empty_dirs`) directories
/// holding nothing at all. Paths on the ignore list are never touched and
/// directories starting with `.` are not entered.
///
/// Returns the paths that were removed or neutralized.
pub fn reclaim(directory: &Path, delete_empty_dirs: bool, ignore: &IgnoreList) -> Vec<PathBuf> {
    reclaim_with(directory, delete_empty_dirs, ignore, &JarModIdentity)
}

/// [`reclaim`] with a caller-provided archive identity check
pub fn reclaim_with(
    directory: &Path,
    delete_empty_dirs: bool,
    ignore: &IgnoreList,
    identity: &dyn ArchiveIdentity,
) -> Vec<PathBuf> {
    let mut reclaimed = Vec::new();
    walk(directory, delete_empty_dirs, ignore, identity, &mut reclaimed);
    reclaimed
}

fn walk(
    directory: &Path,
    delete_empty_dirs: bool,
    ignore: &IgnoreList,
    identity: &dyn ArchiveIdentity,
    reclaimed: &mut Vec<PathBuf>,
) {
    let Ok(entries) = fs::read_dir(directory) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if ignore.matches(&path) {
            continue;
        }
        // Entry metadata does not follow links, so nothing outside the tree
        // is entered or deleted
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if meta.file_type().is_symlink() {
            continue;
        }

        if meta.is_dir() {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            if delete_empty_dirs && is_recursively_empty(&path, ignore) {
                log::debug!("Deleting empty directory {:?}", path);
                record(force_delete(&path, false), path, reclaimed);
            } else {
                walk(&path, delete_empty_dirs, ignore, identity, reclaimed);
            }
        } else if meta.len() == 0 {
            log::debug!("Deleting empty file {:?}", path);
            record(force_delete(&path, true), path, reclaimed);
        } else if meta.len() <= MAX_EMPTY_ARCHIVE_SIZE && is_archive(&path) {
            if identity.mod_id(&path).is_some() {
                continue;
            }
            log::info!("Deleting empty archive {:?}", path);
            record(force_delete(&path, true), path, reclaimed);
        }
    }
}

fn record(outcome: DeleteOutcome, path: PathBuf, reclaimed: &mut Vec<PathBuf>) {
    if outcome != DeleteOutcome::Remaining {
        reclaimed.push(path);
    }
}

/// A directory is empty when it contains nothing but empty directories.
///
/// Ignored entries make a directory non-empty so that deleting it can never
/// take an ignored path with it. An unlistable directory is not empty.
pub fn is_recursively_empty(directory: &Path, ignore: &IgnoreList) -> bool {
    let Ok(entries) = fs::read_dir(directory) else {
        return false;
    };

    for entry in entries {
        let Ok(entry) = entry else {
            return false;
        };
        let path = entry.path();
        if ignore.matches(&path) {
            return false;
        }
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => {
                if !is_recursively_empty(&path, ignore) {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}

/// Every regular file beneath `directory`. Links are not followed and
/// unreadable directories are skipped.
pub fn map_all_files(directory: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_files(directory, &mut files);
    files
}

fn collect_files(directory: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(directory) else {
        return;
    };
    for entry in entries.flatten() {
        let Ok(kind) = entry.file_type() else {
            continue;
        };
        if kind.is_dir() {
            collect_files(&entry.path(), files);
        } else if kind.is_file() {
            files.push(entry.path());
        }
    }
}
