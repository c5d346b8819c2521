use super::archive::{is_archive, write_empty_archive, MAX_EMPTY_ARCHIVE_SIZE};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Paths to remove right before the process exits
static EXIT_DELETIONS: Lazy<Mutex<Vec<PathBuf>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// What [`force_delete`] managed to do. Callers that only want best effort can
/// ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Nothing existed at the path
    Absent,
    /// The entry is gone
    Deleted,
    /// The file could not be unlinked but its content is now empty (zero bytes
    /// or an empty archive placeholder)
    Neutralized,
    /// Still present; registered for removal at exit
    ScheduledOnExit,
    /// Still present and nothing else could be done
    Remaining,
}

/// Remove a file or directory, escalating through stronger strategies.
///
/// Never fails. A file that survives every attempt and is larger than an empty
/// archive gets its content discarded: jars are rewritten as an empty archive,
/// anything else is truncated. With `delete_on_exit` a survivor is also queued
/// for [`run_exit_deletions`].
pub fn force_delete(path: &Path, delete_on_exit: bool) -> DeleteOutcome {
    if !exists(path) {
        return DeleteOutcome::Absent;
    }

    let _ = delete_quietly(path);
    if !exists(path) {
        return DeleteOutcome::Deleted;
    }

    let _ = delete_forcefully(path);
    if !exists(path) {
        return DeleteOutcome::Deleted;
    }

    let neutralized = neutralize(path);

    // Rewriting closes our handle, which is sometimes what held the delete back
    let _ = delete_forcefully(path);
    if !exists(path) {
        return DeleteOutcome::Deleted;
    }

    if delete_on_exit {
        register_exit_deletion(path);
        return DeleteOutcome::ScheduledOnExit;
    }

    if neutralized {
        DeleteOutcome::Neutralized
    } else {
        DeleteOutcome::Remaining
    }
}

/// `symlink_metadata` so a dangling link still counts as present
fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn delete_quietly(path: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Clear read-only flags throughout the tree, then delete again
fn delete_forcefully(path: &Path) -> std::io::Result<()> {
    make_writable(path);
    delete_quietly(path)
}

fn make_writable(path: &Path) {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return;
    };
    if meta.file_type().is_symlink() {
        return;
    }

    let mut perms = meta.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        let _ = fs::set_permissions(path, perms);
    }

    if meta.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                make_writable(&entry.path());
            }
        }
    }
}

/// Discard the content of a regular file larger than an empty archive: jars
/// become the placeholder archive, anything else is truncated. Links are never
/// followed, their target may live outside the game directory.
fn neutralize(path: &Path) -> bool {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return false;
    };
    if !meta.file_type().is_file() || meta.len() <= MAX_EMPTY_ARCHIVE_SIZE {
        return false;
    }

    let result = if is_archive(path) {
        write_empty_archive(path)
    } else {
        truncate(path)
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            log::debug!("Cannot discard content of {:?}: {:#}", path, e);
            false
        }
    }
}

fn truncate(path: &Path) -> Result<()> {
    fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Truncate {:?}", path))?;
    Ok(())
}

fn register_exit_deletion(path: &Path) {
    if let Ok(mut pending) = EXIT_DELETIONS.lock() {
        if !pending.iter().any(|p| p == path) {
            log::debug!("Deferring deletion of {:?} until exit", path);
            pending.push(path.to_path_buf());
        }
    }
}

/// Queue `path` for removal when [`run_exit_deletions`] runs
pub fn delete_on_exit(path: &Path) {
    register_exit_deletion(path);
}

/// Force-delete everything queued for exit. Returns the paths that are still
/// present afterwards.
pub fn run_exit_deletions() -> Vec<PathBuf> {
    let pending = match EXIT_DELETIONS.lock() {
        Ok(mut pending) => std::mem::take(&mut *pending),
        Err(_) => return Vec::new(),
    };

    pending
        .into_iter()
        .filter(|path| {
            // No re-registration: this already is the exit path
            !matches!(
                force_delete(path, false),
                DeleteOutcome::Absent | DeleteOutcome::Deleted
            )
        })
        .collect()
}

/// Copy `source` to `destination`, creating missing parent directories
pub fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Create dir {:?}", parent))?;
    }
    fs::copy(source, destination)
        .with_context(|| format!("Copy file {:?} -> {:?}", source, destination))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Serializes tests that look into the process-wide exit registry
    static REGISTRY_LOCK: Mutex<()> = Mutex::new(());

    fn is_placeholder_archive(path: &Path) -> bool {
        let Ok(file) = fs::File::open(path) else {
            return false;
        };
        zip::ZipArchive::new(file)
            .map(|archive| archive.file_names().any(|name| name == "empty/"))
            .unwrap_or(false)
    }

    #[test]
    fn test_neutralize_discards_large_content() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("big.jar");
        let txt = tmp.path().join("big.txt");
        let small = tmp.path().join("small.txt");
        fs::write(&jar, vec![7u8; 1000]).unwrap();
        fs::write(&txt, vec![7u8; 1000]).unwrap();
        fs::write(&small, b"tiny").unwrap();

        assert!(neutralize(&jar));
        assert!(fs::metadata(&jar).unwrap().len() <= MAX_EMPTY_ARCHIVE_SIZE);
        assert!(is_placeholder_archive(&jar));

        assert!(neutralize(&txt));
        assert_eq!(fs::metadata(&txt).unwrap().len(), 0);

        assert!(!neutralize(&small));
        assert_eq!(fs::read(&small).unwrap(), b"tiny");
        assert!(!neutralize(tmp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_neutralize_leaves_link_targets_alone() {
        let tmp = TempDir::new().unwrap();
        let outside = tmp.path().join("elsewhere/big.jar");
        fs::create_dir_all(outside.parent().unwrap()).unwrap();
        fs::write(&outside, vec![7u8; 1000]).unwrap();

        let link = tmp.path().join("x.jar");
        std::os::unix::fs::symlink(&outside, &link).unwrap();

        assert!(!neutralize(&link));
        assert_eq!(fs::read(&outside).unwrap(), vec![7u8; 1000]);
    }

    #[cfg(unix)]
    #[test]
    fn test_undeletable_files_are_neutralized_or_scheduled() {
        use std::os::unix::fs::PermissionsExt;

        // Root may unlink inside a read-only directory
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let _guard = REGISTRY_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mods");
        fs::create_dir(&dir).unwrap();
        let jar = dir.join("held.jar");
        let txt = dir.join("held.txt");
        fs::write(&jar, vec![7u8; 1000]).unwrap();
        fs::write(&txt, vec![7u8; 1000]).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

        let jar_outcome = force_delete(&jar, false);
        let txt_outcome = force_delete(&txt, true);
        let scheduled = EXIT_DELETIONS.lock().unwrap().contains(&txt);

        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(jar_outcome, DeleteOutcome::Neutralized);
        assert!(is_placeholder_archive(&jar));
        assert_eq!(txt_outcome, DeleteOutcome::ScheduledOnExit);
        assert_eq!(fs::metadata(&txt).unwrap().len(), 0);
        assert!(scheduled);

        let leftovers = run_exit_deletions();
        assert!(!txt.exists());
        assert!(!leftovers.contains(&txt));
    }

    #[test]
    fn test_absent_path_is_noop_twice() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("never-there.jar");
        assert_eq!(force_delete(&path, false), DeleteOutcome::Absent);
        assert_eq!(force_delete(&path, true), DeleteOutcome::Absent);
    }

    #[test]
    fn test_deletes_plain_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("old.jar");
        fs::write(&path, b"content").unwrap();

        assert_eq!(force_delete(&path, false), DeleteOutcome::Deleted);
        assert!(!path.exists());
        assert_eq!(force_delete(&path, false), DeleteOutcome::Absent);
    }

    #[test]
    fn test_deletes_read_only_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("locked.txt");
        fs::write(&path, b"content").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        assert_eq!(force_delete(&path, false), DeleteOutcome::Deleted);
        assert!(!path.exists());
    }

    #[test]
    fn test_deletes_directory_tree() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mods");
        fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        fs::write(dir.join("nested/a.jar"), b"x").unwrap();

        assert_eq!(force_delete(&dir, false), DeleteOutcome::Deleted);
        assert!(!dir.exists());
    }

    #[test]
    fn test_file_held_open_never_keeps_its_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("in-use.jar");
        fs::write(&path, vec![1u8; 4096]).unwrap();
        let _handle = fs::File::open(&path).unwrap();

        let outcome = force_delete(&path, false);

        // Unix unlinks open files; Windows refuses and we neutralize instead
        match fs::metadata(&path) {
            Err(_) => assert_eq!(outcome, DeleteOutcome::Deleted),
            Ok(meta) => {
                assert_eq!(outcome, DeleteOutcome::Neutralized);
                assert!(meta.len() <= MAX_EMPTY_ARCHIVE_SIZE);
            }
        }
    }

    #[test]
    fn test_copy_file_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.jar");
        let dst = tmp.path().join("a/b/c/dst.jar");
        fs::write(&src, b"payload").unwrap();

        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
    }

    #[test]
    fn test_exit_deletions_remove_registered_paths() {
        let _guard = REGISTRY_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deferred.log");
        fs::write(&path, b"x").unwrap();

        delete_on_exit(&path);
        let leftovers = run_exit_deletions();

        assert!(!path.exists());
        assert!(!leftovers.contains(&path));
    }
}
