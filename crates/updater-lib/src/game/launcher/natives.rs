//! Copying native libraries aside for the relaunched game

use crate::game::files::{copy_file, map_all_files};
use anyhow::{Context, Result};
use std::path::Path;

/// Best-effort copy of the natives tree. The running game keeps the original
/// files mapped, so the new process gets its own copy. Failures are logged and
/// otherwise ignored: some platforms ship no natives at all.
pub fn copy_natives(from: &Path, to: &Path) {
    if from.as_os_str().is_empty() || !from.is_dir() {
        log::debug!("No natives directory at {:?}, nothing to copy", from);
        return;
    }

    match copy_tree(from, to) {
        Ok(count) => log::debug!("Copied {} native files {:?} -> {:?}", count, from, to),
        Err(e) => log::debug!("Copying natives {:?} -> {:?} failed: {:#}", from, to, e),
    }
}

/// Mirror every file under `src` into `dest`, returning how many were copied
fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let files = map_all_files(src);
    for file in &files {
        let relative = file
            .strip_prefix(src)
            .with_context(|| format!("{:?} is not under {:?}", file, src))?;
        copy_file(file, &dest.join(relative))?;
    }
    Ok(files.len())
}
