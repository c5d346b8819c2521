use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Size of the smallest well-formed archive holding nothing but one empty
/// directory. Jars at or below this size carry no content.
pub const MAX_EMPTY_ARCHIVE_SIZE: u64 = 168;

const PLACEHOLDER_ENTRY: &str = "empty/";

static MODS_TOML_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*modId\s*=\s*"([^"]+)""#).expect("valid regex"));

/// Whether the path carries the `.jar` extension
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("jar"))
        .unwrap_or(false)
}

/// Overwrite `path` in place with an archive containing a single empty
/// directory entry. Works on files the OS refuses to unlink because the file
/// is opened for writing, not removed.
pub fn write_empty_archive(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Truncate archive {:?}", path))?;
    let mut zip = ZipWriter::new(file);
    zip.add_directory(PLACEHOLDER_ENTRY, FileOptions::<()>::default())
        .with_context(|| format!("Write placeholder entry into {:?}", path))?;
    zip.finish()
        .with_context(|| format!("Finish placeholder archive {:?}", path))?;
    Ok(())
}

/// Tells legitimate mod archives apart from corrupted leftovers.
pub trait ArchiveIdentity: Send + Sync {
    /// Mod id declared inside the archive, `None` if it is not a recognizable mod
    fn mod_id(&self, path: &Path) -> Option<String>;
}

/// Reads the loader metadata files shipped inside mod jars.
#[derive(Debug, Default, Clone, Copy)]
pub struct JarModIdentity;

impl ArchiveIdentity for JarModIdentity {
    fn mod_id(&self, path: &Path) -> Option<String> {
        match read_mod_id(path) {
            Ok(id) => id,
            Err(e) => {
                log::debug!("No mod id readable from {:?}: {}", path, e);
                None
            }
        }
    }
}

fn read_mod_id(path: &Path) -> Result<Option<String>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    if let Some(content) = read_entry(&mut archive, "fabric.mod.json")? {
        let json: serde_json::Value = serde_json::from_str(&content)?;
        return Ok(json.get("id").and_then(|v| v.as_str()).map(str::to_string));
    }

    if let Some(content) = read_entry(&mut archive, "quilt.mod.json")? {
        let json: serde_json::Value = serde_json::from_str(&content)?;
        return Ok(json
            .pointer("/quilt_loader/id")
            .and_then(|v| v.as_str())
            .map(str::to_string));
    }

    for name in ["META-INF/mods.toml", "META-INF/neoforge.mods.toml"] {
        if let Some(content) = read_entry(&mut archive, name)? {
            return Ok(MODS_TOML_ID
                .captures(&content)
                .map(|caps| caps[1].to_string()));
        }
    }

    Ok(None)
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(Some(content))
}
