use crate::config::UpdaterConfig;
use anyhow::Context;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const READ_CHUNK_SIZE: usize = 8192;

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("Digest algorithm not available: {algorithm}")]
    DigestUnavailable { algorithm: String },

    #[error("Cannot read {path:?} for hashing: {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot hash {path:?}, even from a copy: {source}")]
    FileUnhashable {
        path: PathBuf,
        #[source]
        source: Box<HashError>,
    },
}

/// Digest algorithms accepted by name, e.g. `"SHA-256"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl std::str::FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA1" => Ok(HashAlgorithm::Sha1),
            "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            _ => Err(HashError::DigestUnavailable {
                algorithm: s.to_string(),
            }),
        }
    }
}

fn digest_reader<D: Digest, R: Read>(reader: &mut R) -> std::io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = [0u8; READ_CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hex digest of the file's bytes, read in fixed-size chunks.
///
/// The digest is only produced after the whole file has been read; any read
/// error aborts with `FileUnreadable`.
pub fn hash(path: &Path, algorithm: &str) -> Result<String, HashError> {
    let algorithm: HashAlgorithm = algorithm.parse()?;
    let unreadable = |source| HashError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(unreadable)?;
    let digest = match algorithm {
        HashAlgorithm::Sha1 => digest_reader::<Sha1, _>(&mut file),
        HashAlgorithm::Sha256 => digest_reader::<Sha256, _>(&mut file),
        HashAlgorithm::Sha512 => digest_reader::<Sha512, _>(&mut file),
    };
    digest.map_err(unreadable)
}

/// Hashing that keeps its retry copies in a chosen scratch directory,
/// normally [`UpdaterConfig::work_dir`].
#[derive(Debug, Clone)]
pub struct FileHasher {
    work_dir: PathBuf,
}

impl FileHasher {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn from_config(config: &UpdaterConfig) -> Self {
        Self::new(&config.work_dir)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// See [`hash_with_retry`]
    pub fn hash_with_retry(&self, path: &Path, algorithm: &str) -> Result<String, HashError> {
        hash_with_retry_in(path, algorithm, &self.work_dir)
    }

    /// See [`compare_by_hash`]
    pub fn compare(&self, a: &Path, b: &Path, algorithm: &str) -> Result<bool, HashError> {
        if !a.exists() || !b.exists() {
            return Ok(false);
        }

        let hash_a = self.hash_with_retry(a, algorithm)?;
        let hash_b = self.hash_with_retry(b, algorithm)?;
        Ok(hash_a == hash_b)
    }
}

impl Default for FileHasher {
    fn default() -> Self {
        Self::from_config(&UpdaterConfig::default())
    }
}

/// Like [`hash`], but when the file cannot be read in place (typically because
/// another handle holds it) the bytes are copied to a scratch file and hashed
/// from there. The copy is removed whatever the outcome.
pub fn hash_with_retry(path: &Path, algorithm: &str) -> Result<String, HashError> {
    FileHasher::default().hash_with_retry(path, algorithm)
}

/// [`hash_with_retry`] with an explicit directory for the scratch copy
pub fn hash_with_retry_in(
    path: &Path,
    algorithm: &str,
    work_dir: &Path,
) -> Result<String, HashError> {
    let first = match hash(path, algorithm) {
        Ok(digest) => return Ok(digest),
        Err(e @ HashError::DigestUnavailable { .. }) => return Err(e),
        Err(e) => e,
    };
    log::debug!("Hashing {:?} in place failed ({}), retrying from a copy", path, first);

    hash_copy(path, algorithm, work_dir).map_err(|retry| {
        log::warn!("Hashing a copy of {:?} failed too: {:#}", path, retry);
        HashError::FileUnhashable {
            path: path.to_path_buf(),
            source: Box::new(first),
        }
    })
}

fn hash_copy(path: &Path, algorithm: &str, work_dir: &Path) -> anyhow::Result<String> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    // Removed when dropped
    let scratch = tempfile::Builder::new()
        .prefix(&file_name)
        .suffix(".tmp")
        .tempfile_in(work_dir)
        .with_context(|| format!("Create scratch file in {:?}", work_dir))?;

    std::fs::copy(path, scratch.path())
        .with_context(|| format!("Copy {:?} to {:?}", path, scratch.path()))?;
    Ok(hash(scratch.path(), algorithm)?)
}

/// SHA-256 over the UTF-8 bytes of a caller-built string of hashes.
///
/// The result is only reproducible if the caller concatenates the child
/// hashes in a stable order (sort the entries first).
pub fn hash_of_hashes(hashes: &str) -> String {
    hex::encode(Sha256::digest(hashes.as_bytes()))
}

/// True when both files exist and hash to the same digest
pub fn compare_by_hash(a: &Path, b: &Path, algorithm: &str) -> Result<bool, HashError> {
    FileHasher::default().compare(a, b, algorithm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn temp_with(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_sha1_known_value() {
        let file = temp_with(b"hello world");
        assert_eq!(
            hash(file.path(), "SHA-1").unwrap(),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn test_sha256_known_value() {
        let file = temp_with(b"hello world");
        assert_eq!(
            hash(file.path(), "SHA-256").unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_empty_file_hashes_fine() {
        let file = temp_with(b"");
        assert_eq!(
            hash(file.path(), "sha256").unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_multi_chunk_file() {
        let content = vec![0xABu8; READ_CHUNK_SIZE * 3 + 17];
        let file = temp_with(&content);
        let expected = hex::encode(Sha512::digest(&content));
        assert_eq!(hash(file.path(), "SHA-512").unwrap(), expected);
    }

    #[test]
    fn test_unknown_algorithm_is_not_retried() {
        let file = temp_with(b"data");
        let err = hash_with_retry(file.path(), "MD2").unwrap_err();
        assert!(matches!(err, HashError::DigestUnavailable { .. }));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let tmp = TempDir::new().unwrap();
        let err = hash(&tmp.path().join("gone.jar"), "SHA-256").unwrap_err();
        assert!(matches!(err, HashError::FileUnreadable { .. }));
    }

    #[test]
    fn test_retry_on_missing_file_is_unhashable() {
        let tmp = TempDir::new().unwrap();
        let err = hash_with_retry_in(&tmp.path().join("gone.jar"), "SHA-256", tmp.path())
            .unwrap_err();
        match err {
            HashError::FileUnhashable { source, .. } => {
                assert!(matches!(*source, HashError::FileUnreadable { .. }))
            }
            other => panic!("unexpected error: {other}"),
        }
        // The scratch copy must not linger
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unhashable_wraps_first_failure() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("gone.jar");
        // Neither the file nor the scratch directory exists
        let hasher = FileHasher::new(tmp.path().join("no-such-work-dir"));

        match hasher.hash_with_retry(&missing, "SHA-1").unwrap_err() {
            HashError::FileUnhashable { path, source } => {
                assert_eq!(path, missing);
                match *source {
                    HashError::FileUnreadable { path, .. } => assert_eq!(path, missing),
                    other => panic!("unexpected cause: {other}"),
                }
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_hasher_uses_configured_work_dir() {
        let tmp = TempDir::new().unwrap();
        let config = UpdaterConfig {
            work_dir: tmp.path().join("scratch"),
            ..UpdaterConfig::default()
        };
        let hasher = FileHasher::from_config(&config);
        assert_eq!(hasher.work_dir(), config.work_dir.as_path());
        assert_eq!(FileHasher::default().work_dir(), std::env::temp_dir().as_path());

        std::fs::create_dir(&config.work_dir).unwrap();
        let a = temp_with(b"same bytes");
        let b = temp_with(b"same bytes");
        assert!(hasher.compare(a.path(), b.path(), "SHA-256").unwrap());
        assert!(!hasher.compare(a.path(), &tmp.path().join("missing"), "SHA-256").unwrap());
        assert_eq!(std::fs::read_dir(&config.work_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_retry_is_stable() {
        let file = temp_with(b"stable content");
        let first = hash_with_retry(file.path(), "SHA-256").unwrap();
        let second = hash_with_retry(file.path(), "SHA-256").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_hash_of_hashes_is_deterministic() {
        let joined = ["aa", "bb", "cc"].concat();
        assert_eq!(hash_of_hashes(&joined), hash_of_hashes("aabbcc"));
        assert_ne!(hash_of_hashes("aabbcc"), hash_of_hashes("ccbbaa"));
        assert_eq!(hash_of_hashes("").len(), 64);
    }

    #[test]
    fn test_compare_by_hash() {
        let a = temp_with(b"same bytes");
        let b = temp_with(b"same bytes");
        let c = temp_with(b"same bytez");

        assert!(compare_by_hash(a.path(), b.path(), "SHA-256").unwrap());
        assert!(!compare_by_hash(a.path(), c.path(), "SHA-256").unwrap());

        let tmp = TempDir::new().unwrap();
        assert!(!compare_by_hash(a.path(), &tmp.path().join("missing"), "SHA-256").unwrap());
        assert!(!compare_by_hash(&tmp.path().join("missing"), a.path(), "SHA-256").unwrap());
    }
}
