//! Hashing, forced deletion and reclamation of game files.
//!
//! Everything here has to cope with the game still holding jars open, so the
//! deletion side never fails its caller and hashing falls back to a copy.

pub mod archive;
pub mod delete;
pub mod hash;
pub mod ignore;
pub mod reclaim;

pub use archive::{
    is_archive, write_empty_archive, ArchiveIdentity, JarModIdentity, MAX_EMPTY_ARCHIVE_SIZE,
};
pub use delete::{copy_file, delete_on_exit, force_delete, run_exit_deletions, DeleteOutcome};
pub use hash::{
    compare_by_hash, hash, hash_of_hashes, hash_with_retry, hash_with_retry_in, FileHasher,
    HashAlgorithm, HashError,
};
pub use ignore::IgnoreList;
pub use reclaim::{is_recursively_empty, map_all_files, reclaim, reclaim_with};
