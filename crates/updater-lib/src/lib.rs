//! Client-side core of the modpack updater.
//!
//! Two halves live here: the file layer (`game::files`) that hashes, force-deletes
//! and reclaims files the running game may still hold open, and the launcher
//! layer (`game::launcher`) that captures the current launch command and
//! relaunches the game once updates have been applied.

pub mod config;
pub mod game;
pub mod models;
pub mod platform;
pub mod utils;

pub use config::UpdaterConfig;
pub use game::files::{
    compare_by_hash, force_delete, hash, hash_of_hashes, hash_with_retry, reclaim,
    DeleteOutcome, FileHasher, HashError, IgnoreList,
};
pub use game::launcher::{
    synthesize, CapturedLaunch, RelaunchError, RelaunchOutcome, Relauncher, RuntimeLaunchContext,
    SynthesisError,
};
pub use game::metadata::ModloaderType;
pub use models::DownloadInfo;
pub use platform::{EnvironmentType, Platform, StaticPlatform};
