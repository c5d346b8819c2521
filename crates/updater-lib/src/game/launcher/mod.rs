//! Capturing the running game's launch and starting it again after an update.
//!
//! [`synthesize`] turns the runtime context into a reusable base command once,
//! at startup. [`Relauncher`] derives the final command from it on every
//! relaunch request and hands off to the new process.

pub mod command;
pub mod context;
pub mod java;
pub mod natives;
pub mod optional_mods;
pub mod relauncher;
pub mod spawn;
pub mod synthesizer;

pub use command::{censor_private_info, REDACTED};
pub use context::{RuntimeLaunchContext, NEW_NATIVES_DIR};
pub use java::{check_java_path, resolve_java_path};
pub use optional_mods::optional_mods_property;
pub use relauncher::{
    PreparedCommand, RelaunchError, RelaunchOutcome, Relauncher, ShutdownCallback,
    EXIT_PROPERTY_MISSING,
};
pub use spawn::{CommandLineError, SpawnStrategy};
pub use synthesizer::{build_base_command, synthesize, CapturedLaunch, SynthesisError};
