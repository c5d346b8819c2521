//! Restarting the game with the captured launch command

use crate::config::UpdaterConfig;
use crate::game::files::run_exit_deletions;
use crate::game::launcher::command::{
    censor_private_info, format_path, join_parts, remove_optional_mods_properties,
};
use crate::game::launcher::context::RuntimeLaunchContext;
use crate::game::launcher::optional_mods::{has_mods, optional_mods_property};
use crate::game::launcher::spawn::{CommandLineError, SpawnStrategy};
use crate::game::launcher::synthesizer::{synthesize, CapturedLaunch};
use crate::platform::Platform;
use crate::utils::process::DetachCommandExt;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

/// Exit code when the optional mods property went missing from the command
pub const EXIT_PROPERTY_MISSING: i32 = 1;

/// Runs right before the process exits, in registration order
pub type ShutdownCallback = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RelaunchError {
    #[error("Can't relaunch, relauncher not initialized")]
    NotInitialized,

    #[error("A relaunch is already in progress")]
    InProgress,

    #[error("Relauncher failed to add {property} property to command")]
    OptionalModsPropertyMissing { property: String, command: String },

    #[error("Invalid relaunch command: {0}")]
    InvalidCommand(#[from] CommandLineError),

    #[error("Failed to spawn relaunched game: {0}")]
    Spawn(#[source] std::io::Error),
}

impl RelaunchError {
    /// Errors that must end the current process, with the code to exit with
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RelaunchError::OptionalModsPropertyMissing { .. } => Some(EXIT_PROPERTY_MISSING),
            _ => None,
        }
    }
}

/// Final command for one relaunch attempt
#[derive(Debug, Clone)]
pub struct PreparedCommand {
    pub command_line: String,
    pub optional_mods_property: Option<String>,
}

impl PreparedCommand {
    /// The command with account values redacted, for logs
    pub fn masked(&self) -> String {
        censor_private_info(&self.command_line)
    }
}

/// Result of a completed handoff. The caller is expected to exit with
/// `exit_code`; [`Relauncher::relaunch`] does so itself.
#[derive(Debug)]
pub struct RelaunchOutcome {
    pub exit_code: i32,
    /// Pid of the relaunched game, `None` when nothing was spawned
    pub pid: Option<u32>,
    /// Background task draining the child's output
    pub drain: Option<JoinHandle<()>>,
}

/// Owns the captured launch and turns relaunch requests into a new process.
pub struct Relauncher {
    platform: Arc<dyn Platform>,
    captured: Option<CapturedLaunch>,
    config: UpdaterConfig,
    callbacks: Vec<ShutdownCallback>,
    in_progress: AtomicBool,
}

impl Relauncher {
    pub fn new(
        platform: Arc<dyn Platform>,
        captured: Option<CapturedLaunch>,
        config: UpdaterConfig,
    ) -> Self {
        Self {
            platform,
            captured,
            config,
            callbacks: Vec::new(),
            in_progress: AtomicBool::new(false),
        }
    }

    /// Capture the current launch. On a server, or when capturing fails, the
    /// relauncher stays uninitialized and later relaunch requests are refused.
    pub fn initialize(
        platform: Arc<dyn Platform>,
        context: RuntimeLaunchContext,
        config: UpdaterConfig,
    ) -> Self {
        let captured = if platform.environment().is_server() {
            None
        } else {
            match synthesize(context, platform.as_ref(), &config) {
                Ok(captured) => Some(captured),
                Err(e) => {
                    log::error!("Relauncher not initialized: {}", e);
                    None
                }
            }
        };
        Self::new(platform, captured, config)
    }

    pub fn is_initialized(&self) -> bool {
        self.captured.is_some()
    }

    pub fn captured(&self) -> Option<&CapturedLaunch> {
        self.captured.as_ref()
    }

    pub fn add_callback(&mut self, callback: impl Fn() + Send + Sync + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Build the command for this relaunch from the captured base command.
    ///
    /// When `game_dir` has a non-empty `mods` directory the loader's
    /// optional mods property is added and must survive into the final
    /// command verbatim.
    pub fn prepare_command(&self, game_dir: Option<&Path>) -> Result<PreparedCommand, RelaunchError> {
        let captured = self.captured.as_ref().ok_or(RelaunchError::NotInitialized)?;

        let base = remove_optional_mods_properties(&captured.base_command);

        let property = game_dir
            .map(|dir| dir.join("mods"))
            .filter(|mods| has_mods(mods))
            .map(|mods| optional_mods_property(self.platform.as_ref(), &mods))
            .unwrap_or_default();

        let java = captured.strategy.quote(&captured.java_path.to_string_lossy());
        let command_line = format_path(&join_parts([java.as_str(), property.as_str(), base.as_str()]));

        if game_dir.is_some()
            && !command_line.contains(&property)
            && !command_line.contains(&format_path(&property))
        {
            return Err(RelaunchError::OptionalModsPropertyMissing {
                property,
                command: censor_private_info(&command_line),
            });
        }

        Ok(PreparedCommand {
            command_line,
            optional_mods_property: (!property.is_empty()).then_some(property),
        })
    }

    /// Spawn the relaunched game and run the shutdown callbacks, without
    /// exiting. On a server nothing is spawned; the outcome just asks the
    /// caller to exit so the server can be restarted externally.
    pub async fn handoff(&self, game_dir: Option<&Path>) -> Result<RelaunchOutcome, RelaunchError> {
        if self.platform.environment().is_server() {
            log::info!("Please restart the server to apply updates!");
            return Ok(RelaunchOutcome {
                exit_code: 0,
                pid: None,
                drain: None,
            });
        }

        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RelaunchError::InProgress);
        }

        match self.spawn(game_dir) {
            Ok((pid, drain)) => {
                for callback in &self.callbacks {
                    callback();
                }
                Ok(RelaunchOutcome {
                    exit_code: 0,
                    pid,
                    drain: Some(drain),
                })
            }
            Err(e) => {
                self.in_progress.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    fn spawn(&self, game_dir: Option<&Path>) -> Result<(Option<u32>, JoinHandle<()>), RelaunchError> {
        let prepared = self.prepare_command(game_dir)?;
        let strategy = self
            .captured
            .as_ref()
            .map(|c| c.strategy)
            .unwrap_or_else(SpawnStrategy::current);

        if strategy != SpawnStrategy::Windows && self.config.warn_on_unsupported_os {
            log::warn!("Relaunching is best tested on Windows; if the game does not come back, start it manually");
        }

        log::info!("Restarting game with command:\n{}", prepared.masked());

        let argv = strategy.split_command_line(&prepared.command_line)?;
        let mut command = tokio::process::Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .detach()
            .suppress_console();

        let mut child = command.spawn().map_err(RelaunchError::Spawn)?;
        let pid = child.id();
        log::info!("Relaunched game started with PID: {:?}", pid);

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let drain = tokio::spawn(async move {
            tokio::join!(
                drain_lines(stdout, log::Level::Info),
                drain_lines(stderr, log::Level::Warn)
            );
            match child.wait().await {
                Ok(status) => log::info!("Relaunched game (PID {:?}) exited: {}", pid, status),
                Err(e) => log::error!("Failed to wait for relaunched game (PID {:?}): {}", pid, e),
            }
        });

        Ok((pid, drain))
    }

    /// Relaunch the game and exit this process.
    ///
    /// Returns only when the relaunch was refused (not initialized, already
    /// running, or the command could not be spawned); the current game then
    /// keeps running.
    pub async fn relaunch(&self, game_dir: Option<&Path>) {
        match self.handoff(game_dir).await {
            Ok(outcome) => {
                run_exit_deletions();
                std::process::exit(outcome.exit_code);
            }
            Err(e) => {
                if let RelaunchError::OptionalModsPropertyMissing { command, .. } = &e {
                    log::error!("{}\nCommand: {}", e, command);
                } else {
                    log::error!("{}", e);
                }
                if let Some(code) = e.exit_code() {
                    std::process::exit(code);
                }
            }
        }
    }
}

async fn drain_lines<R: AsyncRead + Unpin>(stream: Option<R>, level: log::Level) {
    let Some(stream) = stream else {
        return;
    };
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => log::log!(level, "{}", line),
            Ok(None) => break,
            Err(e) => {
                log::warn!("Stopped reading relaunched game output: {}", e);
                break;
            }
        }
    }
}
