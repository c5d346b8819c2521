//! Reconstructing the current launch as a command line

use crate::config::UpdaterConfig;
use crate::game::launcher::command::{
    format_path, join_parts, strip_version_type,
};
use crate::game::launcher::context::RuntimeLaunchContext;
use crate::game::launcher::java::{check_java_path, resolve_java_path};
use crate::game::launcher::natives::copy_natives;
use crate::game::launcher::spawn::SpawnStrategy;
use crate::game::metadata::ModloaderType;
use crate::platform::Platform;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Relaunch is not available on a dedicated server")]
    ServerEnvironment,

    #[error("Relaunch is not supported under loader: {0:?}")]
    UnsupportedLoader(Option<ModloaderType>),

    #[error("No Java executable could be located")]
    JavaNotFound,

    #[error("Java path is not an executable file: {0:?}")]
    InvalidJavaPath(PathBuf),
}

/// The launch as captured at startup. Built once and only read afterwards;
/// every relaunch derives its final command from `base_command`.
#[derive(Debug, Clone)]
pub struct CapturedLaunch {
    pub context: RuntimeLaunchContext,
    pub loader: ModloaderType,
    pub java_path: PathBuf,
    /// Runtime args, classpath, main class and launch args; no executable
    pub base_command: String,
    pub strategy: SpawnStrategy,
}

/// Capture the current launch so it can be reproduced later.
///
/// Copies the natives next to the originals and points the command at the
/// copy, since the running game keeps the original files mapped.
pub fn synthesize(
    context: RuntimeLaunchContext,
    platform: &dyn Platform,
    config: &UpdaterConfig,
) -> Result<CapturedLaunch, SynthesisError> {
    if platform.environment().is_server() {
        return Err(SynthesisError::ServerEnvironment);
    }

    let loader = match platform.loader() {
        Some(loader) if loader.supports_relaunch() => loader,
        other => return Err(SynthesisError::UnsupportedLoader(other)),
    };

    copy_natives(&context.library_path, &context.new_library_path);

    let java_path = resolve_java_path(config, context.java_home.as_deref())
        .ok_or(SynthesisError::JavaNotFound)?;
    if !check_java_path(&java_path) {
        return Err(SynthesisError::InvalidJavaPath(java_path));
    }
    log::warn!(
        "Using this java executable path (if wrong or not working, change it in the updater config) {:?}",
        java_path
    );

    let strategy = SpawnStrategy::current();
    let base_command = build_base_command(&context, strategy);
    log::debug!("Captured {} launch with entry class {}", loader, context.entry_class);

    Ok(CapturedLaunch {
        context,
        loader,
        java_path,
        base_command,
        strategy,
    })
}

/// `<runtime args> -cp <classpath> <entry class> <launch args>` with every path
/// in forward-slash form and the natives path swapped for the copy.
pub fn build_base_command(context: &RuntimeLaunchContext, strategy: SpawnStrategy) -> String {
    let input_arguments = context
        .input_arguments
        .iter()
        .map(|a| strategy.quote_assignment(a))
        .collect::<Vec<_>>()
        .join(" ");

    let classpath = context
        .classpath
        .iter()
        .map(|p| strategy.quote(&p.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(strategy.classpath_separator());

    let launch_arguments = strip_version_type(&context.launch_arguments)
        .iter()
        .map(|a| strategy.quote_always(a))
        .collect::<Vec<_>>()
        .join(" ");

    let command = format_path(&join_parts([
        input_arguments.as_str(),
        "-cp",
        classpath.as_str(),
        context.entry_class.as_str(),
        launch_arguments.as_str(),
    ]));

    let old_natives = format_path(&context.library_path.to_string_lossy());
    if old_natives.is_empty() {
        return command;
    }
    let new_natives = format_path(&context.new_library_path.to_string_lossy());
    command.replace(&old_natives, &new_natives)
}
