#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;

/// Lets a spawned game outlive the process that started it.
pub trait DetachCommandExt {
    /// Detaches the child from its parent.
    /// On Windows this uses CREATE_NEW_PROCESS_GROUP, on Unix a new session via setsid.
    fn detach(&mut self) -> &mut Self;

    /// Hides the console window on Windows. No-op elsewhere.
    fn suppress_console(&mut self) -> &mut Self;
}

impl DetachCommandExt for tokio::process::Command {
    fn detach(&mut self) -> &mut Self {
        #[cfg(windows)]
        {
            // DETACHED_PROCESS would cut off the stdout/stderr pipes, so only the group flag is set
            self.creation_flags(CREATE_NEW_PROCESS_GROUP);
        }
        #[cfg(unix)]
        {
            unsafe {
                self.pre_exec(|| {
                    libc::setsid();
                    Ok(())
                });
            }
        }
        self
    }

    fn suppress_console(&mut self) -> &mut Self {
        #[cfg(windows)]
        {
            self.creation_flags(CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);
        }
        self
    }
}
