use thiserror::Error;

/// Domain errors for scratchpad handling.
///
/// IPC and X protocol failures are not represented here; those are
/// carried as `anyhow` errors with context and abort the invocation.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed user input (anchor, size, position, edge). Reported
    /// before any window-manager interaction happens.
    #[error("invalid {what} '{input}': {reason}")]
    Configuration {
        what: &'static str,
        input: String,
        reason: String,
    },

    /// Identity file exists but cannot be parsed. Recovered by treating
    /// the command as untracked.
    #[error("corrupt identity file {path}: {reason}")]
    CorruptState { path: String, reason: String },

    /// A launched window's platform id or container id could not be
    /// determined from the window-new event.
    #[error("cannot correlate launched window: {0}")]
    Correlation(String),

    /// Tracked window id resolved to a different container, or vanished
    /// from the tree. Recovered by relaunching.
    #[error("stale identity for window {window_id}: {reason}")]
    StaleIdentity { window_id: u32, reason: String },
}

impl Error {
    pub fn configuration(
        what: &'static str,
        input: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            what,
            input: input.into(),
            reason: reason.into(),
        }
    }
}
