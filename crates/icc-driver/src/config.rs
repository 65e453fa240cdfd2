//! Settings used to spawn a driver session.

use std::path::PathBuf;

use camino::Utf8PathBuf;
use icc_config::{Config, DEFAULT_DRIVER_PATH, DEFAULT_USER_ID};

/// How to launch `iccdrvr.tsk` and what to report to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// The executable path or command name.
    pub command: PathBuf,
    /// Arguments passed before any protocol traffic.
    pub args: Vec<String>,
    /// Working directory for the spawned process.
    pub working_dir: Option<PathBuf>,
    /// Transcript file for raw response batches.
    pub transcript: Option<Utf8PathBuf>,
    /// User id sent with `OPEN` and `OVERRIDE`.
    pub user_id: String,
}

impl DriverConfig {
    /// Configuration launching `command` with no arguments.
    #[must_use]
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            working_dir: None,
            transcript: None,
            user_id: String::from(DEFAULT_USER_ID),
        }
    }

    /// Builds the spawn configuration from the shared [`Config`].
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            transcript: config.transcript_path().map(Utf8PathBuf::from),
            user_id: config.user_id().to_owned(),
            ..Self::new(config.driver_path().as_std_path())
        }
    }

    /// Sets arguments for the executable.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets a custom working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Enables transcript capture into `path`.
    #[must_use]
    pub fn with_transcript(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.transcript = Some(path.into());
        self
    }

    /// Sets the user id reported to the driver.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DRIVER_PATH)
    }
}
