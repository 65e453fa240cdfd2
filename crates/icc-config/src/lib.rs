//! Shared configuration for the ICC driver toolchain.
//!
//! [`Config`] is loaded through `ortho_config`, layering defaults, an
//! optional TOML file (`--config-path`), `ICC_*` environment variables and
//! command-line flags, in increasing order of precedence. Both the driver
//! library and the `icc` binary read the same structure so a session built
//! by either agrees on the executable path and transcript location.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DRIVER_PATH, DEFAULT_LOG_FILTER, DEFAULT_USER_ID, default_driver_path,
    default_log_filter_string, default_log_format, default_user_id_string,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for a driver session and its logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "ICC")]
pub struct Config {
    /// Path to the `iccdrvr.tsk` executable.
    #[ortho_config(default = default_driver_path())]
    pub driver_path: Utf8PathBuf,
    /// File receiving raw response batches. Capture is disabled when unset.
    pub transcript_path: Option<Utf8PathBuf>,
    /// User id reported by `OPEN` and `OVERRIDE`.
    #[ortho_config(default = default_user_id_string())]
    pub user_id: String,
    /// Tracing filter directive.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driver_path: default_driver_path(),
            transcript_path: None,
            user_id: default_user_id_string(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Path to the driver executable.
    #[must_use]
    pub fn driver_path(&self) -> &Utf8Path {
        self.driver_path.as_path()
    }

    /// Transcript file, when capture is enabled.
    #[must_use]
    pub fn transcript_path(&self) -> Option<&Utf8Path> {
        self.transcript_path.as_deref()
    }

    /// User id passed through to the driver.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
