use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Location of the driver executable on a Foxboro I/A workstation.
#[cfg(windows)]
pub const DEFAULT_DRIVER_PATH: &str = r"D:\opt\fox\ciocfg\api\iccdrvr.tsk.exe";

/// Driver executable name resolved through `PATH` on non-Windows hosts.
#[cfg(not(windows))]
pub const DEFAULT_DRIVER_PATH: &str = "iccdrvr.tsk";

/// User id reported to the System Manager when none is configured.
pub const DEFAULT_USER_ID: &str = "default";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default driver executable path.
pub fn default_driver_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_DRIVER_PATH)
}

/// Owned user id value used where allocation is required (e.g. serde).
pub fn default_user_id_string() -> String {
    String::from(DEFAULT_USER_ID)
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
