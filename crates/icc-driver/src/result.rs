//! Outcome of a single command/response exchange.

use serde::Serialize;

/// Status derived from the final log line of a response batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum StatusCode {
    /// The batch ended with a non-failure log line.
    #[default]
    Success,
    /// The batch ended with `FAIL` or `FLSH`.
    Failure,
}

impl StatusCode {
    /// Numeric form reported to callers: 0 for success, 1 for failure.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }

    /// Whether the exchange succeeded.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<StatusCode> for u8 {
    fn from(status: StatusCode) -> Self {
        status.code()
    }
}

/// Classified response to one command.
///
/// A status of [`StatusCode::Failure`] is an ordinary outcome (an unknown
/// compound, a station that is not open) and is reported here rather than as
/// an error so callers can branch on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IccResult {
    data: Vec<String>,
    log: Vec<String>,
    message: String,
    status: StatusCode,
}

impl IccResult {
    /// Assembles a result from already classified lines.
    #[must_use]
    pub fn new(data: Vec<String>, log: Vec<String>, message: String, status: StatusCode) -> Self {
        Self {
            data,
            log,
            message,
            status,
        }
    }

    /// Data lines in the order the driver wrote them.
    #[must_use]
    pub fn data(&self) -> &[String] {
        &self.data
    }

    /// Log lines in the order the driver wrote them.
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// The final log line, which carries the status token.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status derived from [`IccResult::message`].
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Shorthand for `self.status().is_success()`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
