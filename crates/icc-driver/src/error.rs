//! Error types for driver sessions.
//!
//! Only stream, framing and usage faults are errors. A command the driver
//! rejects comes back as an [`IccResult`](crate::IccResult) with a failure
//! status instead.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while driving an `iccdrvr.tsk` session.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// The driver executable was not found.
    #[error("driver executable not found: {command}")]
    BinaryNotFound {
        /// The command that was not found.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The driver process could not be started.
    #[error("failed to spawn driver process: {message}")]
    SpawnFailed {
        /// Description of the spawn failure.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The driver closed its output before a terminal token arrived, or is
    /// already known to have exited. The session cannot be reused.
    #[error("driver process is not running")]
    ProcessNotRunning,

    /// The response batch could not be interpreted.
    #[error("protocol violation: {message}")]
    ProtocolViolation {
        /// What was wrong with the batch.
        message: String,
    },

    /// The operation is disabled until an authorisation mechanism exists.
    #[error("{operation} is not permitted")]
    NotPermitted {
        /// The refused verb.
        operation: &'static str,
    },

    /// An argument would break the line protocol or a driver limit.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Which argument was rejected and why.
        message: String,
    },

    /// Reading from or writing to the driver pipes failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Appending to the transcript file failed.
    #[error("failed to write transcript '{path}': {source}")]
    Transcript {
        /// The transcript file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl DriverError {
    /// Whether the error means the process never started.
    #[must_use]
    pub const fn is_spawn_failure(&self) -> bool {
        matches!(self, Self::BinaryNotFound { .. } | Self::SpawnFailed { .. })
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Transport-layer errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),

    /// The driver closed its output stream.
    #[error("driver output closed before a terminal token")]
    EndOfStream,
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::BrokenPipe {
            return Self::EndOfStream;
        }
        Self::Io(Arc::new(error))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn broken_pipe_maps_to_end_of_stream() {
        let error = TransportError::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(matches!(error, TransportError::EndOfStream));
    }

    #[rstest]
    fn other_io_errors_are_wrapped() {
        let error = TransportError::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(error, TransportError::Io(_)));
    }

    #[rstest]
    fn spawn_failures_are_identified() {
        let not_found = DriverError::BinaryNotFound {
            command: String::from("iccdrvr.tsk"),
            source: Arc::new(io::Error::from(io::ErrorKind::NotFound)),
        };
        assert!(not_found.is_spawn_failure());
        assert!(!DriverError::ProcessNotRunning.is_spawn_failure());
    }

    #[rstest]
    fn not_permitted_names_the_operation() {
        let error = DriverError::NotPermitted {
            operation: "INITIALIZE",
        };
        assert_eq!(error.to_string(), "INITIALIZE is not permitted");
    }
}
