//! The write/read cycle shared by every verb.

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::classifier::classify;
use crate::command::Command;
use crate::error::{DriverError, TransportError};
use crate::result::IccResult;
use crate::transcript::Transcript;
use crate::transport::LineTransport;

/// Log target for protocol exchanges.
pub(crate) const CLIENT_TARGET: &str = "icc_driver::client";

/// Something that can run one command and return its classified response.
///
/// [`Session`](crate::Session) is the production implementation. Tests
/// substitute scripted channels so the dispatcher can be exercised without
/// spawning a process.
pub trait CommandChannel {
    /// Sends `command` and blocks until its response batch is complete.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::ProcessNotRunning`] once the driver has gone
    /// away, [`DriverError::InvalidArgument`] for commands that cannot be
    /// framed, and [`DriverError::ProtocolViolation`] for batches without a
    /// status line.
    fn execute(&mut self, command: &Command) -> Result<IccResult, DriverError>;

    /// Whether further exchanges may succeed.
    fn is_running(&self) -> bool;
}

/// Runs the protocol over any reader/writer pair.
///
/// The client is strictly sequential: one command is written, then its
/// whole response is read, before the next command may be sent. A stream
/// failure leaves the client stopped and every later call fails with
/// [`DriverError::ProcessNotRunning`].
pub struct ProtocolClient<R, W> {
    transport: LineTransport<R, W>,
    transcript: Option<Transcript>,
    running: bool,
}

impl<R, W> ProtocolClient<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Creates a client over `transport`, optionally capturing responses.
    #[must_use]
    pub const fn new(transport: LineTransport<R, W>, transcript: Option<Transcript>) -> Self {
        Self {
            transport,
            transcript,
            running: true,
        }
    }

    /// Writes `command` without reading the response.
    ///
    /// # Errors
    ///
    /// See [`CommandChannel::execute`].
    pub fn send(&mut self, command: &Command) -> Result<(), DriverError> {
        self.ensure_running()?;
        match self.transport.send(command) {
            Err(DriverError::Transport(error)) => Err(self.stop(&error)),
            other => other,
        }
    }

    /// Reads one raw response batch.
    ///
    /// # Errors
    ///
    /// See [`CommandChannel::execute`].
    pub fn receive(&mut self) -> Result<Vec<String>, DriverError> {
        self.ensure_running()?;
        self.transport.receive().map_err(|error| self.stop(&error))
    }

    /// The transcript receiving raw batches, if capture is enabled.
    #[must_use]
    pub const fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_ref()
    }

    /// Marks the client stopped after its process was killed.
    pub(crate) fn mark_stopped(&mut self) {
        self.running = false;
    }

    fn ensure_running(&self) -> Result<(), DriverError> {
        if self.running {
            Ok(())
        } else {
            Err(DriverError::ProcessNotRunning)
        }
    }

    fn stop(&mut self, error: &TransportError) -> DriverError {
        self.running = false;
        match error {
            TransportError::EndOfStream => {
                warn!(
                    target: CLIENT_TARGET,
                    "driver output closed before a terminal token"
                );
                DriverError::ProcessNotRunning
            }
            TransportError::Io(_) => {
                warn!(
                    target: CLIENT_TARGET,
                    error = %error,
                    "driver stream failed"
                );
                DriverError::Transport(error.clone())
            }
        }
    }

    fn capture(&self, lines: &[String]) {
        let Some(transcript) = &self.transcript else {
            return;
        };
        if let Err(error) = transcript.append(lines) {
            warn!(
                target: CLIENT_TARGET,
                error = %error,
                "failed to append response to transcript"
            );
        }
    }
}

impl<R, W> CommandChannel for ProtocolClient<R, W>
where
    R: BufRead,
    W: Write,
{
    fn execute(&mut self, command: &Command) -> Result<IccResult, DriverError> {
        debug!(
            target: CLIENT_TARGET,
            verb = %command.verb(),
            command = %command,
            "sending command"
        );
        self.send(command)?;
        let lines = self.receive()?;
        let classified = classify(lines.iter().cloned());
        self.capture(&lines);
        let result = classified?;

        debug!(
            target: CLIENT_TARGET,
            verb = %command.verb(),
            lines = lines.len(),
            status = result.status().code(),
            "received response"
        );
        if !result.is_success() {
            info!(
                target: CLIENT_TARGET,
                verb = %command.verb(),
                status_line = result.message(),
                "driver reported failure"
            );
        }
        Ok(result)
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;

    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::command::Verb;
    use crate::result::StatusCode;

    type MemoryClient = ProtocolClient<Cursor<Vec<u8>>, Vec<u8>>;

    fn client(responses: &str) -> MemoryClient {
        let transport = LineTransport::new(Cursor::new(responses.as_bytes().to_vec()), Vec::new());
        ProtocolClient::new(transport, None)
    }

    #[rstest]
    fn executes_open_exchange() {
        let mut client = client("ECHO OPEN CP1\nDONE 0\n");
        let command = Command::new(Verb::Open)
            .arg("CP1")
            .arg("READ")
            .arg("tester");

        let result = client.execute(&command).expect("execute");

        assert!(result.data().is_empty());
        assert_eq!(result.log(), ["ECHO OPEN CP1", "DONE 0"]);
        assert_eq!(result.status(), StatusCode::Success);
    }

    #[rstest]
    fn failure_status_is_not_an_error() {
        let mut client = client("FAIL Invalid station\n");

        let result = client
            .execute(&Command::new(Verb::Upload))
            .expect("execute");

        assert_eq!(result.log(), ["FAIL Invalid station"]);
        assert_eq!(result.status().code(), 1);
        assert!(client.is_running());
    }

    #[rstest]
    fn end_of_stream_stops_the_client() {
        let mut client = client("ECHO GET\n");

        let first = client.execute(&Command::new(Verb::GetOrder));
        let second = client.execute(&Command::new(Verb::GetOrder));

        assert!(matches!(first, Err(DriverError::ProcessNotRunning)));
        assert!(matches!(second, Err(DriverError::ProcessNotRunning)));
        assert!(!client.is_running());
    }

    #[rstest]
    fn invalid_arguments_leave_the_client_running() {
        let mut client = client("DONE 0\n");

        let error = client
            .execute(&Command::new(Verb::GetDef).arg("PID\nA"))
            .expect_err("should reject");

        assert!(matches!(error, DriverError::InvalidArgument { .. }));
        assert!(client.is_running());
        assert!(client.execute(&Command::new(Verb::GetDef).arg("PIDA")).is_ok());
    }

    #[rstest]
    fn captures_raw_batches_in_transcript() {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("session.txt"))
            .unwrap_or_else(|path| panic!("non-UTF-8 temp path: {}", path.display()));
        let transport = LineTransport::new(
            Cursor::new(b"PARAM1=10\nDONE 0\nFAIL nope\n".to_vec()),
            Vec::new(),
        );
        let mut client = ProtocolClient::new(transport, Some(Transcript::new(path.clone())));

        client
            .execute(&Command::new(Verb::Get).arg("CP1:").arg("std"))
            .expect("first");
        client.execute(&Command::new(Verb::Upload)).expect("second");

        let content = fs::read_to_string(&path).expect("read transcript");
        assert_eq!(content, "\nPARAM1=10\nDONE 0\nFAIL nope");
        assert_eq!(client.transcript().map(Transcript::path), Some(path.as_path()));
    }

    #[rstest]
    fn transcript_failure_still_returns_result() {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("missing").join("t.txt"))
            .unwrap_or_else(|path| panic!("non-UTF-8 temp path: {}", path.display()));
        let transport = LineTransport::new(
            Cursor::new(b"PARAM1=10\nFAIL Invalid station\n".to_vec()),
            Vec::new(),
        );
        let mut client = ProtocolClient::new(transport, Some(Transcript::new(path.clone())));

        let result = client
            .execute(&Command::new(Verb::Upload))
            .expect("result despite transcript failure");

        assert_eq!(result.data(), ["PARAM1=10"]);
        assert_eq!(result.log(), ["FAIL Invalid station"]);
        assert_eq!(result.status(), StatusCode::Failure);
        assert!(client.is_running());
        assert!(!path.exists());
    }

    #[rstest]
    fn writes_each_command_before_reading() {
        let mut client = client("DONE 0\nDONE 0\n");

        client.execute(&Command::new(Verb::Close)).expect("close");
        client.execute(&Command::new(Verb::Exit)).expect("exit");

        let (_, written) = client.transport.into_inner();
        assert_eq!(String::from_utf8(written).expect("utf8"), "CLOSE\nEXIT\n");
    }
}
