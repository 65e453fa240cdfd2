//! Ownership of one `iccdrvr.tsk` process.
//!
//! The driver is spawned with a piped standard input and with standard
//! output and standard error sharing a single pipe, so diagnostics and data
//! arrive interleaved in the order the driver wrote them. No console window
//! is created on Windows.
//!
//! Dropping a [`Session`] reaps the process, killing it after a short grace
//! period if it has not exited. Callers normally end the protocol session
//! first through [`IccDriver`](crate::IccDriver), which sends `CLOSE` and
//! `EXIT` before the process is released.

mod counter;
mod lifecycle;

use std::io::{self, BufReader, BufWriter, PipeReader};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::Arc;

use tracing::debug;

pub use counter::SessionCounter;

use crate::client::{CommandChannel, ProtocolClient};
use crate::command::Command as DriverCommand;
use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::result::IccResult;
use crate::transcript::Transcript;
use crate::transport::LineTransport;

/// Log target for process management.
pub(crate) const SESSION_TARGET: &str = "icc_driver::session";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

type PipeClient = ProtocolClient<BufReader<PipeReader>, BufWriter<ChildStdin>>;

/// A running driver process and the protocol client bound to its pipes.
pub struct Session {
    ordinal: u64,
    child: Child,
    client: PipeClient,
}

impl Session {
    /// Spawns the driver, counting it against [`SessionCounter::global`].
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::BinaryNotFound`] when the executable does not
    /// exist and [`DriverError::SpawnFailed`] for any other launch failure.
    pub fn spawn(config: &DriverConfig) -> Result<Self, DriverError> {
        Self::spawn_with_counter(config, SessionCounter::global())
    }

    /// Spawns the driver, counting it against `counter`.
    ///
    /// # Errors
    ///
    /// See [`Session::spawn`].
    pub fn spawn_with_counter(
        config: &DriverConfig,
        counter: &SessionCounter,
    ) -> Result<Self, DriverError> {
        debug!(
            target: SESSION_TARGET,
            command = %config.command.display(),
            args = ?config.args,
            "spawning driver process"
        );

        let (output_reader, output_writer) =
            io::pipe().map_err(|source| spawn_failed("failed to create output pipe", source))?;
        let error_writer = output_writer
            .try_clone()
            .map_err(|source| spawn_failed("failed to share output pipe", source))?;

        let mut command = Command::new(&config.command);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(output_writer)
            .stderr(error_writer);
        if let Some(dir) = &config.working_dir {
            command.current_dir(dir);
        }
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let spawned = command.spawn();
        // The command holds the parent's copies of the write end; the reader
        // only sees end of stream once they are closed.
        drop(command);

        let mut child = spawned.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                DriverError::BinaryNotFound {
                    command: config.command.display().to_string(),
                    source: Arc::new(source),
                }
            } else {
                spawn_failed(
                    &format!("failed to start {}", config.command.display()),
                    source,
                )
            }
        })?;

        let Some(stdin) = child.stdin.take() else {
            lifecycle::kill_child(&mut child);
            return Err(spawn_failed(
                "failed to capture stdin",
                io::Error::other("no stdin"),
            ));
        };

        let transport = LineTransport::new(BufReader::new(output_reader), BufWriter::new(stdin));
        let transcript = config.transcript.clone().map(Transcript::new);
        let ordinal = counter.record();

        debug!(
            target: SESSION_TARGET,
            pid = child.id(),
            session = ordinal,
            transcript = ?config.transcript,
            "driver process spawned"
        );

        Ok(Self {
            ordinal,
            child,
            client: ProtocolClient::new(transport, transcript),
        })
    }

    /// Operating system id of the driver process.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// One-based position of this session in its [`SessionCounter`].
    #[must_use]
    pub const fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// Whether the process has not yet exited.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Kills the process without any protocol exchange.
    ///
    /// Intended for cleanup when `EXIT` could not be delivered. Every later
    /// exchange fails with [`DriverError::ProcessNotRunning`].
    pub fn terminate(&mut self) {
        lifecycle::kill_child(&mut self.child);
        self.client.mark_stopped();
    }
}

impl CommandChannel for Session {
    fn execute(&mut self, command: &DriverCommand) -> Result<IccResult, DriverError> {
        self.client.execute(command)
    }

    fn is_running(&self) -> bool {
        self.client.is_running()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        lifecycle::terminate_child(&mut self.child);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("ordinal", &self.ordinal)
            .field("pid", &self.child.id())
            .field("running", &self.client.is_running())
            .finish_non_exhaustive()
    }
}

fn spawn_failed(message: &str, source: io::Error) -> DriverError {
    DriverError::SpawnFailed {
        message: message.to_owned(),
        source: Arc::new(source),
    }
}
