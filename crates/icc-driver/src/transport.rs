//! Line framing over the driver's standard streams.
//!
//! The driver reads one command per line and answers with any number of
//! lines, the last of which starts with a terminal token:
//! ```text
//! ECHO OPEN CP1\n
//! DONE 0\n
//! ```
//! Both directions block. Reading waits until a terminal line or end of
//! stream, with no timeout of its own.

use std::io::{BufRead, Write};

use crate::command::Command;
use crate::error::{DriverError, TransportError};
use crate::token::LogToken;

/// Writes commands to and reads response batches from a pair of streams.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> LineTransport<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Creates a transport reading responses from `reader` and writing
    /// commands to `writer`.
    #[must_use]
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Encodes and writes one command, flushing immediately.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidArgument`] for tokens that would break
    /// framing (nothing is written in that case) and
    /// [`DriverError::Transport`] when the write fails.
    pub fn send(&mut self, command: &Command) -> Result<(), DriverError> {
        let wire = command.encode()?;
        self.writer
            .write_all(wire.as_bytes())
            .map_err(TransportError::from)?;
        self.writer.flush().map_err(TransportError::from)?;
        Ok(())
    }

    /// Reads lines until one starts with a terminal token.
    ///
    /// The terminal line is the last element of the returned batch. Lines
    /// are decoded as UTF-8, replacing invalid sequences, and trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::EndOfStream`] when the stream ends first and
    /// [`TransportError::Io`] when a read fails.
    pub fn receive(&mut self) -> Result<Vec<String>, TransportError> {
        let mut lines = Vec::new();
        let mut raw = Vec::new();
        loop {
            raw.clear();
            let bytes_read = self.reader.read_until(b'\n', &mut raw)?;
            if bytes_read == 0 {
                return Err(TransportError::EndOfStream);
            }

            let terminal = LogToken::from_prefix_bytes(&raw).is_some_and(LogToken::is_terminal);
            lines.push(String::from_utf8_lossy(&raw).trim().to_owned());
            if terminal {
                return Ok(lines);
            }
        }
    }

    /// Consumes the transport, returning the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
