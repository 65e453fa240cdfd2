//! Commands and their encoding on the driver's standard input.
//!
//! A command is a single line of space separated tokens. `GET ... subset`
//! is the one exception: the requested parameter names follow on their own
//! lines and the list is closed by [`SUBSET_SENTINEL`].

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use strum::{Display, IntoStaticStr};

use crate::error::DriverError;

/// Line closing a subset parameter list.
pub const SUBSET_SENTINEL: &str = "END";

/// Block type naming the compound meta-type for `GETDEF`.
pub const COMPOUND_TYPE: &str = "CMPND";

/// Longest user id the driver accepts.
pub const MAX_USER_ID_LEN: usize = 256;

/// Verbs understood by `iccdrvr.tsk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verb {
    /// Start a session with a station.
    Open,
    /// End the session with the open station.
    Close,
    /// Terminate the driver.
    Exit,
    /// Clear a checkpoint or volume lock.
    Override,
    /// Reinitialise a station database.
    Initialize,
    /// Read parameters of compounds or blocks.
    Get,
    /// List compounds, or blocks of a compound, in processing order.
    GetOrder,
    /// Generate sequence code files for a block.
    GetSeq,
    /// Describe the parameters of a block type.
    GetDef,
    /// List stations or volumes.
    List,
    /// Copy settable parameters from the station into the workfile.
    Upload,
    /// Persist the workfile to the checkpoint file.
    Checkpoint,
    /// Save a compound and its blocks to a directory.
    Save,
    /// Bound how long the driver waits for input.
    Timeout,
}

impl Verb {
    /// Wire spelling of the verb.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A verb, its argument tokens and any trailing payload lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: Verb,
    args: Vec<String>,
    payload: Option<Vec<String>>,
}

impl Command {
    /// Creates a command with no arguments.
    #[must_use]
    pub const fn new(verb: Verb) -> Self {
        Self {
            verb,
            args: Vec::new(),
            payload: None,
        }
    }

    /// Appends one argument token.
    #[must_use]
    pub fn arg(mut self, token: impl Into<String>) -> Self {
        self.args.push(token.into());
        self
    }

    /// Appends an argument token when present.
    #[must_use]
    pub fn arg_opt<S: Into<String>>(self, token: Option<S>) -> Self {
        match token {
            Some(value) => self.arg(value),
            None => self,
        }
    }

    /// Attaches payload lines sent after the command line and closed by
    /// [`SUBSET_SENTINEL`].
    #[must_use]
    pub fn payload(mut self, lines: Vec<String>) -> Self {
        self.payload = Some(lines);
        self
    }

    /// The command verb.
    #[must_use]
    pub const fn verb(&self) -> Verb {
        self.verb
    }

    /// Renders the bytes written to the driver's standard input.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidArgument`] when a token or payload line
    /// contains a line break, or when a payload line equals
    /// [`SUBSET_SENTINEL`]. Tokens are otherwise passed through unchanged,
    /// spaces included.
    pub fn encode(&self) -> Result<String, DriverError> {
        let mut wire = String::from(self.verb.as_str());
        for token in &self.args {
            validate_token(self.verb, token)?;
            wire.push(' ');
            wire.push_str(token);
        }
        wire.push('\n');

        if let Some(lines) = &self.payload {
            for line in lines {
                validate_payload_line(self.verb, line)?;
                wire.push_str(line);
                wire.push('\n');
            }
            wire.push_str(SUBSET_SENTINEL);
            wire.push('\n');
        }

        Ok(wire)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb.as_str())?;
        for token in &self.args {
            write!(f, " {token}")?;
        }
        Ok(())
    }
}

fn validate_token(verb: Verb, token: &str) -> Result<(), DriverError> {
    if token.contains(['\r', '\n']) {
        return Err(DriverError::invalid_argument(format!(
            "{verb} argument {token:?} must not contain a line break"
        )));
    }
    Ok(())
}

fn validate_payload_line(verb: Verb, line: &str) -> Result<(), DriverError> {
    if line.contains(['\r', '\n']) {
        return Err(DriverError::invalid_argument(format!(
            "{verb} payload line {line:?} must not contain a line break"
        )));
    }
    if line == SUBSET_SENTINEL {
        return Err(DriverError::invalid_argument(format!(
            "{verb} payload must not contain the {SUBSET_SENTINEL} sentinel"
        )));
    }
    Ok(())
}

/// Checks a user id against [`MAX_USER_ID_LEN`].
pub(crate) fn validate_user_id(user_id: &str) -> Result<(), DriverError> {
    let length = user_id.chars().count();
    if length > MAX_USER_ID_LEN {
        return Err(DriverError::invalid_argument(format!(
            "user id is {length} characters; the driver accepts at most {MAX_USER_ID_LEN}"
        )));
    }
    Ok(())
}

/// Which parameters `GET` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSet {
    /// Every parameter.
    All,
    /// The standard parameter set.
    Std,
    /// Only the named parameters.
    Subset(Vec<String>),
}

impl ParameterSet {
    /// Wire spelling of the set selector.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Std => "std",
            Self::Subset(_) => "subset",
        }
    }
}

/// Inactivity bound the driver applies to its own input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutSetting {
    /// Exit after this many seconds without input.
    Seconds(NonZeroU32),
    /// Wait for input indefinitely (`0`).
    Unbounded,
    /// Never wait for interactive input (`-1`).
    NoWait,
}

impl TimeoutSetting {
    /// Converts the driver's integer convention into a setting.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidArgument`] for values below `-1` or
    /// above `u32::MAX`.
    pub fn from_value(value: i64) -> Result<Self, DriverError> {
        match value {
            -1 => Ok(Self::NoWait),
            0 => Ok(Self::Unbounded),
            seconds => u32::try_from(seconds)
                .ok()
                .and_then(NonZeroU32::new)
                .map(Self::Seconds)
                .ok_or_else(|| {
                    DriverError::invalid_argument(format!(
                        "timeout {value} must be -1, 0 or a positive number of seconds"
                    ))
                }),
        }
    }

    /// Integer sent to the driver.
    #[must_use]
    pub fn value(self) -> i64 {
        match self {
            Self::Seconds(seconds) => i64::from(seconds.get()),
            Self::Unbounded => 0,
            Self::NoWait => -1,
        }
    }
}

impl FromStr for TimeoutSetting {
    type Err = DriverError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let value = text.trim().parse::<i64>().map_err(|error| {
            DriverError::invalid_argument(format!("timeout {text:?} is not an integer: {error}"))
        })?;
        Self::from_value(value)
    }
}
