//! Framing tokens and security levels understood by `iccdrvr.tsk`.
//!
//! Every diagnostic line the driver writes starts with a four character
//! token. Three of them also terminate a response batch.

use strum::{Display, EnumString, IntoStaticStr};

/// Width of the token prefix on every log line.
pub const TOKEN_LEN: usize = 4;

/// Four character prefixes marking diagnostic lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LogToken {
    /// Echo of the command the driver received.
    Echo,
    /// Non-fatal warning.
    Warn,
    /// The driver flushed the command; terminal, reported as failure.
    Flsh,
    /// The command failed; terminal.
    Fail,
    /// The command completed; terminal.
    Done,
}

const LOG_TOKENS: [(&str, LogToken); 5] = [
    ("ECHO", LogToken::Echo),
    ("WARN", LogToken::Warn),
    ("FLSH", LogToken::Flsh),
    ("FAIL", LogToken::Fail),
    ("DONE", LogToken::Done),
];

impl LogToken {
    /// Looks up the token at the start of `line`.
    ///
    /// Returns `None` for data lines, including lines shorter than
    /// [`TOKEN_LEN`].
    #[must_use]
    pub fn from_prefix(line: &str) -> Option<Self> {
        Self::from_prefix_bytes(line.as_bytes())
    }

    /// Byte-level variant of [`LogToken::from_prefix`] used on raw reads.
    #[must_use]
    pub fn from_prefix_bytes(line: &[u8]) -> Option<Self> {
        let prefix = line.get(..TOKEN_LEN)?;
        LOG_TOKENS
            .iter()
            .find(|(text, _)| text.as_bytes() == prefix)
            .map(|(_, token)| *token)
    }

    /// Wire spelling of the token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Whether the token ends a response batch.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Flsh | Self::Fail | Self::Done)
    }

    /// Whether the token reports a failed command.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Flsh | Self::Fail)
    }
}

/// Access tier requested when opening a station.
///
/// Tiers are ordered: each grants everything the previous one does. The
/// driver enforces them; this crate only transports the token.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum SecurityLevel {
    /// Read-only verbs such as `LIST` and `GETDEF`.
    #[default]
    #[strum(serialize = "READ")]
    Read,
    /// Read plus `CHECKPOINT`.
    #[strum(serialize = "CHKPT")]
    Checkpoint,
    /// Checkpoint plus `UPLOAD`.
    #[strum(serialize = "UPLOAD")]
    Upload,
    /// Upload plus modification verbs.
    #[strum(serialize = "MODIFY")]
    Modify,
    /// Everything, including deletes and station initialisation.
    #[strum(serialize = "ALL")]
    All,
}

impl SecurityLevel {
    /// Wire spelling of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Errors produced when parsing a [`SecurityLevel`] from text.
pub type SecurityLevelParseError = strum::ParseError;
