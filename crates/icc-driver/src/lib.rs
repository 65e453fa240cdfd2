//! Session and protocol client for the `iccdrvr.tsk` configurator driver.
#![deny(missing_docs)]
//!
//! The crate spawns the driver with standard error merged into standard
//! output, writes one command line at a time, and reads lines until a
//! terminal token (`FLSH`, `FAIL` or `DONE`) closes the response batch. Each
//! batch is split into data and log lines and summarised as an
//! [`IccResult`]. [`IccDriver`] layers the driver's verbs over any
//! [`CommandChannel`], so tests can script responses without a process.

mod classifier;
mod client;
mod command;
mod config;
mod driver;
mod error;
mod result;
mod session;
mod token;
mod transcript;
mod transport;

pub use classifier::classify;
pub use client::{CommandChannel, ProtocolClient};
pub use command::{
    COMPOUND_TYPE, Command, MAX_USER_ID_LEN, ParameterSet, SUBSET_SENTINEL, TimeoutSetting, Verb,
};
pub use config::DriverConfig;
pub use driver::{IccDriver, with_driver};
pub use error::{DriverError, TransportError};
pub use result::{IccResult, StatusCode};
pub use session::{Session, SessionCounter};
pub use token::{LogToken, SecurityLevel, SecurityLevelParseError, TOKEN_LEN};
pub use transcript::Transcript;
pub use transport::LineTransport;

#[cfg(test)]
mod tests;
