//! Scripted channel standing in for a driver process.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::classifier::classify;
use crate::client::CommandChannel;
use crate::command::Command;
use crate::error::DriverError;
use crate::result::IccResult;

/// Wire text of every command a [`ScriptedChannel`] received, shared so it
/// outlives the channel.
pub type SentLog = Rc<RefCell<Vec<String>>>;

/// Replays canned response batches in order.
///
/// Once the script runs out the channel behaves like a driver whose output
/// closed: the pending exchange and every later one fail with
/// [`DriverError::ProcessNotRunning`].
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    responses: VecDeque<Vec<String>>,
    sent: SentLog,
    stopped: bool,
}

impl ScriptedChannel {
    /// Creates a channel recording into `sent`.
    pub fn new(sent: SentLog) -> Self {
        Self {
            sent,
            ..Self::default()
        }
    }

    /// Queues a response batch given as newline-separated lines.
    pub fn respond(&mut self, batch: &str) {
        self.responses
            .push_back(batch.lines().map(str::to_owned).collect());
    }
}

impl CommandChannel for ScriptedChannel {
    fn execute(&mut self, command: &Command) -> Result<IccResult, DriverError> {
        if self.stopped {
            return Err(DriverError::ProcessNotRunning);
        }
        let wire = command.encode()?;
        self.sent.borrow_mut().push(wire);
        let Some(batch) = self.responses.pop_front() else {
            self.stopped = true;
            return Err(DriverError::ProcessNotRunning);
        };
        classify(batch)
    }

    fn is_running(&self) -> bool {
        !self.stopped
    }
}
