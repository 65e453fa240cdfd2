//! Partitions a response batch into log and data lines.

use crate::error::DriverError;
use crate::result::{IccResult, StatusCode};
use crate::token::LogToken;

/// Builds an [`IccResult`] from the lines of one response batch.
///
/// Lines starting with a [`LogToken`] are log lines; everything else is
/// data. Both keep their relative order. The last log line is the status
/// line, and the status is a failure when it starts with `FAIL` or `FLSH`.
///
/// # Errors
///
/// Returns [`DriverError::ProtocolViolation`] when the batch holds no log
/// line, since there is then no status line to report.
pub fn classify<I>(lines: I) -> Result<IccResult, DriverError>
where
    I: IntoIterator<Item = String>,
{
    let mut data = Vec::new();
    let mut log = Vec::new();
    let mut last_token = None;

    for line in lines {
        match LogToken::from_prefix(&line) {
            Some(token) => {
                last_token = Some(token);
                log.push(line);
            }
            None => data.push(line),
        }
    }

    let (Some(token), Some(message)) = (last_token, log.last()) else {
        return Err(DriverError::ProtocolViolation {
            message: format!("response of {} line(s) has no log line", data.len()),
        });
    };

    let status = if token.is_failure() {
        StatusCode::Failure
    } else {
        StatusCode::Success
    };
    let message = message.clone();
    Ok(IccResult::new(data, log, message, status))
}
