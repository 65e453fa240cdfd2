//! Termination of driver processes.

use std::process::Child;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::SESSION_TARGET;

/// How long a driver may take to exit on its own before it is killed.
const EXIT_GRACE_PERIOD: Duration = Duration::from_millis(200);

/// Interval between exit checks during the grace period.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Reaps the child, killing it if it has not exited within a short grace
/// period.
pub(super) fn terminate_child(child: &mut Child) {
    let pid = child.id();
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(target: SESSION_TARGET, pid, ?status, "driver exited");
        }
        Ok(None) => {
            debug!(
                target: SESSION_TARGET,
                pid,
                "driver still running, waiting before killing"
            );
            kill_after_grace_period(child);
        }
        Err(error) => {
            warn!(
                target: SESSION_TARGET,
                pid,
                error = %error,
                "failed to check driver status, waiting before killing"
            );
            kill_after_grace_period(child);
        }
    }
}

/// Kills and reaps the child immediately.
pub(super) fn kill_child(child: &mut Child) {
    let pid = child.id();
    if let Err(error) = child.kill() {
        // The process may already have exited; reaping below still applies.
        debug!(target: SESSION_TARGET, pid, error = %error, "kill failed");
    }
    match child.wait() {
        Ok(status) => debug!(target: SESSION_TARGET, pid, ?status, "driver reaped"),
        Err(error) => warn!(
            target: SESSION_TARGET,
            pid,
            error = %error,
            "failed to reap driver"
        ),
    }
}

fn kill_after_grace_period(child: &mut Child) {
    let deadline = Instant::now() + EXIT_GRACE_PERIOD;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(
                    target: SESSION_TARGET,
                    pid = child.id(),
                    ?status,
                    "driver exited during grace period"
                );
                return;
            }
            Ok(None) if Instant::now() < deadline => thread::sleep(POLL_INTERVAL),
            Ok(None) | Err(_) => {
                warn!(
                    target: SESSION_TARGET,
                    pid = child.id(),
                    "driver did not exit, killing"
                );
                kill_child(child);
                return;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::{Command, Stdio};

    use rstest::rstest;

    use super::*;

    fn shell(script: &str) -> Child {
        Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .expect("spawn sh")
    }

    #[rstest]
    fn reaps_a_child_that_exits_within_the_grace_period() {
        let mut child = shell("read -r line; exit 3");
        drop(child.stdin.take());
        let started = Instant::now();

        terminate_child(&mut child);

        assert!(started.elapsed() < EXIT_GRACE_PERIOD);
        let status = child.try_wait().expect("status").expect("reaped");
        assert_eq!(status.code(), Some(3));
    }

    #[rstest]
    fn kills_a_child_that_outlives_the_grace_period() {
        let mut child = shell("exec sleep 30");
        let started = Instant::now();

        terminate_child(&mut child);

        assert!(started.elapsed() >= EXIT_GRACE_PERIOD);
        let status = child.try_wait().expect("status").expect("reaped");
        assert_eq!(status.code(), None);
    }
}
