//! Runtime tests with configuration injected through [`ConfigLoader`].

use std::ffi::OsString;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use rstest::rstest;

use super::*;

struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn run_with_config(config: Config, args: &[&str]) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let argv = std::iter::once("icc")
        .chain(args.iter().copied())
        .map(OsString::from);
    let exit = run_with_loader(
        argv,
        &mut stdout,
        &mut stderr,
        &StaticConfigLoader::new(config),
    );
    Outcome {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

fn missing_driver() -> Config {
    Config {
        driver_path: Utf8PathBuf::from("/nonexistent/iccdrvr.tsk"),
        ..Config::default()
    }
}

#[rstest]
fn initialize_is_refused_before_spawning() {
    let outcome = run_with_config(missing_driver(), &["initialize", "CP1"]);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("INITIALIZE is not permitted"));
    assert!(outcome.stdout.is_empty());
}

#[rstest]
fn missing_driver_is_reported() {
    let outcome = run_with_config(missing_driver(), &["get-order"]);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("driver executable not found"));
}

#[rstest]
fn help_goes_to_stdout() {
    let outcome = run_with_config(missing_driver(), &["--help"]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("Usage"));
}

#[rstest]
fn usage_errors_go_to_stderr() {
    let outcome = run_with_config(missing_driver(), &["get"]);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(!outcome.stderr.is_empty());
}

#[cfg(unix)]
mod fake_driver {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::{Mutex, MutexGuard};

    use tempfile::TempDir;

    use super::*;

    // Serialises script creation against process spawning so no forked
    // child holds the script open for writing when it is executed.
    static SPAWN_LOCK: Mutex<()> = Mutex::new(());

    const SCRIPT: &str = r#"#!/bin/sh
while IFS= read -r line; do
  set -- $line
  case "$1" in
    OPEN) echo "ECHO OPEN $2"; echo "DONE 0" ;;
    CLOSE|EXIT) echo "DONE 0" ;;
    GET) echo "PARAM1=10"; echo "PARAM2=20"; echo "DONE 0" ;;
    UPLOAD) echo "FAIL Invalid station" ;;
    *) echo "FAIL unknown verb $1" ;;
  esac
  [ "$1" = EXIT ] && exit 0
done
"#;

    struct Driver {
        _dir: TempDir,
        config: Config,
        _lock: MutexGuard<'static, ()>,
    }

    fn driver() -> Driver {
        let lock = SPAWN_LOCK
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("iccdrvr.sh");
        fs::write(&path, SCRIPT).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        let driver_path = Utf8PathBuf::from_path_buf(path)
            .unwrap_or_else(|path| panic!("non-UTF-8 temp path: {}", path.display()));
        Driver {
            _dir: dir,
            config: Config {
                driver_path,
                ..Config::default()
            },
            _lock: lock,
        }
    }

    #[rstest]
    fn prints_data_lines_and_status() {
        let driver = driver();

        let outcome = run_with_config(driver.config.clone(), &["--station", "CP1", "get", "CP1:"]);

        assert_eq!(outcome.exit, ExitCode::SUCCESS);
        assert_eq!(outcome.stdout, "PARAM1=10\nPARAM2=20\n");
        assert_eq!(outcome.stderr, "DONE 0\n");
    }

    #[rstest]
    fn failure_status_fails_the_process() {
        let driver = driver();

        let outcome = run_with_config(driver.config.clone(), &["--station", "CP1", "upload"]);

        assert_eq!(outcome.exit, ExitCode::FAILURE);
        assert!(outcome.stdout.is_empty());
        assert_eq!(outcome.stderr, "FAIL Invalid station\n");
    }

    #[rstest]
    fn json_output_carries_the_status() {
        let driver = driver();

        let outcome = run_with_config(driver.config.clone(), &["--output", "json", "upload"]);

        let value: serde_json::Value =
            serde_json::from_str(&outcome.stdout).expect("json result");
        assert_eq!(value["status"], 1);
        assert_eq!(value["message"], "FAIL Invalid station");
        assert_eq!(outcome.exit, ExitCode::FAILURE);
    }
}
