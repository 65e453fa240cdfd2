//! Command-line runtime for the `iccdrvr.tsk` session client.
//!
//! One invocation loads configuration, installs telemetry, spawns a driver
//! session, optionally opens a station, runs a single verb and prints the
//! result. The session is closed and exited on every path. The exit code is
//! success only when the driver reported status 0.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use icc_config::Config;
use icc_driver::{
    DriverConfig, DriverError, IccDriver, IccResult, ParameterSet, Verb, with_driver,
};
use tracing::debug;

mod cli;
mod config;
mod errors;
mod output;
mod telemetry;

pub use cli::OutputFormat;
use cli::{Cli, CliCommand, SetArg};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use errors::AppError;
use output::render_result;

const CLI_TARGET: &str = "icc_cli";

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let result = Cli::try_parse_from(split.cli_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            loader
                .load(&split.config_arguments)
                .map(|config| (cli, config))
        })
        .and_then(|(cli, config)| {
            telemetry::initialise(&config)?;
            execute(cli, &config, stdout, stderr)
        });

    match result {
        Ok(exit_code) => exit_code,
        // Help and version requests.
        Err(AppError::CliUsage(error)) if !error.use_stderr() => match write!(stdout, "{error}") {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        },
        Err(error) => {
            if let Err(write_error) = writeln!(stderr, "{error}") {
                debug!(
                    target: CLI_TARGET,
                    error = %write_error,
                    "failed to report error"
                );
            }
            ExitCode::FAILURE
        }
    }
}

fn execute<W, E>(
    cli: Cli,
    config: &Config,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<ExitCode, AppError>
where
    W: Write,
    E: Write,
{
    if matches!(cli.command, CliCommand::Initialize { .. }) {
        return Err(DriverError::NotPermitted {
            operation: Verb::Initialize.as_str(),
        }
        .into());
    }

    let driver_config = DriverConfig::from_config(config);
    debug!(
        target: CLI_TARGET,
        driver = %driver_config.command.display(),
        station = cli.station.as_deref().unwrap_or_default(),
        "starting driver session"
    );

    let station = cli.station;
    let security = cli.security;
    let command = cli.command;
    let result = with_driver(&driver_config, |driver| {
        if let Some(letterbug) = station.as_deref() {
            let opened = driver.open(letterbug, security)?;
            if !opened.is_success() {
                return Ok(opened);
            }
        }
        dispatch(driver, command)
    })?;

    render_result(&result, cli.output, stdout, stderr)?;
    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn dispatch(driver: &mut IccDriver, command: CliCommand) -> Result<IccResult, DriverError> {
    match command {
        CliCommand::Get { spec, set, params } => {
            let parameters = if params.is_empty() {
                match set {
                    SetArg::All => ParameterSet::All,
                    SetArg::Std => ParameterSet::Std,
                }
            } else {
                ParameterSet::Subset(params)
            };
            driver.get(&spec, parameters)
        }
        CliCommand::GetOrder { compound } => driver.get_order(compound.as_deref()),
        CliCommand::GetSeq { spec, base_path } => driver.get_seq(&spec, &base_path),
        CliCommand::GetDef { block_type } => driver.get_def(&block_type),
        CliCommand::List { switch } => driver.list(&switch),
        CliCommand::Upload { spec } => driver.upload(spec.as_deref()),
        CliCommand::Checkpoint { delay } => driver.checkpoint(delay),
        CliCommand::Save {
            compound,
            path,
            save_name,
        } => driver.save(&compound, &path, &save_name),
        CliCommand::Override { cp_name } => driver.override_lock(&cp_name),
        CliCommand::Timeout { value } => driver.timeout(value),
        CliCommand::Initialize { cp_name } => driver.initialize(cp_name.as_deref()),
    }
}

#[cfg(test)]
mod tests;
