//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use icc_driver::DriverError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("failed to serialise result: {0}")]
    SerialiseResult(serde_json::Error),
    #[error("failed to write result: {0}")]
    WriteOutput(io::Error),
}
