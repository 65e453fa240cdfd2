//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use icc_driver::{COMPOUND_TYPE, SecurityLevel, TimeoutSetting};

/// How a driver result is written.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Data lines on stdout and the status line on stderr.
    #[default]
    Human,
    /// The whole result as one JSON object on stdout.
    Json,
}

/// Selector for `GET` when no parameter names are given.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum SetArg {
    /// Every parameter.
    All,
    /// The standard parameter set.
    #[default]
    Std,
}

/// Runs one `iccdrvr.tsk` verb against a station.
#[derive(Parser, Debug)]
#[command(name = "icc", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Station letterbug to open before running the verb.
    #[arg(long, value_name = "LETTERBUG")]
    pub(crate) station: Option<String>,
    /// Security level requested when opening the station.
    #[arg(long, value_name = "LEVEL", default_value_t = SecurityLevel::Read)]
    pub(crate) security: SecurityLevel,
    /// Controls how the result is rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub(crate) output: OutputFormat,
    /// The verb to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// One subcommand per driver verb.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Reads parameters of compounds or blocks.
    Get {
        /// `COMPOUND[:BLOCK]` with `?` and `*` wildcards.
        spec: String,
        /// Parameter set to read when no names are listed.
        #[arg(long, value_enum, default_value_t = SetArg::Std, conflicts_with = "params")]
        set: SetArg,
        /// Read only these parameters.
        #[arg(value_name = "PARAM")]
        params: Vec<String>,
    },
    /// Lists compounds, or the blocks of a compound, in processing order.
    GetOrder {
        /// Compound whose blocks are listed.
        compound: Option<String>,
    },
    /// Writes sequence code files for a block.
    GetSeq {
        /// Block to export.
        spec: String,
        /// Output path without extension.
        base_path: String,
    },
    /// Describes the parameters of a block type.
    GetDef {
        /// Block type, or `CMPND` for compounds.
        #[arg(default_value = COMPOUND_TYPE)]
        block_type: String,
    },
    /// Lists stations or volumes.
    List {
        /// Driver switch selecting what is listed.
        #[arg(allow_hyphen_values = true)]
        switch: String,
    },
    /// Uploads settable parameters into the workfile.
    Upload {
        /// Restrict the upload to matching compounds or blocks.
        spec: Option<String>,
    },
    /// Checkpoints the open station.
    Checkpoint {
        /// Seconds to wait; 0 returns at once, negative uses the driver default.
        #[arg(long, allow_negative_numbers = true)]
        delay: Option<i32>,
    },
    /// Saves a compound and its blocks.
    Save {
        /// Compound to save.
        compound: String,
        /// Destination directory.
        path: String,
        /// Name of the saved file set.
        save_name: String,
    },
    /// Clears a checkpoint or volume lock.
    Override {
        /// Station whose lock is cleared.
        cp_name: String,
    },
    /// Sets how long the driver waits for input.
    Timeout {
        /// Seconds, 0 for no limit or -1 for no waiting.
        #[arg(allow_negative_numbers = true)]
        value: TimeoutSetting,
    },
    /// Reinitialises a station database. Always refused.
    Initialize {
        /// Station to reinitialise.
        cp_name: Option<String>,
    },
}
