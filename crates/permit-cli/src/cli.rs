//! CLI argument definitions.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use permit_cli::logging::{LogConfig, LogFormat};
use permit_model::Frequency;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "permits",
    version,
    about = "Seasonal adjustment of building-permit statistics",
    long_about = "Normalize building-permit CSV tables into series and seasonally adjust\n\
                  each one with the X-13ARIMA-SEATS engine.\n\n\
                  Domain layouts, engine location and adjustment options come from a TOML run file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging setup from the global flags. `--log-level` beats `-v`/`-q`,
    /// and either one disables `RUST_LOG`.
    pub fn log_config(&self) -> LogConfig {
        let explicit = self.verbosity.is_present() || self.log_level.is_some();
        LogConfig {
            level_filter: self
                .log_level
                .map_or_else(|| self.verbosity.tracing_level_filter(), LevelFilter::from),
            use_env_filter: !explicit,
            format: self.log_format.into(),
            log_file: self.log_file.clone(),
            with_ansi: match self.color.color {
                ColorChoice::Always => true,
                ColorChoice::Never => false,
                ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
            },
            ..LogConfig::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Adjust every series of the configured domains.
    Run(RunArgs),

    /// List the series each domain produces.
    Series(SeriesArgs),

    /// Combine engine artifacts from a directory into one ordered table.
    Aggregate(AggregateArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// TOML run file.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Only these domains (repeatable). All domains when omitted.
    #[arg(long = "domain", value_name = "NAME")]
    pub domains: Vec<String>,

    /// Engine executable, overriding `engine.binary`.
    #[arg(long = "binary", value_name = "PATH")]
    pub binary: Option<PathBuf>,

    /// Output directory, overriding `output.dir`.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Error trace directory, overriding `output.errors_dir`.
    #[arg(long = "errors-dir", value_name = "DIR")]
    pub errors_dir: Option<PathBuf>,

    /// Series adjusted in parallel.
    #[arg(long = "jobs", short = 'j', value_name = "N", default_value_t = 1)]
    pub jobs: usize,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Parser)]
pub struct SeriesArgs {
    /// TOML run file.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Only these domains (repeatable).
    #[arg(long = "domain", value_name = "NAME")]
    pub domains: Vec<String>,
}

#[derive(Parser)]
pub struct AggregateArgs {
    /// Directory holding the engine artifacts.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Artifact extension to collect, e.g. `d11` or `saa`.
    #[arg(long = "extension", short = 'e', value_name = "EXT")]
    pub extension: String,

    /// File listing the column order, one entry per line.
    #[arg(long = "order", value_name = "PATH")]
    pub order: PathBuf,

    /// Output file (default: x13results_<EXT>.csv in the current directory).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Period layout of the artifacts.
    #[arg(long = "frequency", value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Monthly,
    Quarterly,
}

impl From<FrequencyArg> for Frequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Monthly => Self::Monthly,
            FrequencyArg::Quarterly => Self::Quarterly,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
