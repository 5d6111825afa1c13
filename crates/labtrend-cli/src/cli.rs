//! CLI argument definitions for labtrend.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use labtrend_cli::logging::LogFormat;
use labtrend_core::DecimalConvention;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "labtrend",
    version,
    about = "Extract laboratory results from rendered hospital reports into a history store",
    long_about = "Extract laboratory results from rendered hospital reports.\n\n\
                  Reads HTML (pdf2htmlEX), plain-text and semicolon-export renderings,\n\
                  and merges every result into a per-test history stored as JSON."
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

    /// Allow report line text in log output (contains patient data).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract every report in a folder and merge the results into the store.
    Run(RunArgs),

    /// List the line shapes in the order they are tried.
    Shapes,

    /// Print the stored history.
    Show(ShowArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Folder containing rendered reports (.html, .htm, .txt, .csv).
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// History store file (default: <INPUT_DIR>/data.json).
    #[arg(long = "store", value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Keep one history per patient and merge into this patient's history.
    #[arg(long = "patient", value_name = "ID")]
    pub patient: Option<String>,

    /// Decimal separator used by the reports.
    #[arg(long = "decimal", value_enum, default_value = "comma")]
    pub decimal: DecimalArg,

    /// Encoding used when detection is not confident enough.
    #[arg(long = "fallback-encoding", value_name = "LABEL", default_value = "windows-1254")]
    pub fallback_encoding: String,

    /// Minimum encoding detection confidence (0.0 - 1.0).
    #[arg(long = "min-confidence", value_name = "FLOAT", default_value_t = 0.80)]
    pub min_confidence: f32,

    /// Number of leading lines searched for the report date.
    #[arg(long = "header-lines", value_name = "N", default_value_t = 40)]
    pub header_lines: usize,

    /// Extract and report without writing the store.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// History store file.
    #[arg(long = "store", value_name = "PATH")]
    pub store: PathBuf,

    /// Read a per-patient store and show this patient.
    #[arg(long = "patient", value_name = "ID")]
    pub patient: Option<String>,

    /// Only show this test.
    #[arg(long = "test", value_name = "NAME")]
    pub test: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DecimalArg {
    Comma,
    Dot,
}

impl From<DecimalArg> for DecimalConvention {
    fn from(arg: DecimalArg) -> Self {
        match arg {
            DecimalArg::Comma => Self::Comma,
            DecimalArg::Dot => Self::Dot,
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

impl From<LogLevelArg> for LevelFilter {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
