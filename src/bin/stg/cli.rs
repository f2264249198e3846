//! CLI argument parsing for the `stg` binary, in the shape of
//! `y_lang`'s `bin/why/cli.rs`.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Specify the log level of the interpreter.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of `stg`.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// Also log warnings.
    #[value(alias("1"))]
    Warn,

    /// Also log information about each run (file loaded, step count, result).
    #[value(alias("2"))]
    Info,

    /// Log every step the machine takes.
    #[value(alias("3"))]
    Debug,

    /// Log extra internal detail on top of `Debug`.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run an STG source file to completion and print the final state.
    Run(RunArgs),

    /// Run an STG source file, printing every intermediate machine state.
    Trace(RunArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// The path to the STG source file.
    #[arg(index = 1)]
    pub file: std::path::PathBuf,
}
