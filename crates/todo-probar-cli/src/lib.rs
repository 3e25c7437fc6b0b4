//! Todo-Probador CLI library
//!
//! Command-line front end for the to-do list acceptance journey.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod runner;

pub use commands::{
    BackendArg, Cli, ColorArg, Commands, ConfigArgs, FormatArg, HarnessArgs, RunArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_tracing;
pub use output::{render_report, ProgressReporter};
pub use runner::{harness_config, JourneyRunner};
