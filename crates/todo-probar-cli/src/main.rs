//! Todo-Probador: run the to-do list acceptance journey
//!
//! ## Usage
//!
//! ```bash
//! todo-probador run                                  # Chromium against the default URL
//! todo-probador run --url http://localhost:8080/     # Another deployment
//! todo-probador run --format junit -o report.xml     # CI report
//! todo-probador run --backend mock --fault delete-noop
//! todo-probador config -c todo.yaml                  # Effective configuration
//! ```
//!
//! Exit status: 0 when no defects were found, 1 when defects were found,
//! 2 when the run itself could not complete. A run cut short mid-journey
//! still prints the defects it found before the error.

use clap::Parser;
use std::process::ExitCode;
use todo_probar_cli::{
    harness_config, init_tracing, render_report, Cli, CliConfig, CliError, CliResult,
    ColorChoice, Commands, ConfigArgs, JourneyRunner, RunArgs, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the journey found no defects
fn run() -> CliResult<bool> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    match config.color {
        ColorChoice::Always => console::set_colors_enabled(true),
        ColorChoice::Never => console::set_colors_enabled(false),
        ColorChoice::Auto => {}
    }
    init_tracing(config.verbosity, config.color.should_color(), cli.log_json);

    match cli.command {
        Commands::Run(args) => run_journey(config, &args),
        Commands::Config(args) => {
            run_config(&args)?;
            Ok(true)
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn run_journey(config: CliConfig, args: &RunArgs) -> CliResult<bool> {
    let config = config
        .with_format(args.format.into())
        .with_output(args.output.clone());
    let harness = harness_config(&args.harness)?;

    let mut runner = JourneyRunner::new(config.clone());
    let report = runner.run(&harness, args.backend, &args.faults)?;

    if let Some(path) = &config.output {
        report
            .write_to(path, config.format)
            .map_err(|e| CliError::report_generation(format!("{}: {e}", path.display())))?;
        runner
            .reporter()
            .info(&format!("Report written to {}", path.display()));
        if !config.verbosity.is_quiet() {
            eprintln!("{}", report.summary);
        }
    } else {
        let body = render_report(&report, config.format, config.color.should_color())?;
        print!("{body}");
    }

    if let Some(reason) = &report.aborted {
        return Err(CliError::journey_execution(reason.clone()));
    }
    Ok(report.passed())
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let harness = harness_config(&args.harness)?;
    print!("{}", harness.to_yaml()?);
    Ok(())
}
