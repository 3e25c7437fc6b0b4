//! Journey runner
//!
//! Owns the session lifecycle around the library journey: build the harness
//! configuration, start the selected backend, run, and always close the
//! session before returning.

use crate::commands::{BackendArg, HarnessArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use todo_probar::{
    run_journey, HarnessConfig, JourneyReport, MockFault, MockTodoApp, ProbarResult, TodoDriver,
};
use tracing::{info, warn};

/// Build the harness configuration: file first, then flags and env on top
pub fn harness_config(args: &HarnessArgs) -> CliResult<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(url) = &args.url {
        config.url.clone_from(url);
    }
    if let Some(path) = &args.chromium_path {
        config.browser.chromium_path = Some(path.display().to_string());
    }
    if args.headed {
        config.browser.headless = false;
    }
    if args.no_sandbox {
        config.browser.sandbox = false;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.wait.timeout_ms = timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

/// Runs one journey against the selected backend
#[derive(Debug)]
pub struct JourneyRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl JourneyRunner {
    /// Create a new runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Run the journey to completion.
    ///
    /// Defects are in the returned report; errors mean the run itself failed.
    pub fn run(
        &mut self,
        harness: &HarnessConfig,
        backend: BackendArg,
        faults: &[MockFault],
    ) -> CliResult<JourneyReport> {
        if !faults.is_empty() && backend != BackendArg::Mock {
            return Err(CliError::invalid_argument(
                "--fault only applies to --backend mock",
            ));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::journey_execution(format!("Failed to create runtime: {e}")))?;

        self.reporter
            .start_spinner(&format!("Running journey against {}", harness.url));
        let result = runtime.block_on(async {
            match backend {
                BackendArg::Mock => {
                    let app = MockTodoApp::new().with_contract(harness.contract.clone());
                    let mut app = faults.iter().fold(app, |app, f| app.with_fault(*f));
                    run_and_close(&mut app, harness).await
                }
                BackendArg::Chromium => run_chromium(harness).await,
            }
        });
        self.reporter.finish_spinner();

        let report = result?;
        info!(defects = report.total_defects, "journey complete");
        if self.config.verbosity.is_verbose() {
            self.reporter.steps(&report);
        }
        Ok(report)
    }

    /// Get the reporter (for testing)
    #[must_use]
    pub const fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }
}

#[cfg(feature = "browser")]
async fn run_chromium(harness: &HarnessConfig) -> CliResult<JourneyReport> {
    let mut driver = todo_probar::ChromiumDriver::launch(harness.browser.clone()).await?;
    run_and_close(&mut driver, harness).await
}

#[cfg(not(feature = "browser"))]
async fn run_chromium(_harness: &HarnessConfig) -> CliResult<JourneyReport> {
    Err(CliError::config(
        "built without browser support; rebuild with --features browser or use --backend mock",
    ))
}

async fn run_and_close<D: TodoDriver>(
    driver: &mut D,
    harness: &HarnessConfig,
) -> CliResult<JourneyReport> {
    let result: ProbarResult<JourneyReport> = run_journey(driver, harness).await;
    if let Err(e) = driver.close().await {
        warn!(error = %e, "session did not close cleanly");
    }
    Ok(result?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};
    use std::path::PathBuf;

    fn quiet() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
    }

    fn mock_harness() -> HarnessConfig {
        harness_config(&HarnessArgs {
            url: Some("mock://todo".to_string()),
            timeout_ms: Some(200),
            ..HarnessArgs::default()
        })
        .unwrap()
    }

    mod harness_config_tests {
        use super::*;

        #[test]
        fn test_flags_override_defaults() {
            let config = harness_config(&HarnessArgs {
                url: Some("http://localhost:3000/".to_string()),
                chromium_path: Some(PathBuf::from("/opt/chromium")),
                headed: true,
                no_sandbox: true,
                timeout_ms: Some(1500),
                ..HarnessArgs::default()
            })
            .unwrap();
            assert_eq!(config.url, "http://localhost:3000/");
            assert_eq!(config.browser.chromium_path.as_deref(), Some("/opt/chromium"));
            assert!(!config.browser.headless);
            assert!(!config.browser.sandbox);
            assert_eq!(config.wait.timeout_ms, 1500);
        }

        #[test]
        fn test_flags_override_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("todo.yaml");
            std::fs::write(&path, "url: http://from-file/\nwait:\n  timeout_ms: 900\n").unwrap();
            let config = harness_config(&HarnessArgs {
                config: Some(path),
                url: Some("http://from-flag/".to_string()),
                ..HarnessArgs::default()
            })
            .unwrap();
            assert_eq!(config.url, "http://from-flag/");
            assert_eq!(config.wait.timeout_ms, 900);
        }

        #[test]
        fn test_invalid_override_is_rejected() {
            let result = harness_config(&HarnessArgs {
                timeout_ms: Some(0),
                ..HarnessArgs::default()
            });
            assert!(matches!(result, Err(CliError::Probar(_))));
        }
    }

    mod runner_tests {
        use super::*;

        #[test]
        fn test_clean_mock_run() {
            let mut runner = JourneyRunner::new(quiet());
            let report = runner
                .run(&mock_harness(), BackendArg::Mock, &[])
                .unwrap();
            assert!(report.passed());
            assert!(runner.reporter().quiet);
        }

        #[test]
        fn test_faulty_mock_run() {
            let mut runner = JourneyRunner::new(quiet());
            let report = runner
                .run(&mock_harness(), BackendArg::Mock, &[MockFault::WrongTitle])
                .unwrap();
            assert_eq!(report.total_defects, 1);
        }

        #[test]
        fn test_mid_run_crash_keeps_defects() {
            let mut runner = JourneyRunner::new(quiet());
            let report = runner
                .run(
                    &mock_harness(),
                    BackendArg::Mock,
                    &[MockFault::WrongTitle, MockFault::CrashOnDelete],
                )
                .unwrap();
            assert_eq!(report.total_defects, 1);
            assert_eq!(report.defects[0].message, "Wrong Website.");
            let reason = report.aborted.as_deref().unwrap();
            assert!(reason.starts_with("delete first task: "));
            assert!(!report.passed());
        }

        #[test]
        fn test_unreachable_mock_is_an_error() {
            let mut runner = JourneyRunner::new(quiet());
            let result = runner.run(&mock_harness(), BackendArg::Mock, &[MockFault::Unreachable]);
            assert!(matches!(result, Err(CliError::Probar(_))));
        }

        #[test]
        fn test_faults_require_mock_backend() {
            let mut runner = JourneyRunner::new(quiet());
            let result = runner.run(
                &mock_harness(),
                BackendArg::Chromium,
                &[MockFault::WrongTitle],
            );
            assert!(matches!(result, Err(CliError::InvalidArgument { .. })));
        }
    }
}
