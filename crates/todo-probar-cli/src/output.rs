//! Output formatting and progress reporting
//!
//! The report goes to stdout; progress, step results, and notices go to
//! stderr so a piped report stays machine-readable.

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use todo_probar::{JourneyReport, ProbarResult, ReportFormat, ERROR_PREFIX};

/// Progress reporter for a journey run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner while the journey runs
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    /// Remove the spinner
    pub fn finish_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Failures print even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// One line per journey step with its defect count
    pub fn steps(&self, report: &JourneyReport) {
        for step in &report.steps {
            let line = format!("{} ({} ms)", step.name, step.duration_ms);
            if step.defects == 0 {
                self.success(&line);
            } else {
                let noun = if step.defects == 1 { "defect" } else { "defects" };
                self.failure(&format!("{line}: {} {noun}", step.defects));
            }
        }
    }
}

/// Report body for stdout.
///
/// Text output opens with the observed page title; JSON and JUnit are emitted
/// exactly as rendered.
pub fn render_report(
    report: &JourneyReport,
    format: ReportFormat,
    use_color: bool,
) -> ProbarResult<String> {
    if format != ReportFormat::Text {
        return report.render(format);
    }

    let mut out = String::new();
    if let Some(title) = &report.title {
        out.push_str(&format!("The title of this page is: {title}.\n"));
    }
    let (error_style, summary_style) = if use_color {
        let summary = if report.passed() {
            Style::new().green().bold()
        } else {
            Style::new().red().bold()
        };
        (Style::new().red().bold(), summary)
    } else {
        (Style::new(), Style::new())
    };
    for defect in &report.defects {
        out.push_str(&format!(
            "{}{}\n",
            error_style.apply_to(ERROR_PREFIX),
            defect.message
        ));
    }
    out.push_str(&format!("{}\n", summary_style.apply_to(&report.summary)));
    Ok(out)
}
