//! Journey reporting.
//!
//! A [`JourneyReport`] is built once per run from the scenario driver's defect
//! log and step records. It renders three ways: the plain text log (one
//! `ERROR- ` line per defect, then the summary line), JSON, and JUnit XML with
//! one test case per journey step for CI.

use crate::defect::{Defect, DefectLog};
use crate::result::{ProbarError, ProbarResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// `ERROR- ` lines plus summary
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// JUnit XML
    Junit,
}

impl FromStr for ReportFormat {
    type Err = ProbarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "junit" => Ok(Self::Junit),
            other => Err(ProbarError::ConfigError {
                message: format!("unknown report format '{other}'"),
            }),
        }
    }
}

/// One named journey step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step name
    pub name: String,
    /// Defects the step added
    pub defects: u32,
    /// Wall time spent in the step
    pub duration_ms: u64,
}

/// Result of one journey run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyReport {
    /// Page the journey ran against
    pub url: String,
    /// Observed page title
    pub title: Option<String>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Steps in execution order
    pub steps: Vec<StepRecord>,
    /// Defects in the order they were found
    pub defects: Vec<Defect>,
    /// Total defect count
    pub total_defects: u32,
    /// Closing summary line
    pub summary: String,
    /// Run-ending fault, when the journey could not reach its last step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl JourneyReport {
    /// Build a report from a finished run
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        title: Option<String>,
        started_at: DateTime<Utc>,
        log: &DefectLog,
        steps: Vec<StepRecord>,
    ) -> Self {
        Self {
            url: url.into(),
            title,
            started_at,
            finished_at: Utc::now(),
            steps,
            defects: log.defects().to_vec(),
            total_defects: log.count(),
            summary: log.summary_line(),
            aborted: None,
        }
    }

    /// Mark the run as cut short by a fault
    #[must_use]
    pub fn with_aborted(mut self, reason: impl Into<String>) -> Self {
        self.aborted = Some(reason.into());
        self
    }

    /// Whether the run reached its last step without a defect
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.total_defects == 0 && self.aborted.is_none()
    }

    /// Steps that added at least one defect
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|step| step.defects > 0)
    }

    /// Total wall time of all steps
    #[must_use]
    pub fn total_duration_ms(&self) -> u64 {
        self.steps.iter().map(|step| step.duration_ms).sum()
    }

    /// Render in the requested format
    pub fn render(&self, format: ReportFormat) -> ProbarResult<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => self.render_json(),
            ReportFormat::Junit => Ok(self.render_junit()),
        }
    }

    /// `ERROR- ` lines followed by the summary line
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for defect in &self.defects {
            out.push_str(&defect.line());
            out.push('\n');
        }
        out.push_str(&self.summary);
        out.push('\n');
        out
    }

    /// Pretty-printed JSON
    pub fn render_json(&self) -> ProbarResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JUnit XML, one test case per step
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<testsuite name="todo-journey" tests="{}" failures="{}" errors="{}" time="{:.3}">"#,
            self.steps.len(),
            self.failed_steps().count(),
            u8::from(self.aborted.is_some()),
            self.total_duration_ms() as f64 / 1000.0
        );
        for step in &self.steps {
            let _ = writeln!(
                xml,
                r#"  <testcase name="{}" time="{:.3}">"#,
                escape_xml(&step.name),
                step.duration_ms as f64 / 1000.0
            );
            for defect in self.defects.iter().filter(|d| d.step == step.name) {
                let detail = defect.diagnostic.as_deref().unwrap_or(&defect.message);
                let _ = writeln!(
                    xml,
                    r#"    <failure message="{}">{}</failure>"#,
                    escape_xml(&defect.message),
                    escape_xml(detail)
                );
            }
            xml.push_str("  </testcase>\n");
        }
        if let Some(reason) = &self.aborted {
            let _ = writeln!(xml, "  <system-err>{}</system-err>", escape_xml(reason));
        }
        xml.push_str("</testsuite>\n");
        xml
    }

    /// Write the rendered report to a file
    pub fn write_to(&self, path: &Path, format: ReportFormat) -> ProbarResult<()> {
        std::fs::write(path, self.render(format)?)?;
        Ok(())
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> JourneyReport {
        let mut log = DefectLog::new();
        log.record("verify title", "Wrong Website.", Some("label is \"x\"".to_string()), None);
        log.record(
            "add first task",
            "\"wash the car\" is not the last item. \"<b>\" is shown.",
            None,
            None,
        );
        let steps = vec![
            StepRecord {
                name: "verify title".to_string(),
                defects: 1,
                duration_ms: 12,
            },
            StepRecord {
                name: "add first task".to_string(),
                defects: 1,
                duration_ms: 30,
            },
            StepRecord {
                name: "delete first task".to_string(),
                defects: 0,
                duration_ms: 8,
            },
        ];
        JourneyReport::new("mock://todo", Some("x".to_string()), Utc::now(), &log, steps)
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_parse_formats() {
            assert_eq!("text".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
            assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
            assert_eq!("junit".parse::<ReportFormat>().unwrap(), ReportFormat::Junit);
            assert!("html".parse::<ReportFormat>().is_err());
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_text_render() {
            let text = sample().render_text();
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines[0], "ERROR- Wrong Website.");
            assert!(lines[1].starts_with("ERROR- \"wash the car\""));
            assert_eq!(lines[2], "Testing complete. Found 2 errors in the test run.");
        }

        #[test]
        fn test_clean_text_render() {
            let report =
                JourneyReport::new("mock://todo", None, Utc::now(), &DefectLog::new(), vec![]);
            assert!(report.passed());
            assert_eq!(
                report.render_text(),
                "Testing complete. Found 0 errors in the test run.\n"
            );
        }

        #[test]
        fn test_json_round_trip() {
            let report = sample();
            let json = report.render(ReportFormat::Json).unwrap();
            let back: JourneyReport = serde_json::from_str(&json).unwrap();
            assert_eq!(back, report);
        }

        #[test]
        fn test_junit_render() {
            let xml = sample().render_junit();
            assert!(xml.contains(r#"tests="3" failures="2""#));
            assert!(xml.contains(r#"<testcase name="delete first task""#));
            assert!(xml.contains("&lt;b&gt;"));
            assert_eq!(xml.matches("<failure").count(), 2);
        }

        #[test]
        fn test_aborted_run_keeps_collected_defects() {
            let report =
                sample().with_aborted("delete first task: Browser command failed: gone");
            assert!(!report.passed());
            assert!(report.render_text().starts_with("ERROR- Wrong Website.\n"));
            let xml = report.render_junit();
            assert!(xml.contains(r#"failures="2" errors="1""#));
            assert!(xml.contains("<system-err>delete first task: Browser command failed: gone"));
            let back: JourneyReport =
                serde_json::from_str(&report.render_json().unwrap()).unwrap();
            assert_eq!(back.aborted, report.aborted);
        }

        #[test]
        fn test_clean_report_omits_aborted() {
            let json = sample().render_json().unwrap();
            assert!(!json.contains("aborted"));
            let clean =
                JourneyReport::new("mock://todo", None, Utc::now(), &DefectLog::new(), vec![]);
            assert!(clean.render_junit().contains(r#"errors="0""#));
        }

        #[test]
        fn test_write_to_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("report.txt");
            sample().write_to(&path, ReportFormat::Text).unwrap();
            let written = std::fs::read_to_string(&path).unwrap();
            assert!(written.ends_with("Found 2 errors in the test run.\n"));
        }
    }

    #[test]
    fn test_totals() {
        let report = sample();
        assert_eq!(report.total_duration_ms(), 50);
        assert_eq!(report.failed_steps().count(), 2);
        assert!(!report.passed());
    }
}
