//! Defect log
//!
//! Collects every mismatch a journey observes without stopping the run.
//! Each entry carries the message printed after the `ERROR- ` prefix, the step
//! it was found in, and optionally what the offending element looked like.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of every printed defect line
pub const ERROR_PREFIX: &str = "ERROR- ";

/// What an element looked like when a check against it failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// How the element was located
    pub description: String,
    /// Visible text
    pub text: Option<String>,
    /// `class` attribute
    pub class: Option<String>,
    /// `id` attribute
    pub id: Option<String>,
    /// Live form value
    pub value: Option<String>,
}

/// A single recorded defect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    /// Position in the log (0-based)
    pub index: usize,
    /// Step that observed the defect
    pub step: String,
    /// Human-readable message
    pub message: String,
    /// Actual vs. expected detail from the predicate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    /// Offending element, when one was located
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ElementSnapshot>,
    /// When the defect was recorded
    pub recorded_at: DateTime<Utc>,
}

impl Defect {
    /// The printed `ERROR- ...` line
    #[must_use]
    pub fn line(&self) -> String {
        format!("{ERROR_PREFIX}{}", self.message)
    }
}

/// Ordered defects of one journey run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectLog {
    defects: Vec<Defect>,
}

impl DefectLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a defect and return the new total
    pub fn record(
        &mut self,
        step: impl Into<String>,
        message: impl Into<String>,
        diagnostic: Option<String>,
        snapshot: Option<ElementSnapshot>,
    ) -> u32 {
        let defect = Defect {
            index: self.defects.len(),
            step: step.into(),
            message: message.into(),
            diagnostic,
            snapshot,
            recorded_at: Utc::now(),
        };
        tracing::debug!(step = %defect.step, message = %defect.message, "defect recorded");
        self.defects.push(defect);
        self.count()
    }

    /// Total defects recorded
    #[must_use]
    pub fn count(&self) -> u32 {
        self.defects.len() as u32
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }

    /// Recorded defects in order
    #[must_use]
    pub fn defects(&self) -> &[Defect] {
        &self.defects
    }

    /// Defects recorded by a given step
    pub fn for_step<'a>(&'a self, step: &'a str) -> impl Iterator<Item = &'a Defect> + 'a {
        self.defects.iter().filter(move |d| d.step == step)
    }

    /// One `ERROR- ...` line per defect
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.defects.iter().map(Defect::line).collect()
    }

    /// Closing summary for this log
    #[must_use]
    pub fn summary_line(&self) -> String {
        summary_line(self.count())
    }
}

/// `Testing complete. Found <N> error(s) in the test run.`
#[must_use]
pub fn summary_line(count: u32) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("Testing complete. Found {count} error{plural} in the test run.")
}
