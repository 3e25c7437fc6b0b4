//! Todo-Probar: acceptance harness for a single-page to-do list application
//!
//! Drives the live UI through a fixed user journey (tab switching, empty
//! states, adding, completing and deleting tasks, the items-left counter) and
//! collects every mismatch as a defect instead of stopping at the first one.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  TODO-PROBAR Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Journey    │    │ Scenario   │    │ TodoDriver │            │
//! │   │ Script     │───►│ Driver     │───►│ (chromium  │            │
//! │   │            │    │ + DefectLog│    │  or mock)  │            │
//! │   └────────────┘    └─────┬──────┘    └────────────┘            │
//! │                 Locator · Predicate · Action · Readiness        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use todo_probar::prelude::*;
//!
//! # async fn demo() -> ProbarResult<()> {
//! let config = HarnessConfig::default().with_url("mock://todo");
//! let mut app = MockTodoApp::new();
//! let report = run_journey(&mut app, &config).await?;
//! println!("{}", report.render_text());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod action;
mod browser;
mod config;
mod contract;
mod defect;
mod driver;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod journey;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::unnecessary_wraps
)]
mod locator;
/// In-memory to-do application for exercising the harness without a browser
#[allow(clippy::missing_errors_doc, clippy::significant_drop_tightening)]
pub mod mock;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::unnecessary_wraps
)]
mod predicate;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::cast_precision_loss,
    clippy::format_push_string,
    clippy::needless_raw_string_hashes
)]
mod reporter;
mod result;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation
)]
mod scenario;
mod wait;

pub use action::{navigate, Actions};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{HarnessConfig, DEFAULT_URL};
pub use contract::{
    capitalize, items_left_text, AppContract, FilterTab, ACTIVE_TAB_CLASS, INPUT_PLACEHOLDER,
    NO_ACTIVE_TAB, PAGE_TITLE,
};
pub use defect::{summary_line, Defect, DefectLog, ElementSnapshot, ERROR_PREFIX};
pub use driver::{ElementHandle, Selector, TodoDriver};
pub use journey::{run_journey, run_steps, FIRST_TASK, SECOND_TASK, STEPS};
pub use locator::{ActiveTab, ElementLocator, Lookup};
pub use mock::{MockFault, MockTodoApp};
pub use predicate::{EmptyStateVerdict, EmptyStateView, Verdict};
pub use reporter::{JourneyReport, ReportFormat, StepRecord};
pub use result::{ProbarError, ProbarResult};
pub use scenario::{Scenario, StepMark};
pub use wait::{
    Readiness, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
    READY_STATE_COMPLETE,
};

/// State predicates, usable outside a scenario
pub mod predicates {
    pub use super::predicate::*;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use super::action::*;
    pub use super::browser::*;
    pub use super::config::*;
    pub use super::contract::*;
    pub use super::defect::*;
    pub use super::driver::*;
    pub use super::journey::*;
    pub use super::locator::*;
    pub use super::mock::*;
    pub use super::predicate::{EmptyStateVerdict, EmptyStateView, Verdict};
    pub use super::reporter::*;
    pub use super::result::*;
    pub use super::scenario::*;
    pub use super::wait::*;
}
