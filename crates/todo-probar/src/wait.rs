//! Readiness checkpoints.
//!
//! Every navigation and every action is followed by a poll-until-ready wait
//! instead of a fixed sleep. A checkpoint polls the driver at a fixed interval
//! until the condition holds or the timeout elapses.

use crate::driver::{Selector, TodoDriver};
use crate::result::{ProbarError, ProbarResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// `document.readyState` once the page and its subresources loaded
pub const READY_STATE_COMPLETE: &str = "complete";

/// Options for wait operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a wait operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Whether the condition was met before the timeout
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
    /// Number of polls performed
    pub polls: u32,
}

impl WaitResult {
    /// Create a successful wait result
    #[must_use]
    pub fn success(elapsed: Duration, waited_for: impl Into<String>, polls: u32) -> Self {
        Self {
            success: true,
            elapsed,
            waited_for: waited_for.into(),
            polls,
        }
    }

    /// Create a timeout wait result
    #[must_use]
    pub fn timeout(elapsed: Duration, waited_for: impl Into<String>, polls: u32) -> Self {
        Self {
            success: false,
            elapsed,
            waited_for: waited_for.into(),
            polls,
        }
    }

    /// Convert a timed-out result into an error
    pub fn into_result(self, options: &WaitOptions) -> ProbarResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ProbarError::Timeout {
                ms: options.timeout_ms,
                waited_for: self.waited_for,
            })
        }
    }
}

/// Poll-until-ready checkpoints over a driver
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    options: WaitOptions,
}

impl Readiness {
    /// Create a checkpoint runner with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// The options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Wait until `document.readyState` reports `complete`
    pub async fn document_ready<D: TodoDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> ProbarResult<WaitResult> {
        let start = Instant::now();
        let mut polls = 0_u32;
        loop {
            polls += 1;
            let state = driver.ready_state().await?;
            if state == READY_STATE_COMPLETE {
                debug!(polls, elapsed_ms = start.elapsed().as_millis() as u64, "document ready");
                return Ok(WaitResult::success(start.elapsed(), "document ready", polls));
            }
            if start.elapsed() >= self.options.timeout() {
                warn!(state = %state, "document never reached readyState=complete");
                return Ok(WaitResult::timeout(start.elapsed(), "document ready", polls));
            }
            tokio::time::sleep(self.options.poll_interval()).await;
        }
    }

    /// Wait until at least one node matches `selector`
    pub async fn element_present<D: TodoDriver + ?Sized>(
        &self,
        driver: &D,
        selector: &Selector,
    ) -> ProbarResult<WaitResult> {
        let start = Instant::now();
        let waited_for = format!("element {selector}");
        let mut polls = 0_u32;
        loop {
            polls += 1;
            if driver.find(selector).await?.is_some() {
                return Ok(WaitResult::success(start.elapsed(), waited_for, polls));
            }
            if start.elapsed() >= self.options.timeout() {
                warn!(%selector, "element never appeared");
                return Ok(WaitResult::timeout(start.elapsed(), waited_for, polls));
            }
            tokio::time::sleep(self.options.poll_interval()).await;
        }
    }
}
