//! Action primitives.
//!
//! Each action is one unconditional operation on one handle, followed by a
//! readiness checkpoint. Actions return nothing observable; callers re-query
//! after acting.

use crate::driver::{ElementHandle, Selector, TodoDriver};
use crate::result::ProbarResult;
use crate::wait::Readiness;
use tracing::{debug, instrument};

/// Click, type, and navigate with a checkpoint after each
#[derive(Debug)]
pub struct Actions<'a, D: TodoDriver + ?Sized> {
    driver: &'a D,
    readiness: &'a Readiness,
}

impl<'a, D: TodoDriver + ?Sized> Actions<'a, D> {
    /// Create action primitives over a driver
    #[must_use]
    pub const fn new(driver: &'a D, readiness: &'a Readiness) -> Self {
        Self { driver, readiness }
    }

    /// Click an element
    #[instrument(level = "debug", skip(self, element), fields(element = %element))]
    pub async fn click(&self, element: &ElementHandle) -> ProbarResult<()> {
        self.driver.click(element).await?;
        settle(self.driver, self.readiness).await
    }

    /// Append literal text to an element; existing content is kept
    #[instrument(level = "debug", skip(self, element), fields(element = %element))]
    pub async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbarResult<()> {
        self.driver.type_text(element, text).await?;
        settle(self.driver, self.readiness).await
    }
}

/// Load `url`, then wait for the document and, if given, a sentinel element
#[instrument(level = "info", skip(driver, readiness, sentinel))]
pub async fn navigate<D: TodoDriver + ?Sized>(
    driver: &mut D,
    readiness: &Readiness,
    url: &str,
    sentinel: Option<&Selector>,
) -> ProbarResult<()> {
    driver.navigate(url).await?;
    settle(&*driver, readiness).await?;
    if let Some(selector) = sentinel {
        readiness
            .element_present(&*driver, selector)
            .await?
            .into_result(readiness.options())?;
    }
    Ok(())
}

async fn settle<D: TodoDriver + ?Sized>(driver: &D, readiness: &Readiness) -> ProbarResult<()> {
    let result = readiness
        .document_ready(driver)
        .await?
        .into_result(readiness.options())?;
    debug!(polls = result.polls, "settled");
    Ok(())
}
