//! The scripted user journey.
//!
//! One fixed, linear path through the application: check the title and the
//! default tab, walk every empty tab, add a task and follow it across tabs,
//! complete it, add a second task, then delete the first. Each stage is a
//! named step so the report can attribute defects.

use crate::config::HarnessConfig;
use crate::contract::FilterTab;
use crate::driver::TodoDriver;
use crate::reporter::JourneyReport;
use crate::result::ProbarResult;
use crate::scenario::Scenario;
use crate::wait::Readiness;
use chrono::Utc;
use tracing::{info, instrument, warn};

/// Task added first, completed, then deleted
pub const FIRST_TASK: &str = "wash the car";

/// Task added second, left active
pub const SECOND_TASK: &str = "change kitchen light";

/// Step names in execution order
pub const STEPS: [&str; 15] = [
    "verify title",
    "default tab",
    "empty active tab",
    "empty completed tab",
    "return to all tab",
    "add first task",
    "first task under active",
    "first task under completed",
    "complete first task",
    "completed task under active",
    "completed task under completed",
    "add second task",
    "second task under active",
    "second task under completed",
    "delete first task",
];

/// Open the application and run the whole journey.
///
/// Session setup and teardown stay with the caller. Failing to open the page
/// is an error. A fault after that ends the run early: the report keeps the
/// defects found so far and names the fault in [`JourneyReport::aborted`].
#[instrument(level = "info", skip(driver, config), fields(url = %config.url))]
pub async fn run_journey<D: TodoDriver + ?Sized>(
    driver: &mut D,
    config: &HarnessConfig,
) -> ProbarResult<JourneyReport> {
    let started_at = Utc::now();
    let mut scenario = Scenario::new(
        driver,
        config.contract.clone(),
        Readiness::new(config.wait.clone()),
    );
    scenario.open(&config.url).await?;
    let aborted = match run_steps(&mut scenario).await {
        Ok(_) => None,
        Err(err) => {
            let reason = format!("{}: {err}", scenario.current_step());
            warn!(%reason, "journey aborted");
            Some(reason)
        }
    };

    let (log, steps, title) = scenario.into_parts();
    let report = JourneyReport::new(&config.url, title, started_at, &log, steps);
    info!(defects = report.total_defects, "journey finished");
    Ok(match aborted {
        Some(reason) => report.with_aborted(reason),
        None => report,
    })
}

/// Run every step against an already opened page
pub async fn run_steps<D: TodoDriver + ?Sized>(s: &mut Scenario<'_, D>) -> ProbarResult<u32> {
    let before = s.defect_count();

    let mark = s.begin(STEPS[0]);
    s.check_title().await?;
    s.finish(mark);

    let mark = s.begin(STEPS[1]);
    s.confirm_default_tab().await?;
    s.confirm_empty_state(FilterTab::All).await?;
    s.finish(mark);

    for (step, tab) in [
        (STEPS[2], FilterTab::Active),
        (STEPS[3], FilterTab::Completed),
        (STEPS[4], FilterTab::All),
    ] {
        let mark = s.begin(step);
        switch_tab(s, tab).await?;
        s.confirm_empty_state(tab).await?;
        s.finish(mark);
    }

    let mark = s.begin(STEPS[5]);
    s.add_task(FIRST_TASK).await?;
    s.confirm_active_tab(FilterTab::All).await?;
    s.confirm_item_visible(FIRST_TASK).await?;
    s.confirm_unchecked(FIRST_TASK).await?;
    s.confirm_items_left().await?;
    s.finish(mark);

    let mark = s.begin(STEPS[6]);
    switch_tab(s, FilterTab::Active).await?;
    s.confirm_item_visible(FIRST_TASK).await?;
    s.confirm_items_left().await?;
    s.finish(mark);

    let mark = s.begin(STEPS[7]);
    switch_tab(s, FilterTab::Completed).await?;
    s.confirm_item_hidden(FIRST_TASK).await?;
    s.confirm_empty_state(FilterTab::Completed).await?;
    s.finish(mark);

    let mark = s.begin(STEPS[8]);
    switch_tab(s, FilterTab::All).await?;
    s.click_checkbox(FIRST_TASK).await?;
    s.confirm_checked(FIRST_TASK).await?;
    s.confirm_items_left().await?;
    s.finish(mark);

    let mark = s.begin(STEPS[9]);
    switch_tab(s, FilterTab::Active).await?;
    s.confirm_item_hidden(FIRST_TASK).await?;
    s.confirm_empty_state(FilterTab::Active).await?;
    s.finish(mark);

    let mark = s.begin(STEPS[10]);
    switch_tab(s, FilterTab::Completed).await?;
    s.confirm_item_visible(FIRST_TASK).await?;
    s.confirm_checked(FIRST_TASK).await?;
    s.confirm_items_left().await?;
    s.finish(mark);

    let mark = s.begin(STEPS[11]);
    switch_tab(s, FilterTab::All).await?;
    s.add_task(SECOND_TASK).await?;
    s.confirm_item_order(&[FIRST_TASK, SECOND_TASK]).await?;
    s.confirm_checked(FIRST_TASK).await?;
    s.confirm_unchecked(SECOND_TASK).await?;
    s.confirm_items_left().await?;
    s.finish(mark);

    let mark = s.begin(STEPS[12]);
    switch_tab(s, FilterTab::Active).await?;
    s.confirm_item_visible(SECOND_TASK).await?;
    s.confirm_item_hidden(FIRST_TASK).await?;
    s.confirm_items_left().await?;
    s.finish(mark);

    let mark = s.begin(STEPS[13]);
    switch_tab(s, FilterTab::Completed).await?;
    s.confirm_item_visible(FIRST_TASK).await?;
    s.confirm_item_hidden(SECOND_TASK).await?;
    s.finish(mark);

    let mark = s.begin(STEPS[14]);
    switch_tab(s, FilterTab::All).await?;
    s.delete_task(FIRST_TASK).await?;
    s.confirm_item_order(&[SECOND_TASK]).await?;
    s.confirm_unchecked(SECOND_TASK).await?;
    s.confirm_items_left().await?;
    s.finish(mark);

    Ok(s.defect_count() - before)
}

async fn switch_tab<D: TodoDriver + ?Sized>(
    s: &mut Scenario<'_, D>,
    tab: FilterTab,
) -> ProbarResult<u32> {
    Ok(s.click_tab(tab.key()).await? + s.confirm_active_tab(tab).await?)
}
