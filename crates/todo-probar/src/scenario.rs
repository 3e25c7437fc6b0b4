//! Scenario driver.
//!
//! Composes locators, predicates, and actions into named checks. Every check
//! follows Locate, Assert(pre), Act, Assert(post), Accumulate, and returns the
//! number of defects it added to the running log. Mismatches never stop the
//! run. A lookup that resolves nothing costs the current check one defect;
//! any other driver error is a run-ending fault and propagates.

use crate::action::{self, Actions};
use crate::contract::{capitalize, items_left_text, AppContract, FilterTab};
use crate::defect::{DefectLog, ElementSnapshot, ERROR_PREFIX};
use crate::driver::{ElementHandle, Selector, TodoDriver};
use crate::locator::{ElementLocator, Lookup};
use crate::predicate::{self, EmptyStateView, Verdict};
use crate::reporter::StepRecord;
use crate::result::ProbarResult;
use crate::wait::Readiness;
use std::time::Instant;
use tracing::{info, instrument};

/// Open step returned by [`Scenario::begin`]
#[derive(Debug)]
#[must_use = "pass the mark to Scenario::finish"]
pub struct StepMark {
    name: String,
    started: Instant,
    defects_before: u32,
}

/// Runs checks against one page and owns the defect log for the run
pub struct Scenario<'a, D: TodoDriver + ?Sized> {
    driver: &'a mut D,
    contract: AppContract,
    readiness: Readiness,
    log: DefectLog,
    steps: Vec<StepRecord>,
    step: String,
    title: Option<String>,
}

impl<D: TodoDriver + ?Sized> std::fmt::Debug for Scenario<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("step", &self.step)
            .field("defects", &self.log.count())
            .field("steps", &self.steps.len())
            .finish_non_exhaustive()
    }
}

impl<'a, D: TodoDriver + ?Sized> Scenario<'a, D> {
    /// Create a scenario over a driver
    pub fn new(driver: &'a mut D, contract: AppContract, readiness: Readiness) -> Self {
        Self {
            driver,
            contract,
            readiness,
            log: DefectLog::new(),
            steps: Vec::new(),
            step: "setup".to_string(),
            title: None,
        }
    }

    /// The driver being exercised
    pub fn driver(&self) -> &D {
        self.driver
    }

    /// The application contract in use
    pub const fn contract(&self) -> &AppContract {
        &self.contract
    }

    /// Defects recorded so far
    pub const fn log(&self) -> &DefectLog {
        &self.log
    }

    /// Running defect total
    pub fn defect_count(&self) -> u32 {
        self.log.count()
    }

    /// Finished steps
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Step currently running, or `setup` before the first one
    pub fn current_step(&self) -> &str {
        &self.step
    }

    /// Title observed by [`Scenario::check_title`]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Consume the scenario, keeping the log and step records
    pub fn into_parts(self) -> (DefectLog, Vec<StepRecord>, Option<String>) {
        (self.log, self.steps, self.title)
    }

    // =========================================================================
    // STEP BOOKKEEPING
    // =========================================================================

    /// Start a named step; defects recorded until `finish` are attributed to it
    pub fn begin(&mut self, name: impl Into<String>) -> StepMark {
        let name = name.into();
        info!(step = %name, "step started");
        self.step.clone_from(&name);
        StepMark {
            name,
            started: Instant::now(),
            defects_before: self.log.count(),
        }
    }

    /// Close a step and return the defects it added
    pub fn finish(&mut self, mark: StepMark) -> u32 {
        let defects = self.log.count() - mark.defects_before;
        info!(step = %mark.name, defects, "step finished");
        self.steps.push(StepRecord {
            name: mark.name,
            defects,
            duration_ms: mark.started.elapsed().as_millis() as u64,
        });
        defects
    }

    fn since(&self, before: u32) -> u32 {
        self.log.count() - before
    }

    fn locator(&self) -> ElementLocator<'_, D> {
        ElementLocator::new(&*self.driver, &self.contract)
    }

    fn actions(&self) -> Actions<'_, D> {
        Actions::new(&*self.driver, &self.readiness)
    }

    // =========================================================================
    // DEFECT RECORDING
    // =========================================================================

    fn record(
        &mut self,
        message: String,
        diagnostic: Option<String>,
        snapshot: Option<ElementSnapshot>,
    ) {
        info!(step = %self.step, "{ERROR_PREFIX}{message}");
        self.log
            .record(self.step.clone(), message, diagnostic, snapshot);
    }

    async fn snapshot(&self, element: &ElementHandle) -> ElementSnapshot {
        ElementSnapshot {
            description: element.description.clone(),
            text: self.driver.text(element).await.ok(),
            class: self.driver.attribute(element, "class").await.ok().flatten(),
            id: self.driver.attribute(element, "id").await.ok().flatten(),
            value: self.driver.attribute(element, "value").await.ok().flatten(),
        }
    }

    /// Keep `Ok`, turn a locate failure into one defect, propagate the rest
    fn scope<T>(&mut self, result: ProbarResult<T>, message: &str) -> ProbarResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_locate_failure() => {
                self.record(message.to_string(), Some(err.to_string()), None);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Like [`Self::scope`], also counting `NotFound` as a defect
    fn found(
        &mut self,
        result: ProbarResult<Lookup<ElementHandle>>,
        message: &str,
    ) -> ProbarResult<Option<ElementHandle>> {
        match self.scope(result, message)? {
            Some(Lookup::Found(element)) => Ok(Some(element)),
            Some(Lookup::NotFound) => {
                self.record(message.to_string(), Some("no match".to_string()), None);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Record every mismatch in a verdict under one message
    async fn judge<F>(
        &mut self,
        verdict: ProbarResult<Verdict>,
        element: Option<&ElementHandle>,
        message: F,
    ) -> ProbarResult<()>
    where
        F: FnOnce(&ElementSnapshot) -> String,
    {
        let verdict = match verdict {
            Ok(verdict) => verdict,
            Err(err) if err.is_locate_failure() => Verdict::fail(err.to_string()),
            Err(err) => return Err(err),
        };
        if verdict.passed() {
            return Ok(());
        }
        let snapshot = match element {
            Some(el) => Some(self.snapshot(el).await),
            None => None,
        };
        let blank = ElementSnapshot::default();
        let message = message(snapshot.as_ref().unwrap_or(&blank));
        for diagnostic in verdict.diagnostics {
            self.record(message.clone(), Some(diagnostic), snapshot.clone());
        }
        Ok(())
    }

    async fn all_checkboxes(&mut self) -> ProbarResult<Vec<ElementHandle>> {
        let items = self.locator().find_all_items().await?;
        let mut checkboxes = Vec::with_capacity(items.len());
        for item in &items {
            let found = self.locator().find_item_checkbox(item).await;
            if let Some(checkbox) = self.scope(found, "Checkbox of a task is not shown.")? {
                checkboxes.push(checkbox);
            }
        }
        Ok(checkboxes)
    }

    async fn item(&mut self, text: &str) -> ProbarResult<Option<ElementHandle>> {
        let lookup = self.locator().find_item_by_text(text).await;
        self.found(lookup, &format!("\"{text}\" is not found."))
    }

    async fn item_checkbox(&mut self, text: &str) -> ProbarResult<Option<ElementHandle>> {
        let Some(item) = self.item(text).await? else {
            return Ok(None);
        };
        let found = self.locator().find_item_checkbox(&item).await;
        self.scope(found, &format!("Checkbox of \"{text}\" is not shown."))
    }

    async fn item_texts(&mut self) -> ProbarResult<Vec<String>> {
        let items = self.locator().find_all_items().await?;
        let mut texts = Vec::with_capacity(items.len());
        for item in &items {
            let text = self.driver.text(item).await;
            if let Some(text) = self.scope(text, "Text of a task could not be read.")? {
                texts.push(text);
            }
        }
        Ok(texts)
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Load the application and wait until its tabs are rendered
    pub async fn open(&mut self, url: &str) -> ProbarResult<()> {
        let sentinel = Selector::xpath(self.contract.tab_path.clone());
        action::navigate(&mut *self.driver, &self.readiness, url, Some(&sentinel)).await
    }

    // =========================================================================
    // CHECKS
    // =========================================================================

    /// Page title equals the contract title
    #[instrument(level = "debug", skip(self))]
    pub async fn check_title(&mut self) -> ProbarResult<u32> {
        let before = self.log.count();
        let title = self.driver.title().await?;
        info!("The title of this page is: {title}.");
        let verdict = predicate::label_equals(&title, &self.contract.title);
        self.title = Some(title);
        self.judge(Ok(verdict), None, |_| "Wrong Website.".to_string())
            .await?;
        Ok(self.since(before))
    }

    /// `All` is the active tab on a fresh page
    pub async fn confirm_default_tab(&mut self) -> ProbarResult<u32> {
        self.confirm_active(FilterTab::All, true).await
    }

    /// `tab` carries the active marker
    pub async fn confirm_active_tab(&mut self, tab: FilterTab) -> ProbarResult<u32> {
        self.confirm_active(tab, false).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn confirm_active(&mut self, tab: FilterTab, default: bool) -> ProbarResult<u32> {
        let before = self.log.count();
        let active = self.locator().find_active_tab().await;
        let Some(active) = self.scope(active, "Active tab could not be read.")? else {
            return Ok(self.since(before));
        };
        let verdict = predicate::label_equals(active.as_str(), tab.label());
        self.judge(Ok(verdict), None, |_| {
            if default {
                "Default tab is not correct.".to_string()
            } else {
                format!("{tab} tab is not active. \"{active}\" is active.")
            }
        })
        .await?;

        let marked = self.locator().count_active_tabs().await;
        if let Some(marked) = self.scope(marked, "Active tab could not be read.")? {
            let verdict = predicate::at_most_one_active(marked);
            self.judge(Ok(verdict), None, |_| "More than one tab is active.".to_string())
                .await?;
        }
        Ok(self.since(before))
    }

    /// Empty-state block for `tab` plus the items-left counter
    #[instrument(level = "debug", skip(self))]
    pub async fn confirm_empty_state(&mut self, tab: FilterTab) -> ProbarResult<u32> {
        let before = self.log.count();
        let locator = self.locator();
        let contract = self.contract.clone();
        let container = optional(locator.find_by_class(&contract.empty_state_class).await)?;
        let icon = optional(locator.find_by_path(&contract.empty_icon_path).await)?;
        let message = optional(locator.find_by_id(&contract.empty_message_id).await)?;
        let counter = optional(locator.find_by_id(&contract.items_left_id).await)?;
        let checkboxes = self.all_checkboxes().await?;
        let view = EmptyStateView {
            container: container.as_ref(),
            icon: icon.as_ref(),
            message: message.as_ref(),
            counter: counter.as_ref(),
            checkboxes: &checkboxes,
        };
        let verdict =
            match predicate::check_empty_state(&*self.driver, &contract, &view, tab).await {
                Ok(verdict) => verdict,
                Err(err) if err.is_locate_failure() => {
                    self.record(
                        "Empty state could not be read.".to_string(),
                        Some(err.to_string()),
                        None,
                    );
                    return Ok(self.since(before));
                }
                Err(err) => return Err(err),
            };

        self.judge(Ok(verdict.container), container.as_ref(), |s| {
            shown("Empty state is not shown.", s.class.as_deref())
        })
        .await?;
        self.judge(Ok(verdict.icon), icon.as_ref(), |s| {
            shown("Clipboard art is not shown.", s.class.as_deref())
        })
        .await?;
        self.judge(Ok(verdict.message_id), message.as_ref(), |s| {
            shown("Empty tasks message is not shown.", s.id.as_deref())
        })
        .await?;
        self.judge(Ok(verdict.message_text), message.as_ref(), |s| {
            format!(
                "Incorrect message shown. \"{}\" is the incorrect message.",
                s.text.as_deref().unwrap_or_default()
            )
        })
        .await?;
        let expected = items_left_text(verdict.active_items);
        self.judge(Ok(verdict.counter), counter.as_ref(), |_| {
            format!("{expected} message is not shown.")
        })
        .await?;
        Ok(self.since(before))
    }

    /// Counter text matches the number of unchecked items
    #[instrument(level = "debug", skip(self))]
    pub async fn confirm_items_left(&mut self) -> ProbarResult<u32> {
        let before = self.log.count();
        let checkboxes = self.all_checkboxes().await?;
        let found = self.locator().find_by_id(&self.contract.items_left_id).await;
        let Some(counter) = self.scope(found, "Items left counter is not shown.")? else {
            return Ok(self.since(before));
        };
        let active = predicate::count_active(&*self.driver, &checkboxes).await;
        let Some(active) = self.scope(active, "Task checkboxes could not be read.")? else {
            return Ok(self.since(before));
        };
        let expected = items_left_text(active);
        let verdict = predicate::check_label(&*self.driver, &counter, &expected).await;
        self.judge(verdict, Some(&counter), |_| {
            format!("{expected} message is not shown.")
        })
        .await?;
        Ok(self.since(before))
    }

    /// Find a tab by key, verify its label, click it, verify the label again
    #[instrument(level = "debug", skip(self))]
    pub async fn click_tab(&mut self, key: &str) -> ProbarResult<u32> {
        let before = self.log.count();
        let expected = capitalize(key);
        let lookup = self.locator().find_tab(key).await;
        let Some(tab) = self.found(lookup, &format!("{expected} tab is not found."))? else {
            return Ok(self.since(before));
        };

        let pre = predicate::check_label(&*self.driver, &tab, &expected).await;
        self.judge(pre, Some(&tab), |_| "Found tab is not correct.".to_string())
            .await?;

        let clicked = self.actions().click(&tab).await;
        if self
            .scope(clicked, &format!("{expected} tab could not be clicked."))?
            .is_none()
        {
            return Ok(self.since(before));
        }

        let post = predicate::check_label(&*self.driver, &tab, &expected).await;
        self.judge(post, Some(&tab), |_| "Clicked tab is not correct.".to_string())
            .await?;
        Ok(self.since(before))
    }

    async fn confirm_input_idle(&mut self, input: &ElementHandle, when: &str) -> ProbarResult<()> {
        let empty = predicate::check_value_empty(&*self.driver, input).await;
        self.judge(empty, Some(input), |s| {
            format!(
                "Task input is not empty {when}. \"{}\" is shown.",
                s.value.as_deref().unwrap_or_default()
            )
        })
        .await?;
        let placeholder =
            predicate::check_placeholder(&*self.driver, input, &self.contract.input_placeholder)
                .await;
        self.judge(placeholder, Some(input), |_| {
            format!("Task input placeholder is not correct {when}.")
        })
        .await
    }

    /// Type `text` into the task input, submit it, and verify the new last item
    #[instrument(level = "debug", skip(self))]
    pub async fn add_task(&mut self, text: &str) -> ProbarResult<u32> {
        let before = self.log.count();
        let found = self.locator().find_by_id(&self.contract.input_id).await;
        let Some(input) = self.scope(found, "Task input is not shown.")? else {
            return Ok(self.since(before));
        };
        self.confirm_input_idle(&input, "before adding").await?;

        let clicked = self.actions().click(&input).await;
        self.scope(clicked, "Task input could not be clicked.")?;
        self.confirm_input_idle(&input, "after clicking it").await?;

        let typed = self.actions().type_text(&input, text).await;
        if self
            .scope(typed, "Task input could not be typed into.")?
            .is_none()
        {
            return Ok(self.since(before));
        }
        let value = predicate::check_value(&*self.driver, &input, text).await;
        self.judge(value, Some(&input), |s| {
            format!(
                "Task input does not show \"{text}\". \"{}\" is shown.",
                s.value.as_deref().unwrap_or_default()
            )
        })
        .await?;

        let found = self.locator().find_by_id(&self.contract.add_button_id).await;
        let Some(button) = self.scope(found, "Add button is not shown.")? else {
            return Ok(self.since(before));
        };
        let clicked = self.actions().click(&button).await;
        if self
            .scope(clicked, "Add button could not be clicked.")?
            .is_none()
        {
            return Ok(self.since(before));
        }

        let found = self.locator().find_by_id(&self.contract.input_id).await;
        if let Some(input) = self.scope(found, "Task input is not shown after adding.")? {
            self.confirm_input_idle(&input, "after adding").await?;
        }
        self.confirm_last_item(text).await?;
        Ok(self.since(before))
    }

    /// The last item in document order has exactly `text`
    #[instrument(level = "debug", skip(self))]
    pub async fn confirm_last_item(&mut self, text: &str) -> ProbarResult<u32> {
        let before = self.log.count();
        let lookup = self.locator().find_last_item().await;
        let Some(item) = self.found(lookup, &format!("\"{text}\" is not added to the list."))?
        else {
            return Ok(self.since(before));
        };
        let label = predicate::check_label(&*self.driver, &item, text).await;
        self.judge(label, Some(&item), |s| {
            format!(
                "\"{text}\" is not the last task. \"{}\" is shown.",
                s.text.as_deref().unwrap_or_default()
            )
        })
        .await?;
        Ok(self.since(before))
    }

    /// Click the checkbox of the item labelled `text`
    #[instrument(level = "debug", skip(self))]
    pub async fn click_checkbox(&mut self, text: &str) -> ProbarResult<u32> {
        let before = self.log.count();
        let Some(checkbox) = self.item_checkbox(text).await? else {
            return Ok(self.since(before));
        };
        let clicked = self.actions().click(&checkbox).await;
        self.scope(clicked, &format!("Checkbox of \"{text}\" could not be clicked."))?;
        Ok(self.since(before))
    }

    /// The item labelled `text` is marked completed
    pub async fn confirm_checked(&mut self, text: &str) -> ProbarResult<u32> {
        let before = self.log.count();
        if let Some(checkbox) = self.item_checkbox(text).await? {
            let verdict = predicate::check_selected(&*self.driver, &checkbox).await;
            self.judge(verdict, Some(&checkbox), |_| {
                format!("\"{text}\" is not marked as completed.")
            })
            .await?;
        }
        Ok(self.since(before))
    }

    /// The item labelled `text` is not marked completed
    pub async fn confirm_unchecked(&mut self, text: &str) -> ProbarResult<u32> {
        let before = self.log.count();
        if let Some(checkbox) = self.item_checkbox(text).await? {
            let verdict = predicate::check_not_selected(&*self.driver, &checkbox).await;
            self.judge(verdict, Some(&checkbox), |_| {
                format!("\"{text}\" is marked as completed.")
            })
            .await?;
        }
        Ok(self.since(before))
    }

    /// The item labelled `text` exists and is rendered under the current tab
    pub async fn confirm_item_visible(&mut self, text: &str) -> ProbarResult<u32> {
        let before = self.log.count();
        let lookup = self.locator().find_item_by_text(text).await;
        if let Some(item) = self.found(lookup, &format!("\"{text}\" is not shown."))? {
            let verdict = predicate::check_displayed(&*self.driver, &item, true).await;
            self.judge(verdict, Some(&item), |_| format!("\"{text}\" is not shown."))
                .await?;
        }
        Ok(self.since(before))
    }

    /// The item labelled `text` is absent or not rendered under the current tab
    pub async fn confirm_item_hidden(&mut self, text: &str) -> ProbarResult<u32> {
        let before = self.log.count();
        let lookup = self.locator().find_item_by_text(text).await;
        if let Some(Lookup::Found(item)) =
            self.scope(lookup, &format!("\"{text}\" could not be read."))?
        {
            let verdict = predicate::check_displayed(&*self.driver, &item, false).await;
            self.judge(verdict, Some(&item), |_| {
                format!("\"{text}\" is shown under the wrong tab.")
            })
            .await?;
        }
        Ok(self.since(before))
    }

    /// The item labelled `text` is gone from the list
    pub async fn confirm_item_absent(&mut self, text: &str) -> ProbarResult<u32> {
        let before = self.log.count();
        let lookup = self.locator().find_item_by_text(text).await;
        if let Some(Lookup::Found(item)) =
            self.scope(lookup, &format!("\"{text}\" could not be read."))?
        {
            let snapshot = self.snapshot(&item).await;
            self.record(
                format!("\"{text}\" is not deleted."),
                Some(format!("{item} still present")),
                Some(snapshot),
            );
        }
        Ok(self.since(before))
    }

    /// Item texts appear exactly in `expected` order
    #[instrument(level = "debug", skip(self))]
    pub async fn confirm_item_order(&mut self, expected: &[&str]) -> ProbarResult<u32> {
        let before = self.log.count();
        let texts = self.item_texts().await?;
        let verdict = predicate::sequence_equals(&texts, expected);
        self.judge(Ok(verdict), None, |_| {
            format!("Tasks are not in the expected order. {texts:?} is shown.")
        })
        .await?;
        Ok(self.since(before))
    }

    /// Click the delete control of the item labelled `text`, then verify it is gone
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_task(&mut self, text: &str) -> ProbarResult<u32> {
        let before = self.log.count();
        let Some(item) = self.item(text).await? else {
            return Ok(self.since(before));
        };
        let found = self.locator().find_item_delete_button(&item).await;
        let Some(button) =
            self.scope(found, &format!("Delete button of \"{text}\" is not shown."))?
        else {
            return Ok(self.since(before));
        };
        let clicked = self.actions().click(&button).await;
        if self
            .scope(clicked, &format!("Delete button of \"{text}\" could not be clicked."))?
            .is_none()
        {
            return Ok(self.since(before));
        }
        self.confirm_item_absent(text).await?;
        Ok(self.since(before))
    }
}

/// Keep a located element, map a locate failure to `None`
fn optional(result: ProbarResult<ElementHandle>) -> ProbarResult<Option<ElementHandle>> {
    match result {
        Ok(element) => Ok(Some(element)),
        Err(err) if err.is_locate_failure() => Ok(None),
        Err(err) => Err(err),
    }
}

fn shown(prefix: &str, actual: Option<&str>) -> String {
    match actual {
        Some(actual) => format!("{prefix} {actual} is shown."),
        None => prefix.to_string(),
    }
}
