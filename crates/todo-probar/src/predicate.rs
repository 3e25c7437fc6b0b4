//! State predicates over already-located handles.
//!
//! A predicate compares one observed value against an expectation and returns
//! a [`Verdict`]: a defect delta of 0 or 1 plus a diagnostic naming actual and
//! expected values. Predicates read the handles they are given and never
//! re-query the page. Composite checks add their constituent verdicts.

use crate::contract::{items_left_text, AppContract, FilterTab};
use crate::driver::{ElementHandle, TodoDriver};
use crate::result::ProbarResult;
use serde::{Deserialize, Serialize};

/// Outcome of one or more predicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Number of mismatches
    pub defects: u32,
    /// One diagnostic per mismatch
    pub diagnostics: Vec<String>,
}

impl Verdict {
    /// Create a passing verdict
    #[must_use]
    pub fn pass() -> Self {
        Self::default()
    }

    /// Create a single-defect verdict
    #[must_use]
    pub fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            defects: 1,
            diagnostics: vec![diagnostic.into()],
        }
    }

    /// Pass when `ok`, otherwise fail with the lazily built diagnostic
    #[must_use]
    pub fn check(ok: bool, diagnostic: impl FnOnce() -> String) -> Self {
        if ok {
            Self::pass()
        } else {
            Self::fail(diagnostic())
        }
    }

    /// Whether no mismatch was recorded
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.defects == 0
    }

    /// Add another verdict's defects and diagnostics
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.defects += other.defects;
        self.diagnostics.extend(other.diagnostics);
        self
    }
}

impl std::iter::Sum for Verdict {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::pass(), Self::and)
    }
}

fn show(value: Option<&str>) -> String {
    value.map_or_else(|| "null".to_string(), |v| format!("{v:?}"))
}

// =============================================================================
// PURE COMPARISONS
// =============================================================================

/// Exact label equality
#[must_use]
pub fn label_equals(actual: &str, expected: &str) -> Verdict {
    Verdict::check(actual == expected, || {
        format!("label is {actual:?}, expected {expected:?}")
    })
}

/// Exact attribute equality; a missing attribute never matches
#[must_use]
pub fn attribute_equals(name: &str, actual: Option<&str>, expected: &str) -> Verdict {
    Verdict::check(actual == Some(expected), || {
        format!("{name} is {}, expected {expected:?}", show(actual))
    })
}

/// Value is absent or the empty string
#[must_use]
pub fn value_is_empty(actual: Option<&str>) -> Verdict {
    Verdict::check(actual.map_or(true, str::is_empty), || {
        format!("value is {}, expected empty", show(actual))
    })
}

/// Selected state equals `expected`
#[must_use]
pub fn selected_equals(actual: bool, expected: bool) -> Verdict {
    let word = |selected: bool| if selected { "selected" } else { "not selected" };
    Verdict::check(actual == expected, || {
        format!("checkbox is {}, expected {}", word(actual), word(expected))
    })
}

/// Rendered state equals `expected`
#[must_use]
pub fn displayed_equals(actual: bool, expected: bool) -> Verdict {
    let word = |shown: bool| if shown { "shown" } else { "hidden" };
    Verdict::check(actual == expected, || {
        format!("element is {}, expected {}", word(actual), word(expected))
    })
}

/// Texts appear exactly in the expected order
#[must_use]
pub fn sequence_equals(actual: &[String], expected: &[&str]) -> Verdict {
    let same = actual.len() == expected.len() && actual.iter().zip(expected).all(|(a, e)| a == e);
    Verdict::check(same, || format!("items are {actual:?}, expected {expected:?}"))
}

/// At most one tab carries the active marker.
///
/// Zero marked tabs already surfaces as the `ERROR` label, so only extra
/// markers fail here.
#[must_use]
pub fn at_most_one_active(marked: usize) -> Verdict {
    Verdict::check(marked <= 1, || {
        format!("{marked} tabs carry the active marker, expected 1")
    })
}

/// Counter text matches the pluralization contract for `active` items
#[must_use]
pub fn items_left_equals(counter_text: &str, active: usize) -> Verdict {
    let expected = items_left_text(active);
    Verdict::check(counter_text == expected, || {
        format!("counter reads {counter_text:?}, expected {expected:?}")
    })
}

// =============================================================================
// HANDLE PREDICATES
// =============================================================================

/// Visible text equals `expected`
pub async fn check_label<D: TodoDriver + ?Sized>(
    driver: &D,
    element: &ElementHandle,
    expected: &str,
) -> ProbarResult<Verdict> {
    Ok(label_equals(&driver.text(element).await?, expected))
}

async fn check_attribute<D: TodoDriver + ?Sized>(
    driver: &D,
    element: &ElementHandle,
    name: &str,
    expected: &str,
) -> ProbarResult<Verdict> {
    let actual = driver.attribute(element, name).await?;
    Ok(attribute_equals(name, actual.as_deref(), expected))
}

/// `class` attribute equals `expected`
pub async fn check_class<D: TodoDriver + ?Sized>(
    driver: &D,
    element: &ElementHandle,
    expected: &str,
) -> ProbarResult<Verdict> {
    check_attribute(driver, element, "class", expected).await
}

/// `id` attribute equals `expected`
pub async fn check_id<D: TodoDriver + ?Sized>(
    driver: &D,
    element: &ElementHandle,
    expected: &str,
) -> ProbarResult<Verdict> {
    check_attribute(driver, element, "id", expected).await
}

/// `placeholder` attribute equals `expected`
pub async fn check_placeholder<D: TodoDriver + ?Sized>(
    driver: &D,
    element: &ElementHandle,
    expected: &str,
) -> ProbarResult<Verdict> {
    check_attribute(driver, element, "placeholder", expected).await
}

/// Form value equals `expected`
pub async fn check_value<D: TodoDriver + ?Sized>(
    driver: &D,
    element: &ElementHandle,
    expected: &str,
) -> ProbarResult<Verdict> {
    check_attribute(driver, element, "value", expected).await
}

/// Form value is null or empty
pub async fn check_value_empty<D: TodoDriver + ?Sized>(
    driver: &D,
    element: &ElementHandle,
) -> ProbarResult<Verdict> {
    let actual = driver.attribute(element, "value").await?;
    Ok(value_is_empty(actual.as_deref()))
}

/// Checkbox is selected
pub async fn check_selected<D: TodoDriver + ?Sized>(
    driver: &D,
    checkbox: &ElementHandle,
) -> ProbarResult<Verdict> {
    Ok(selected_equals(driver.is_selected(checkbox).await?, true))
}

/// Checkbox is not selected
pub async fn check_not_selected<D: TodoDriver + ?Sized>(
    driver: &D,
    checkbox: &ElementHandle,
) -> ProbarResult<Verdict> {
    Ok(selected_equals(driver.is_selected(checkbox).await?, false))
}

/// Number of checkboxes that are not selected
pub async fn count_active<D: TodoDriver + ?Sized>(
    driver: &D,
    checkboxes: &[ElementHandle],
) -> ProbarResult<usize> {
    let mut active = 0;
    for checkbox in checkboxes {
        if !driver.is_selected(checkbox).await? {
            active += 1;
        }
    }
    Ok(active)
}

/// Counter text against the number of unselected checkboxes
pub async fn check_items_left<D: TodoDriver + ?Sized>(
    driver: &D,
    counter: &ElementHandle,
    checkboxes: &[ElementHandle],
) -> ProbarResult<Verdict> {
    let active = count_active(driver, checkboxes).await?;
    Ok(items_left_equals(&driver.text(counter).await?, active))
}

/// Rendered state equals `expected`
pub async fn check_displayed<D: TodoDriver + ?Sized>(
    driver: &D,
    element: &ElementHandle,
    expected: bool,
) -> ProbarResult<Verdict> {
    Ok(displayed_equals(driver.is_displayed(element).await?, expected))
}

/// Handles making up a rendered empty state; `None` where a lookup failed
#[derive(Debug, Clone, Copy)]
pub struct EmptyStateView<'a> {
    /// Empty-state container
    pub container: Option<&'a ElementHandle>,
    /// Clipboard icon
    pub icon: Option<&'a ElementHandle>,
    /// Message element
    pub message: Option<&'a ElementHandle>,
    /// Items-left counter
    pub counter: Option<&'a ElementHandle>,
    /// Checkboxes of every item on the page
    pub checkboxes: &'a [ElementHandle],
}

/// Constituent verdicts of the empty-state composite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyStateVerdict {
    /// Container carries the empty-state class
    pub container: Verdict,
    /// Icon carries the clipboard classes
    pub icon: Verdict,
    /// Message element carries the expected id
    pub message_id: Verdict,
    /// Message text matches the tab; only checked once the id matched
    pub message_text: Verdict,
    /// Items-left counter
    pub counter: Verdict,
    /// Unselected checkboxes seen while checking the counter
    pub active_items: usize,
}

impl EmptyStateVerdict {
    /// Sum of every constituent
    #[must_use]
    pub fn total(&self) -> Verdict {
        [
            &self.container,
            &self.icon,
            &self.message_id,
            &self.message_text,
            &self.counter,
        ]
        .into_iter()
        .cloned()
        .sum()
    }
}

fn missing(part: &str) -> Verdict {
    Verdict::fail(format!("{part} not found"))
}

/// Composite: container class, icon class, message id and text, counter
pub async fn check_empty_state<D: TodoDriver + ?Sized>(
    driver: &D,
    contract: &AppContract,
    view: &EmptyStateView<'_>,
    tab: FilterTab,
) -> ProbarResult<EmptyStateVerdict> {
    let container = match view.container {
        Some(el) => check_class(driver, el, &contract.empty_state_class).await?,
        None => missing("empty state"),
    };
    let icon = match view.icon {
        Some(el) => check_class(driver, el, &contract.empty_icon_class).await?,
        None => missing("clipboard icon"),
    };
    let (message_id, message_text) = match view.message {
        Some(el) => {
            let id = check_id(driver, el, &contract.empty_message_id).await?;
            let text = if id.passed() {
                check_label(driver, el, tab.empty_message()).await?
            } else {
                Verdict::pass()
            };
            (id, text)
        }
        None => (missing("empty message"), Verdict::pass()),
    };
    let active_items = count_active(driver, view.checkboxes).await?;
    let counter = match view.counter {
        Some(el) => items_left_equals(&driver.text(el).await?, active_items),
        None => missing("items-left counter"),
    };
    Ok(EmptyStateVerdict {
        container,
        icon,
        message_id,
        message_text,
        counter,
        active_items,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::Selector;
    use crate::mock::{MockFault, MockTodoApp};
    use proptest::prelude::*;

    mod verdict_tests {
        use super::*;

        #[test]
        fn test_pass_and_fail() {
            assert!(Verdict::pass().passed());
            let fail = Verdict::fail("boom");
            assert_eq!(fail.defects, 1);
            assert_eq!(fail.diagnostics, vec!["boom".to_string()]);
        }

        #[test]
        fn test_sum_is_additive() {
            let total: Verdict = vec![Verdict::fail("a"), Verdict::pass(), Verdict::fail("b")]
                .into_iter()
                .sum();
            assert_eq!(total.defects, 2);
            assert_eq!(total.diagnostics.len(), 2);
        }

        proptest! {
            #[test]
            fn prop_single_predicates_are_zero_or_one(actual in ".{0,12}", expected in ".{0,12}") {
                let verdict = label_equals(&actual, &expected);
                prop_assert!(verdict.defects <= 1);
                prop_assert_eq!(verdict.passed(), actual == expected);
            }

            #[test]
            fn prop_counter_matches_own_rendering(n in 0usize..500) {
                prop_assert!(items_left_equals(&items_left_text(n), n).passed());
            }
        }
    }

    mod comparison_tests {
        use super::*;

        #[test]
        fn test_label_is_case_and_whitespace_sensitive() {
            assert!(label_equals("All", "All").passed());
            assert!(!label_equals("all", "All").passed());
            assert!(!label_equals("All ", "All").passed());
        }

        #[test]
        fn test_attribute_missing_never_matches() {
            let verdict = attribute_equals("class", None, "empty-state");
            assert_eq!(verdict.defects, 1);
            assert!(verdict.diagnostics[0].contains("null"));
        }

        #[test]
        fn test_value_empty_accepts_null_and_blank() {
            assert!(value_is_empty(None).passed());
            assert!(value_is_empty(Some("")).passed());
            assert!(!value_is_empty(Some(" ")).passed());
        }

        #[test]
        fn test_selected_equals() {
            assert!(selected_equals(true, true).passed());
            let verdict = selected_equals(false, true);
            assert_eq!(
                verdict.diagnostics[0],
                "checkbox is not selected, expected selected"
            );
        }

        #[test]
        fn test_displayed_equals() {
            assert!(displayed_equals(false, false).passed());
            assert_eq!(
                displayed_equals(true, false).diagnostics[0],
                "element is shown, expected hidden"
            );
        }

        #[test]
        fn test_at_most_one_active() {
            assert!(at_most_one_active(0).passed());
            assert!(at_most_one_active(1).passed());
            let verdict = at_most_one_active(2);
            assert_eq!(verdict.defects, 1);
            assert_eq!(
                verdict.diagnostics[0],
                "2 tabs carry the active marker, expected 1"
            );
        }

        #[test]
        fn test_sequence_equals() {
            let actual = vec!["a".to_string(), "b".to_string()];
            assert!(sequence_equals(&actual, &["a", "b"]).passed());
            assert!(!sequence_equals(&actual, &["b", "a"]).passed());
            assert!(!sequence_equals(&actual, &["a"]).passed());
        }

        #[test]
        fn test_items_left_contract() {
            assert!(items_left_equals("0 active items left", 0).passed());
            assert!(items_left_equals("1 active item left", 1).passed());
            assert!(items_left_equals("2 active items left", 2).passed());
            assert!(items_left_equals("5 active items left", 5).passed());
            assert!(!items_left_equals("1 active items left", 1).passed());
            assert!(!items_left_equals("0 active item left", 0).passed());
        }
    }

    mod handle_tests {
        use super::*;

        async fn loaded(app: MockTodoApp) -> MockTodoApp {
            let mut app = app;
            app.navigate("mock://todo").await.unwrap();
            app
        }

        async fn view_parts(app: &MockTodoApp) -> Vec<ElementHandle> {
            let mut parts = Vec::new();
            for selector in [
                Selector::class("empty-state"),
                Selector::xpath("/html/body/div/div[3]/div/i"),
                Selector::id("empty-task-message"),
                Selector::id("items-left"),
            ] {
                parts.push(app.find(&selector).await.unwrap().unwrap());
            }
            parts
        }

        #[tokio::test]
        async fn test_input_predicates() {
            let app = loaded(MockTodoApp::new()).await;
            let input = app.find(&Selector::id("task-input")).await.unwrap().unwrap();
            assert!(check_value_empty(&app, &input).await.unwrap().passed());
            assert!(check_placeholder(
                &app,
                &input,
                "What task would you like to add to your to-do list?"
            )
            .await
            .unwrap()
            .passed());
            app.type_text(&input, "abc").await.unwrap();
            assert!(check_value(&app, &input, "abc").await.unwrap().passed());
            assert!(!check_value_empty(&app, &input).await.unwrap().passed());
        }

        #[tokio::test]
        async fn test_checkbox_predicates_flip_on_toggle() {
            let app = loaded(MockTodoApp::new().with_item("t", false)).await;
            let checkbox = app.find(&Selector::class("checkbox")).await.unwrap().unwrap();
            assert!(check_not_selected(&app, &checkbox).await.unwrap().passed());
            assert!(!check_selected(&app, &checkbox).await.unwrap().passed());
            app.click(&checkbox).await.unwrap();
            assert!(!check_not_selected(&app, &checkbox).await.unwrap().passed());
            assert!(check_selected(&app, &checkbox).await.unwrap().passed());
            assert!(check_selected(&app, &checkbox).await.unwrap().passed());
        }

        #[tokio::test]
        async fn test_items_left_counts_unselected_checkboxes() {
            let app = loaded(
                MockTodoApp::new()
                    .with_item("a", false)
                    .with_item("b", true)
                    .with_item("c", false),
            )
            .await;
            let counter = app.find(&Selector::id("items-left")).await.unwrap().unwrap();
            let boxes = app.find_all(&Selector::class("checkbox")).await.unwrap();
            assert!(check_items_left(&app, &counter, &boxes).await.unwrap().passed());
        }

        #[tokio::test]
        async fn test_empty_state_composite_passes_on_clean_page() {
            let app = loaded(MockTodoApp::new()).await;
            let parts = view_parts(&app).await;
            let view = EmptyStateView {
                container: Some(&parts[0]),
                icon: Some(&parts[1]),
                message: Some(&parts[2]),
                counter: Some(&parts[3]),
                checkboxes: &[],
            };
            let verdict = check_empty_state(&app, &AppContract::default(), &view, FilterTab::All)
                .await
                .unwrap();
            assert_eq!(verdict.total(), Verdict::pass());
            assert_eq!(verdict.active_items, 0);
        }

        #[tokio::test]
        async fn test_empty_state_composite_reports_each_mismatch() {
            let app = loaded(MockTodoApp::new().with_fault(MockFault::WrongEmptyMessage)).await;
            let parts = view_parts(&app).await;
            let view = EmptyStateView {
                container: Some(&parts[0]),
                icon: Some(&parts[1]),
                message: Some(&parts[2]),
                counter: Some(&parts[3]),
                checkboxes: &[],
            };
            let verdict =
                check_empty_state(&app, &AppContract::default(), &view, FilterTab::Completed)
                    .await
                    .unwrap();
            assert_eq!(verdict.total().defects, 1);
            assert!(!verdict.message_text.passed());
            assert!(verdict.message_text.diagnostics[0].contains("There are currently no tasks."));
        }

        #[tokio::test]
        async fn test_empty_state_missing_parts_each_count_once() {
            let app = loaded(MockTodoApp::new().with_item("x", false)).await;
            let counter = app.find(&Selector::id("items-left")).await.unwrap().unwrap();
            let boxes = app.find_all(&Selector::class("checkbox")).await.unwrap();
            let view = EmptyStateView {
                container: None,
                icon: None,
                message: None,
                counter: Some(&counter),
                checkboxes: &boxes,
            };
            let verdict = check_empty_state(&app, &AppContract::default(), &view, FilterTab::All)
                .await
                .unwrap();
            assert_eq!(verdict.total().defects, 3);
            assert!(verdict.message_text.passed());
            assert!(verdict.counter.passed());
            assert_eq!(verdict.active_items, 1);
        }
    }
}
