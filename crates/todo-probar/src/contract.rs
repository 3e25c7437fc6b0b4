//! The fixed contract of the to-do application under test.
//!
//! Everything the harness knows about the page lives here: ids, classes,
//! structural paths, and the exact strings the UI is expected to render.
//! [`AppContract::default`] encodes the reference application; a YAML config
//! can override individual fields for a re-skinned deployment.

use serde::{Deserialize, Serialize};

/// Expected page title
pub const PAGE_TITLE: &str = "To-Do List Website";

/// Placeholder shown by the empty task input
pub const INPUT_PLACEHOLDER: &str = "What task would you like to add to your to-do list?";

/// Class attribute value carried by the active filter tab
pub const ACTIVE_TAB_CLASS: &str = "filter active";

/// Label returned when no tab carries the active marker
pub const NO_ACTIVE_TAB: &str = "ERROR";

/// One of the three filter tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterTab {
    /// Every item
    All,
    /// Items whose checkbox is not selected
    Active,
    /// Items whose checkbox is selected
    Completed,
}

impl FilterTab {
    /// All tabs in document order
    pub const ALL_TABS: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// The lowercase `data-filter` key
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// The displayed label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }

    /// The empty-state message rendered while this tab shows no items
    #[must_use]
    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::All => "There are currently no tasks.",
            Self::Active => "There are currently no active tasks.",
            Self::Completed => "There are currently no completed tasks.",
        }
    }

    /// Parse a `data-filter` key (exact, lowercase)
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL_TABS.into_iter().find(|tab| tab.key() == key)
    }

    /// Whether an item with the given completion state is listed under this tab
    #[must_use]
    pub const fn shows(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => !completed,
            Self::Completed => completed,
        }
    }
}

impl std::fmt::Display for FilterTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the expected display label from a lowercase tab key.
///
/// Only the first character is uppercased; the remainder is kept verbatim.
#[must_use]
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render the items-left counter text for `count` active items.
///
/// `0 active items left`, `1 active item left`, `<N> active items left`.
#[must_use]
pub fn items_left_text(count: usize) -> String {
    if count == 1 {
        "1 active item left".to_string()
    } else {
        format!("{count} active items left")
    }
}

/// Selectors and strings of the application under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppContract {
    /// Expected document title
    pub title: String,
    /// Structural path resolving every filter tab
    pub tab_path: String,
    /// Attribute carrying the tab key
    pub tab_key_attribute: String,
    /// Class value of the active tab
    pub active_tab_class: String,
    /// Id of the task input
    pub input_id: String,
    /// Placeholder of the task input
    pub input_placeholder: String,
    /// Id of the add button
    pub add_button_id: String,
    /// Structural path resolving every to-do item
    pub item_path: String,
    /// Class of the checkbox inside an item
    pub checkbox_class: String,
    /// Class of the delete control inside an item
    pub delete_button_class: String,
    /// Id of the items-left counter
    pub items_left_id: String,
    /// Class of the empty-state container
    pub empty_state_class: String,
    /// Structural path of the empty-state icon
    pub empty_icon_path: String,
    /// Class value of the empty-state icon
    pub empty_icon_class: String,
    /// Id of the empty-state message
    pub empty_message_id: String,
}

impl Default for AppContract {
    fn default() -> Self {
        Self {
            title: PAGE_TITLE.to_string(),
            tab_path: "/html/body/div/div[2]/span".to_string(),
            tab_key_attribute: "data-filter".to_string(),
            active_tab_class: ACTIVE_TAB_CLASS.to_string(),
            input_id: "task-input".to_string(),
            input_placeholder: INPUT_PLACEHOLDER.to_string(),
            add_button_id: "button-add-task".to_string(),
            item_path: "/html/body/div/ul/li".to_string(),
            checkbox_class: "checkbox".to_string(),
            delete_button_class: "delete-button".to_string(),
            items_left_id: "items-left".to_string(),
            empty_state_class: "empty-state".to_string(),
            empty_icon_path: "/html/body/div/div[3]/div/i".to_string(),
            empty_icon_class: "fas fa-clipboard-list".to_string(),
            empty_message_id: "empty-task-message".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod filter_tab_tests {
        use super::*;

        #[test]
        fn test_keys_and_labels() {
            assert_eq!(FilterTab::All.key(), "all");
            assert_eq!(FilterTab::Active.label(), "Active");
            assert_eq!(FilterTab::Completed.to_string(), "Completed");
        }

        #[test]
        fn test_from_key_is_exact() {
            assert_eq!(FilterTab::from_key("completed"), Some(FilterTab::Completed));
            assert_eq!(FilterTab::from_key("Completed"), None);
            assert_eq!(FilterTab::from_key(""), None);
        }

        #[test]
        fn test_empty_messages() {
            assert_eq!(
                FilterTab::Active.empty_message(),
                "There are currently no active tasks."
            );
            assert_eq!(
                FilterTab::Completed.empty_message(),
                "There are currently no completed tasks."
            );
        }

        #[test]
        fn test_shows() {
            assert!(FilterTab::All.shows(true));
            assert!(FilterTab::Active.shows(false));
            assert!(!FilterTab::Active.shows(true));
            assert!(!FilterTab::Completed.shows(false));
        }
    }

    mod text_tests {
        use super::*;

        #[test]
        fn test_capitalize_matches_labels() {
            for tab in FilterTab::ALL_TABS {
                assert_eq!(capitalize(tab.key()), tab.label());
            }
            assert_eq!(capitalize(""), "");
        }

        #[test]
        fn test_items_left_pluralization() {
            assert_eq!(items_left_text(0), "0 active items left");
            assert_eq!(items_left_text(1), "1 active item left");
            assert_eq!(items_left_text(2), "2 active items left");
            assert_eq!(items_left_text(5), "5 active items left");
        }

        proptest! {
            #[test]
            fn prop_items_left_plural_above_one(n in 2usize..10_000) {
                prop_assert_eq!(items_left_text(n), format!("{n} active items left"));
            }
        }
    }

    #[test]
    fn test_contract_yaml_partial_override() {
        let contract: AppContract =
            serde_yaml_ng::from_str("item_path: /html/body/main/ol/li\n").unwrap();
        assert_eq!(contract.item_path, "/html/body/main/ol/li");
        assert_eq!(contract.input_id, "task-input");
        assert_eq!(contract.title, PAGE_TITLE);
    }
}
