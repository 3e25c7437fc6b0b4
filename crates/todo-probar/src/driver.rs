//! TodoDriver - Abstract Browser Automation Trait
//!
//! The harness never talks to a browser directly. Everything it needs from the
//! automation capability goes through [`TodoDriver`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  TodoDriver (Abstract Trait)                                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────────┐  │
//! │  │  ChromiumDriver     │        │  MockTodoApp            │  │
//! │  │  (`browser`)        │        │  (in-memory model)      │  │
//! │  │  CDP via            │        │  fault injection for    │  │
//! │  │  chromiumoxide      │        │  harness self-tests     │  │
//! │  └─────────────────────┘        └─────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handles are opaque node references. A backend returns
//! [`ProbarError::StaleElement`](crate::ProbarError::StaleElement) when a handle
//! outlived the node it pointed at.

use crate::result::ProbarResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical reference to one or more rendered nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Element `id` attribute
    Id(String),
    /// Style class (space separated classes must all match)
    Class(String),
    /// Structural XPath
    XPath(String),
    /// CSS selector
    Css(String),
}

impl Selector {
    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a class selector
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::Class(class.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(path: impl Into<String>) -> Self {
        Self::XPath(path.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// CSS form of this selector, `None` for XPath
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(format!("[id={id:?}]")),
            Self::Class(class) => {
                let joined: Vec<&str> = class.split_whitespace().collect();
                Some(format!(".{}", joined.join(".")))
            }
            Self::Css(css) => Some(css.clone()),
            Self::XPath(_) => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Class(class) => write!(f, "class={class:?}"),
            Self::XPath(path) => write!(f, "xpath={path}"),
            Self::Css(css) => write!(f, "css={css}"),
        }
    }
}

/// Opaque reference to a rendered node, valid until the next re-render
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Backend node reference
    pub node: u64,
    /// What the handle was located by (diagnostics only)
    pub description: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(node: u64, description: impl Into<String>) -> Self {
        Self {
            node,
            description: description.into(),
        }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.description, self.node)
    }
}

/// Abstract driver trait for browser automation
///
/// # Implementations
///
/// - `ChromiumDriver` - real browser over CDP (`browser` feature)
/// - `MockTodoApp` - in-memory model of the application
#[async_trait]
pub trait TodoDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&mut self, url: &str) -> ProbarResult<()>;

    /// Current document title
    async fn title(&self) -> ProbarResult<String>;

    /// Current `document.readyState`
    async fn ready_state(&self) -> ProbarResult<String>;

    /// First node matching the selector
    async fn find(&self, selector: &Selector) -> ProbarResult<Option<ElementHandle>>;

    /// Every node matching the selector, in document order
    async fn find_all(&self, selector: &Selector) -> ProbarResult<Vec<ElementHandle>>;

    /// First descendant of `parent` matching the selector
    async fn find_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ProbarResult<Option<ElementHandle>>;

    /// Visible text content.
    ///
    /// Leading and trailing whitespace is dropped, as a rendered page reports
    /// it; case and inner whitespace are kept exactly.
    async fn text(&self, element: &ElementHandle) -> ProbarResult<String>;

    /// Named attribute; `value` reads the live form value
    async fn attribute(&self, element: &ElementHandle, name: &str)
        -> ProbarResult<Option<String>>;

    /// Selected state of a checkbox-like control
    async fn is_selected(&self, element: &ElementHandle) -> ProbarResult<bool>;

    /// Whether the node is rendered
    async fn is_displayed(&self, element: &ElementHandle) -> ProbarResult<bool>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> ProbarResult<()>;

    /// Type text into element without clearing it
    async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbarResult<()>;

    /// Close the session
    async fn close(&mut self) -> ProbarResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_id_to_css() {
            assert_eq!(
                Selector::id("task-input").to_css().as_deref(),
                Some("[id=\"task-input\"]")
            );
        }

        #[test]
        fn test_multi_class_to_css() {
            assert_eq!(
                Selector::class("fas fa-clipboard-list").to_css().as_deref(),
                Some(".fas.fa-clipboard-list")
            );
            assert_eq!(
                Selector::class("empty-state").to_css().as_deref(),
                Some(".empty-state")
            );
        }

        #[test]
        fn test_xpath_has_no_css_form() {
            assert!(Selector::xpath("/html/body").to_css().is_none());
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::id("items-left").to_string(), "#items-left");
            assert_eq!(
                Selector::xpath("/html/body/div/ul/li").to_string(),
                "xpath=/html/body/div/ul/li"
            );
        }
    }

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_element_handle_creation() {
            let handle = ElementHandle::new(7, "#task-input");
            assert_eq!(handle.node, 7);
            assert_eq!(handle.to_string(), "#task-input (#7)");
        }
    }
}
