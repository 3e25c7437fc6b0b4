//! Element location strategies.
//!
//! Resolves logical UI references (id, class, structural path, tab key, item
//! text) to live handles through a [`TodoDriver`]. Single-element lookups by
//! id/class/path fail with [`ProbarError::ElementNotFound`], which the scenario
//! driver scopes to one check. Tab and item lookups return tagged values
//! instead, so a missing tab or item is data, not an error.

use crate::contract::{AppContract, NO_ACTIVE_TAB};
use crate::driver::{ElementHandle, Selector, TodoDriver};
use crate::result::{ProbarError, ProbarResult};
use std::fmt;
use tracing::trace;

/// Result of a lookup that may legitimately find nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The lookup resolved
    Found(T),
    /// Nothing matched
    NotFound,
}

impl<T> Lookup<T> {
    /// Whether the lookup resolved
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Borrow the found value
    #[must_use]
    pub const fn found(&self) -> Option<&T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    /// Convert into an `Option`
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

/// Label of the tab carrying the active marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveTab {
    /// Text of the active tab
    Label(String),
    /// No tab is marked active
    NoneActive,
}

impl ActiveTab {
    /// The label, or `"ERROR"` when no tab is active
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Label(label) => label,
            Self::NoneActive => NO_ACTIVE_TAB,
        }
    }
}

impl fmt::Display for ActiveTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for ActiveTab {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ActiveTab {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Resolves contract references to live handles
#[derive(Debug)]
pub struct ElementLocator<'a, D: TodoDriver + ?Sized> {
    driver: &'a D,
    contract: &'a AppContract,
}

impl<'a, D: TodoDriver + ?Sized> ElementLocator<'a, D> {
    /// Create a locator over a driver and contract
    #[must_use]
    pub const fn new(driver: &'a D, contract: &'a AppContract) -> Self {
        Self { driver, contract }
    }

    /// The contract this locator resolves against
    #[must_use]
    pub const fn contract(&self) -> &'a AppContract {
        self.contract
    }

    async fn first(&self, selector: Selector) -> ProbarResult<ElementHandle> {
        trace!(%selector, "locate");
        self.driver
            .find(&selector)
            .await?
            .ok_or_else(|| ProbarError::not_found(selector.to_string()))
    }

    /// First element with the given `id`
    pub async fn find_by_id(&self, id: &str) -> ProbarResult<ElementHandle> {
        self.first(Selector::id(id)).await
    }

    /// First element carrying the given class
    pub async fn find_by_class(&self, class: &str) -> ProbarResult<ElementHandle> {
        self.first(Selector::class(class)).await
    }

    /// First element at the given structural path
    pub async fn find_by_path(&self, path: &str) -> ProbarResult<ElementHandle> {
        self.first(Selector::xpath(path)).await
    }

    /// Every filter tab, in document order
    pub async fn find_all_tabs(&self) -> ProbarResult<Vec<ElementHandle>> {
        self.driver
            .find_all(&Selector::xpath(&self.contract.tab_path))
            .await
    }

    /// Every to-do item, in document order; empty when the list is empty
    pub async fn find_all_items(&self) -> ProbarResult<Vec<ElementHandle>> {
        self.driver
            .find_all(&Selector::xpath(&self.contract.item_path))
            .await
    }

    /// Most recently added item
    pub async fn find_last_item(&self) -> ProbarResult<Lookup<ElementHandle>> {
        Ok(self.find_all_items().await?.pop().into())
    }

    /// First item whose text equals `label` exactly
    pub async fn find_item_by_text(&self, label: &str) -> ProbarResult<Lookup<ElementHandle>> {
        for item in self.find_all_items().await? {
            if self.driver.text(&item).await? == label {
                return Ok(Lookup::Found(item));
            }
        }
        Ok(Lookup::NotFound)
    }

    /// Tab whose key attribute equals `key`
    pub async fn find_tab(&self, key: &str) -> ProbarResult<Lookup<ElementHandle>> {
        for tab in self.find_all_tabs().await? {
            let tab_key = self
                .driver
                .attribute(&tab, &self.contract.tab_key_attribute)
                .await?;
            if tab_key.as_deref() == Some(key) {
                return Ok(Lookup::Found(tab));
            }
        }
        Ok(Lookup::NotFound)
    }

    /// Label of the first tab whose class equals the active marker
    pub async fn find_active_tab(&self) -> ProbarResult<ActiveTab> {
        for tab in self.find_all_tabs().await? {
            let class = self.driver.attribute(&tab, "class").await?;
            if class.as_deref() == Some(self.contract.active_tab_class.as_str()) {
                return Ok(ActiveTab::Label(self.driver.text(&tab).await?));
            }
        }
        Ok(ActiveTab::NoneActive)
    }

    /// Number of tabs whose class equals the active marker
    pub async fn count_active_tabs(&self) -> ProbarResult<usize> {
        let mut marked = 0;
        for tab in self.find_all_tabs().await? {
            let class = self.driver.attribute(&tab, "class").await?;
            if class.as_deref() == Some(self.contract.active_tab_class.as_str()) {
                marked += 1;
            }
        }
        Ok(marked)
    }

    /// Checkbox inside an item
    pub async fn find_item_checkbox(&self, item: &ElementHandle) -> ProbarResult<ElementHandle> {
        self.within(item, Selector::class(&self.contract.checkbox_class))
            .await
    }

    /// Delete control inside an item
    pub async fn find_item_delete_button(
        &self,
        item: &ElementHandle,
    ) -> ProbarResult<ElementHandle> {
        self.within(item, Selector::class(&self.contract.delete_button_class))
            .await
    }

    async fn within(
        &self,
        parent: &ElementHandle,
        selector: Selector,
    ) -> ProbarResult<ElementHandle> {
        self.driver
            .find_within(parent, &selector)
            .await?
            .ok_or_else(|| ProbarError::not_found(format!("{selector} in {parent}")))
    }
}
