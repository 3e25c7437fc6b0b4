//! In-memory model of the to-do application.
//!
//! `MockTodoApp` renders the same DOM contract the real page does (tabs,
//! input, add button, item list, empty state, counter) and implements
//! [`TodoDriver`], so the whole harness runs without a browser. Faults can be
//! injected to make the model misbehave in the ways the journey is meant to
//! catch.
//!
//! Items stay in the document under every filter; the active filter only
//! toggles their visibility. The empty-state block is attached only while the
//! current filter shows no item.

use crate::contract::{items_left_text, AppContract, FilterTab};
use crate::driver::{ElementHandle, Selector, TodoDriver};
use crate::result::{ProbarError, ProbarResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::Mutex;

/// Node references at or above this value belong to list items
const ITEM_NODE_BASE: u64 = 1_000;

/// Ways the model can be told to misbehave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MockFault {
    /// Document title differs from the contract
    WrongTitle,
    /// Counter reads "1 active items left"
    SingularCounter,
    /// Clicking a tab leaves no tab carrying the active marker
    NoActiveMarker,
    /// The task input keeps its text after an add
    InputNotCleared,
    /// Delete buttons do nothing
    DeleteNoop,
    /// Empty state always shows the "All" message
    WrongEmptyMessage,
    /// Navigation fails
    Unreachable,
    /// The Completed tab keeps the active marker after it is left
    StaleActiveMarker,
    /// Clicking a delete button kills the page
    CrashOnDelete,
}

impl MockFault {
    /// Every fault
    pub const ALL: [Self; 9] = [
        Self::WrongTitle,
        Self::SingularCounter,
        Self::NoActiveMarker,
        Self::InputNotCleared,
        Self::DeleteNoop,
        Self::WrongEmptyMessage,
        Self::Unreachable,
        Self::StaleActiveMarker,
        Self::CrashOnDelete,
    ];

    /// Kebab-case name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WrongTitle => "wrong-title",
            Self::SingularCounter => "singular-counter",
            Self::NoActiveMarker => "no-active-marker",
            Self::InputNotCleared => "input-not-cleared",
            Self::DeleteNoop => "delete-noop",
            Self::WrongEmptyMessage => "wrong-empty-message",
            Self::Unreachable => "unreachable",
            Self::StaleActiveMarker => "stale-active-marker",
            Self::CrashOnDelete => "crash-on-delete",
        }
    }
}

impl fmt::Display for MockFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MockFault {
    type Err = ProbarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|fault| fault.name() == s)
            .ok_or_else(|| ProbarError::ConfigError {
                message: format!("unknown mock fault '{s}'"),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Tab(FilterTab),
    Input,
    AddButton,
    EmptyState,
    EmptyIcon,
    EmptyMessage,
    Item(u64),
    Checkbox(u64),
    DeleteButton(u64),
    Counter,
}

impl Node {
    const fn id(self) -> u64 {
        match self {
            Self::Tab(FilterTab::All) => 1,
            Self::Tab(FilterTab::Active) => 2,
            Self::Tab(FilterTab::Completed) => 3,
            Self::Input => 10,
            Self::AddButton => 11,
            Self::EmptyState => 20,
            Self::EmptyIcon => 21,
            Self::EmptyMessage => 22,
            Self::Counter => 30,
            Self::Item(serial) => ITEM_NODE_BASE + serial * 4,
            Self::Checkbox(serial) => ITEM_NODE_BASE + serial * 4 + 1,
            Self::DeleteButton(serial) => ITEM_NODE_BASE + serial * 4 + 2,
        }
    }

    const fn from_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(Self::Tab(FilterTab::All)),
            2 => Some(Self::Tab(FilterTab::Active)),
            3 => Some(Self::Tab(FilterTab::Completed)),
            10 => Some(Self::Input),
            11 => Some(Self::AddButton),
            20 => Some(Self::EmptyState),
            21 => Some(Self::EmptyIcon),
            22 => Some(Self::EmptyMessage),
            30 => Some(Self::Counter),
            n if n >= ITEM_NODE_BASE => {
                let offset = n - ITEM_NODE_BASE;
                let serial = offset / 4;
                match offset % 4 {
                    0 => Some(Self::Item(serial)),
                    1 => Some(Self::Checkbox(serial)),
                    2 => Some(Self::DeleteButton(serial)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn children(self) -> Vec<Self> {
        match self {
            Self::Item(serial) => vec![Self::Checkbox(serial), Self::DeleteButton(serial)],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MockItem {
    serial: u64,
    text: String,
    completed: bool,
}

#[derive(Debug, Default)]
struct MockState {
    url: Option<String>,
    filter: Option<FilterTab>,
    marker_lost: bool,
    completed_marker_stuck: bool,
    input: String,
    items: Vec<MockItem>,
    next_serial: u64,
    closed: bool,
    history: Vec<String>,
}

impl MockState {
    fn filter(&self) -> FilterTab {
        self.filter.unwrap_or(FilterTab::All)
    }

    fn item(&self, serial: u64) -> Option<&MockItem> {
        self.items.iter().find(|item| item.serial == serial)
    }

    fn empty_shown(&self) -> bool {
        let filter = self.filter();
        !self.items.iter().any(|item| filter.shows(item.completed))
    }

    fn attached(&self, node: Node) -> bool {
        if self.url.is_none() {
            return false;
        }
        match node {
            Node::Item(serial) | Node::Checkbox(serial) | Node::DeleteButton(serial) => {
                self.item(serial).is_some()
            }
            Node::EmptyState | Node::EmptyIcon | Node::EmptyMessage => self.empty_shown(),
            _ => true,
        }
    }

    /// Attached nodes in document order
    fn document(&self) -> Vec<Node> {
        if self.url.is_none() {
            return Vec::new();
        }
        let mut nodes: Vec<Node> = FilterTab::ALL_TABS.into_iter().map(Node::Tab).collect();
        nodes.push(Node::Input);
        nodes.push(Node::AddButton);
        if self.empty_shown() {
            nodes.extend([Node::EmptyState, Node::EmptyIcon, Node::EmptyMessage]);
        }
        for item in &self.items {
            nodes.extend([
                Node::Item(item.serial),
                Node::Checkbox(item.serial),
                Node::DeleteButton(item.serial),
            ]);
        }
        nodes.push(Node::Counter);
        nodes
    }

    fn push_item(&mut self, text: String, completed: bool) {
        self.next_serial += 1;
        self.items.push(MockItem {
            serial: self.next_serial,
            text,
            completed,
        });
    }
}

/// In-memory to-do application implementing [`TodoDriver`]
#[derive(Debug)]
pub struct MockTodoApp {
    contract: AppContract,
    faults: Vec<MockFault>,
    seed: Vec<(String, bool)>,
    state: Mutex<MockState>,
}

impl Default for MockTodoApp {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTodoApp {
    /// Create a well-behaved app with the default contract and no items
    #[must_use]
    pub fn new() -> Self {
        Self {
            contract: AppContract::default(),
            faults: Vec::new(),
            seed: Vec::new(),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Render against a different contract
    #[must_use]
    pub fn with_contract(mut self, contract: AppContract) -> Self {
        self.contract = contract;
        self
    }

    /// Inject a fault
    #[must_use]
    pub fn with_fault(mut self, fault: MockFault) -> Self {
        if !self.faults.contains(&fault) {
            self.faults.push(fault);
        }
        self
    }

    /// Start every page load with this item already in the list
    #[must_use]
    pub fn with_item(mut self, text: impl Into<String>, completed: bool) -> Self {
        self.seed.push((text.into(), completed));
        self
    }

    /// Injected faults
    #[must_use]
    pub fn faults(&self) -> &[MockFault] {
        &self.faults
    }

    fn has(&self, fault: MockFault) -> bool {
        self.faults.contains(&fault)
    }

    /// Calls made so far
    pub async fn history(&self) -> Vec<String> {
        self.state.lock().await.history.clone()
    }

    /// Check if a call starting with `method` was made
    pub async fn was_called(&self, method: &str) -> bool {
        self.state
            .lock()
            .await
            .history
            .iter()
            .any(|call| call.starts_with(method))
    }

    /// Current list as (text, completed) pairs
    pub async fn items(&self) -> Vec<(String, bool)> {
        self.state
            .lock()
            .await
            .items
            .iter()
            .map(|item| (item.text.clone(), item.completed))
            .collect()
    }

    fn live(state: &MockState) -> ProbarResult<()> {
        if state.closed {
            Err(ProbarError::command("session closed"))
        } else {
            Ok(())
        }
    }

    fn resolve(state: &MockState, element: &ElementHandle) -> ProbarResult<Node> {
        Self::live(state)?;
        Node::from_id(element.node)
            .filter(|node| state.attached(*node))
            .ok_or(ProbarError::StaleElement { node: element.node })
    }

    fn class_of(&self, state: &MockState, node: Node) -> Option<String> {
        match node {
            Node::Tab(tab) => {
                let current = !state.marker_lost && state.filter() == tab;
                let stuck = tab == FilterTab::Completed && state.completed_marker_stuck;
                if current || stuck {
                    Some(self.contract.active_tab_class.clone())
                } else {
                    Some("filter".to_string())
                }
            }
            Node::EmptyState => Some(self.contract.empty_state_class.clone()),
            Node::EmptyIcon => Some(self.contract.empty_icon_class.clone()),
            Node::Item(serial) => state.item(serial).map(|item| {
                if item.completed {
                    "todo-item completed".to_string()
                } else {
                    "todo-item".to_string()
                }
            }),
            Node::Checkbox(_) => Some(self.contract.checkbox_class.clone()),
            Node::DeleteButton(_) => Some(self.contract.delete_button_class.clone()),
            Node::Input | Node::AddButton | Node::EmptyMessage | Node::Counter => None,
        }
    }

    fn id_of(&self, node: Node) -> Option<&str> {
        match node {
            Node::Input => Some(&self.contract.input_id),
            Node::AddButton => Some(&self.contract.add_button_id),
            Node::EmptyMessage => Some(&self.contract.empty_message_id),
            Node::Counter => Some(&self.contract.items_left_id),
            _ => None,
        }
    }

    fn path_of(&self, node: Node) -> Option<&str> {
        match node {
            Node::Tab(_) => Some(&self.contract.tab_path),
            Node::Item(_) => Some(&self.contract.item_path),
            Node::EmptyIcon => Some(&self.contract.empty_icon_path),
            _ => None,
        }
    }

    fn attribute_of(&self, state: &MockState, node: Node, name: &str) -> Option<String> {
        match (name, node) {
            ("class", _) => self.class_of(state, node),
            ("id", _) => self.id_of(node).map(str::to_string),
            ("placeholder", Node::Input) => Some(self.contract.input_placeholder.clone()),
            ("value", Node::Input) => Some(state.input.clone()),
            ("type", Node::Checkbox(_)) => Some("checkbox".to_string()),
            (attr, Node::Tab(tab)) if attr == self.contract.tab_key_attribute => {
                Some(tab.key().to_string())
            }
            _ => None,
        }
    }

    fn text_of(&self, state: &MockState, node: Node) -> String {
        match node {
            Node::Tab(tab) => tab.label().to_string(),
            Node::AddButton => "Add".to_string(),
            Node::EmptyMessage => {
                if self.has(MockFault::WrongEmptyMessage) {
                    FilterTab::All.empty_message().to_string()
                } else {
                    state.filter().empty_message().to_string()
                }
            }
            Node::Item(serial) => state
                .item(serial)
                .map(|item| item.text.clone())
                .unwrap_or_default(),
            Node::Counter => {
                let active = state.items.iter().filter(|item| !item.completed).count();
                if active == 1 && self.has(MockFault::SingularCounter) {
                    "1 active items left".to_string()
                } else {
                    items_left_text(active)
                }
            }
            Node::Input
            | Node::EmptyState
            | Node::EmptyIcon
            | Node::Checkbox(_)
            | Node::DeleteButton(_) => String::new(),
        }
    }

    fn matches(&self, state: &MockState, node: Node, selector: &Selector) -> bool {
        match selector {
            Selector::Id(id) => self.id_of(node) == Some(id.as_str()),
            Selector::Class(wanted) => self.class_of(state, node).is_some_and(|class| {
                let have: Vec<&str> = class.split_whitespace().collect();
                wanted.split_whitespace().all(|token| have.contains(&token))
            }),
            Selector::XPath(path) => self
                .path_of(node)
                .is_some_and(|own| own.trim_start_matches('/') == path.trim_start_matches('/')),
            Selector::Css(_) => false,
        }
    }

    fn ensure_supported(selector: &Selector) -> ProbarResult<()> {
        if let Selector::Css(css) = selector {
            return Err(ProbarError::command(format!(
                "CSS selector '{css}' is not supported by the in-memory app"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TodoDriver for MockTodoApp {
    async fn navigate(&mut self, url: &str) -> ProbarResult<()> {
        let unreachable = self.has(MockFault::Unreachable);
        let state = self.state.get_mut();
        Self::live(state)?;
        state.history.push(format!("navigate:{url}"));
        if unreachable {
            return Err(ProbarError::NavigationError {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        state.url = Some(url.to_string());
        state.filter = Some(FilterTab::All);
        state.marker_lost = false;
        state.completed_marker_stuck = false;
        state.input.clear();
        state.items.clear();
        for (text, completed) in &self.seed {
            state.push_item(text.clone(), *completed);
        }
        Ok(())
    }

    async fn title(&self) -> ProbarResult<String> {
        let state = self.state.lock().await;
        Self::live(&state)?;
        if state.url.is_none() {
            return Ok(String::new());
        }
        if self.has(MockFault::WrongTitle) {
            Ok("Untitled".to_string())
        } else {
            Ok(self.contract.title.clone())
        }
    }

    async fn ready_state(&self) -> ProbarResult<String> {
        let state = self.state.lock().await;
        Self::live(&state)?;
        Ok(if state.url.is_some() { "complete" } else { "loading" }.to_string())
    }

    async fn find(&self, selector: &Selector) -> ProbarResult<Option<ElementHandle>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    async fn find_all(&self, selector: &Selector) -> ProbarResult<Vec<ElementHandle>> {
        Self::ensure_supported(selector)?;
        let mut state = self.state.lock().await;
        Self::live(&state)?;
        state.history.push(format!("find:{selector}"));
        let description = selector.to_string();
        Ok(state
            .document()
            .into_iter()
            .filter(|node| self.matches(&state, *node, selector))
            .map(|node| ElementHandle::new(node.id(), description.clone()))
            .collect())
    }

    async fn find_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ProbarResult<Option<ElementHandle>> {
        Self::ensure_supported(selector)?;
        let state = self.state.lock().await;
        let parent_node = Self::resolve(&state, parent)?;
        Ok(parent_node
            .children()
            .into_iter()
            .find(|node| self.matches(&state, *node, selector))
            .map(|node| ElementHandle::new(node.id(), format!("{selector} in {parent}"))))
    }

    async fn text(&self, element: &ElementHandle) -> ProbarResult<String> {
        let state = self.state.lock().await;
        let node = Self::resolve(&state, element)?;
        Ok(self.text_of(&state, node).trim().to_string())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> ProbarResult<Option<String>> {
        let state = self.state.lock().await;
        let node = Self::resolve(&state, element)?;
        Ok(self.attribute_of(&state, node, name))
    }

    async fn is_selected(&self, element: &ElementHandle) -> ProbarResult<bool> {
        let state = self.state.lock().await;
        match Self::resolve(&state, element)? {
            Node::Checkbox(serial) => Ok(state.item(serial).is_some_and(|item| item.completed)),
            _ => Ok(false),
        }
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ProbarResult<bool> {
        let state = self.state.lock().await;
        match Self::resolve(&state, element)? {
            Node::Item(serial) | Node::Checkbox(serial) | Node::DeleteButton(serial) => Ok(state
                .item(serial)
                .is_some_and(|item| state.filter().shows(item.completed))),
            _ => Ok(true),
        }
    }

    async fn click(&self, element: &ElementHandle) -> ProbarResult<()> {
        let mut state = self.state.lock().await;
        let node = Self::resolve(&state, element)?;
        state.history.push(format!("click:{}", element.node));
        match node {
            Node::Tab(tab) => {
                state.filter = Some(tab);
                state.marker_lost = self.has(MockFault::NoActiveMarker);
                if tab == FilterTab::Completed && self.has(MockFault::StaleActiveMarker) {
                    state.completed_marker_stuck = true;
                }
            }
            Node::AddButton => {
                if !state.input.is_empty() {
                    let text = state.input.clone();
                    state.push_item(text, false);
                    if !self.has(MockFault::InputNotCleared) {
                        state.input.clear();
                    }
                }
            }
            Node::Checkbox(serial) => {
                if let Some(item) = state.items.iter_mut().find(|item| item.serial == serial) {
                    item.completed = !item.completed;
                }
            }
            Node::DeleteButton(serial) => {
                if self.has(MockFault::CrashOnDelete) {
                    state.closed = true;
                    return Err(ProbarError::command("target crashed"));
                }
                if !self.has(MockFault::DeleteNoop) {
                    state.items.retain(|item| item.serial != serial);
                }
            }
            Node::Input
            | Node::EmptyState
            | Node::EmptyIcon
            | Node::EmptyMessage
            | Node::Item(_)
            | Node::Counter => {}
        }
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbarResult<()> {
        let mut state = self.state.lock().await;
        let node = Self::resolve(&state, element)?;
        state.history.push(format!("type:{}:{text}", element.node));
        if node == Node::Input {
            state.input.push_str(text);
            Ok(())
        } else {
            Err(ProbarError::command(format!("{element} is not editable")))
        }
    }

    async fn close(&mut self) -> ProbarResult<()> {
        let state = self.state.get_mut();
        state.history.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}
