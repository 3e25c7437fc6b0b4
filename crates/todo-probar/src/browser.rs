//! Browser control for the live application.
//!
//! [`BrowserConfig`] is always available so configuration files parse the same
//! with or without a browser. When compiled with the `browser` feature,
//! [`ChromiumDriver`] drives a real Chromium over the Chrome `DevTools` Protocol
//! via chromiumoxide and implements [`TodoDriver`](crate::driver::TodoDriver).

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            user_agent: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{ElementHandle, Selector, TodoDriver};
    use crate::result::{ProbarError, ProbarResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::element::Element;
    use chromiumoxide::error::CdpError;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::Mutex;
    use tracing::{debug, warn};

    const IS_DISPLAYED_JS: &str = "function() { \
        const style = window.getComputedStyle(this); \
        if (style.visibility === 'hidden' || style.display === 'none') { return false; } \
        return !!(this.offsetWidth || this.offsetHeight || this.getClientRects().length); \
    }";

    /// [`TodoDriver`] backed by a real Chromium session
    #[derive(Debug)]
    pub struct ChromiumDriver {
        config: BrowserConfig,
        browser: Option<CdpBrowser>,
        page: CdpPage,
        handler: tokio::task::JoinHandle<()>,
        elements: Mutex<HashMap<u64, Element>>,
        next_node: AtomicU64,
    }

    impl ChromiumDriver {
        /// Launch Chromium and open a blank page
        pub async fn launch(config: BrowserConfig) -> ProbarResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            if let Some(ref ua) = config.user_agent {
                builder = builder.arg(format!("--user-agent={ua}"));
            }

            let cdp_config = builder.build().map_err(|message| {
                if config.chromium_path.is_none() && message.contains("detect") {
                    ProbarError::BrowserNotFound
                } else {
                    ProbarError::BrowserLaunchError { message }
                }
            })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ProbarError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        debug!(error = %e, "CDP handler stopped");
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ProbarError::BrowserLaunchError {
                    message: e.to_string(),
                })?;

            debug!(headless = config.headless, "chromium launched");
            Ok(Self {
                config,
                browser: Some(browser),
                page,
                handler,
                elements: Mutex::new(HashMap::new()),
                next_node: AtomicU64::new(1),
            })
        }

        /// The launch configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        async fn register(&self, found: Vec<Element>, description: &str) -> Vec<ElementHandle> {
            let mut elements = self.elements.lock().await;
            found
                .into_iter()
                .map(|element| {
                    let node = self.next_node.fetch_add(1, Ordering::Relaxed);
                    elements.insert(node, element);
                    ElementHandle::new(node, description)
                })
                .collect()
        }

        async fn property(
            &self,
            handle: &ElementHandle,
            name: &str,
        ) -> ProbarResult<Option<serde_json::Value>> {
            let elements = self.elements.lock().await;
            let element = lookup(&elements, handle)?;
            element
                .property(name)
                .await
                .map_err(|e| classify(handle, &e))
        }
    }

    fn lookup<'m>(
        elements: &'m HashMap<u64, Element>,
        handle: &ElementHandle,
    ) -> ProbarResult<&'m Element> {
        elements
            .get(&handle.node)
            .ok_or(ProbarError::StaleElement { node: handle.node })
    }

    /// Whether a backend error only says the node it asked about is gone
    pub(super) fn is_missing_node(err: &dyn std::fmt::Display) -> bool {
        let lower = err.to_string().to_ascii_lowercase();
        lower.contains("node")
            && ["not found", "no node", "find", "detached"]
                .iter()
                .any(|needle| lower.contains(needle))
    }

    /// Map a backend error on an element to a stale handle or a command failure
    pub(super) fn classify(handle: &ElementHandle, err: &dyn std::fmt::Display) -> ProbarError {
        if is_missing_node(err) {
            ProbarError::StaleElement { node: handle.node }
        } else {
            ProbarError::command(format!("{handle}: {err}"))
        }
    }

    /// An empty match set, or the failure that stopped the query
    fn matches_or_none(
        result: Result<Vec<Element>, CdpError>,
        query: &str,
    ) -> ProbarResult<Vec<Element>> {
        match result {
            Ok(found) => Ok(found),
            Err(e) if is_missing_node(&e) => {
                debug!(query, error = %e, "no match");
                Ok(Vec::new())
            }
            Err(e) => Err(ProbarError::command(format!("{query}: {e}"))),
        }
    }

    #[async_trait]
    impl TodoDriver for ChromiumDriver {
        async fn navigate(&mut self, url: &str) -> ProbarResult<()> {
            self.elements.get_mut().clear();
            self.page
                .goto(url)
                .await
                .map_err(|e| ProbarError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn title(&self) -> ProbarResult<String> {
            let title = self.page.get_title().await.map_err(ProbarError::command)?;
            Ok(title.unwrap_or_default())
        }

        async fn ready_state(&self) -> ProbarResult<String> {
            self.page
                .evaluate("document.readyState")
                .await
                .map_err(ProbarError::command)?
                .into_value::<String>()
                .map_err(ProbarError::command)
        }

        async fn find(&self, selector: &Selector) -> ProbarResult<Option<ElementHandle>> {
            Ok(self.find_all(selector).await?.into_iter().next())
        }

        async fn find_all(&self, selector: &Selector) -> ProbarResult<Vec<ElementHandle>> {
            let result = match selector {
                Selector::XPath(path) => self.page.find_xpaths(path.as_str()).await,
                other => {
                    let css = other.to_css().ok_or_else(|| {
                        ProbarError::command(format!("cannot express {other} as CSS"))
                    })?;
                    self.page.find_elements(css).await
                }
            };
            // CDP reports an empty match set as a missing node for some queries
            let description = selector.to_string();
            let found = matches_or_none(result, &description)?;
            Ok(self.register(found, &description).await)
        }

        async fn find_within(
            &self,
            parent: &ElementHandle,
            selector: &Selector,
        ) -> ProbarResult<Option<ElementHandle>> {
            let css = selector.to_css().ok_or_else(|| {
                ProbarError::command(format!("cannot scope {selector} to an element"))
            })?;
            let description = format!("{selector} in {parent}");
            let found = {
                let elements = self.elements.lock().await;
                let element = lookup(&elements, parent)?;
                matches_or_none(element.find_elements(css).await, &description)?
            };
            Ok(self.register(found, &description).await.into_iter().next())
        }

        async fn text(&self, element: &ElementHandle) -> ProbarResult<String> {
            let elements = self.elements.lock().await;
            let text = lookup(&elements, element)?
                .inner_text()
                .await
                .map_err(|e| classify(element, &e))?;
            Ok(text.unwrap_or_default().trim().to_string())
        }

        async fn attribute(
            &self,
            element: &ElementHandle,
            name: &str,
        ) -> ProbarResult<Option<String>> {
            if name == "value" {
                return Ok(self.property(element, name).await?.and_then(|value| match value {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                }));
            }
            let elements = self.elements.lock().await;
            lookup(&elements, element)?
                .attribute(name)
                .await
                .map_err(|e| classify(element, &e))
        }

        async fn is_selected(&self, element: &ElementHandle) -> ProbarResult<bool> {
            let checked = self.property(element, "checked").await?;
            Ok(matches!(checked, Some(serde_json::Value::Bool(true))))
        }

        async fn is_displayed(&self, element: &ElementHandle) -> ProbarResult<bool> {
            let elements = self.elements.lock().await;
            let returns = lookup(&elements, element)?
                .call_js_fn(IS_DISPLAYED_JS, false)
                .await
                .map_err(|e| classify(element, &e))?;
            Ok(matches!(
                returns.result.value,
                Some(serde_json::Value::Bool(true))
            ))
        }

        async fn click(&self, element: &ElementHandle) -> ProbarResult<()> {
            let elements = self.elements.lock().await;
            lookup(&elements, element)?
                .click()
                .await
                .map_err(|e| classify(element, &e))?;
            Ok(())
        }

        async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbarResult<()> {
            let elements = self.elements.lock().await;
            lookup(&elements, element)?
                .type_str(text)
                .await
                .map_err(|e| classify(element, &e))?;
            Ok(())
        }

        async fn close(&mut self) -> ProbarResult<()> {
            self.elements.get_mut().clear();
            if let Some(mut browser) = self.browser.take() {
                if let Err(e) = browser.close().await {
                    warn!(error = %e, "browser did not close cleanly");
                }
                if let Err(e) = browser.wait().await {
                    warn!(error = %e, "browser process did not exit cleanly");
                }
            }
            self.handler.abort();
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod config_tests {
        use super::*;

        #[test]
        fn test_defaults_are_headless_and_sandboxed() {
            let config = BrowserConfig::default();
            assert!(config.headless);
            assert!(config.sandbox);
            assert!(config.chromium_path.is_none());
        }

        #[test]
        fn test_builders() {
            let config = BrowserConfig::default()
                .with_viewport(1024, 768)
                .with_headless(false)
                .with_chromium_path("/usr/bin/chromium")
                .with_user_agent("todo-probar")
                .with_no_sandbox();
            assert_eq!((config.viewport_width, config.viewport_height), (1024, 768));
            assert!(!config.headless);
            assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
            assert_eq!(config.user_agent.as_deref(), Some("todo-probar"));
            assert!(!config.sandbox);
        }

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config: BrowserConfig = serde_yaml_ng::from_str("sandbox: false").unwrap();
            assert!(!config.sandbox);
            assert!(config.headless);
            assert_eq!(config.viewport_width, 1280);
        }
    }

    #[cfg(feature = "browser")]
    mod classify_tests {
        use crate::browser::cdp::{classify, is_missing_node};
        use crate::driver::ElementHandle;
        use crate::result::ProbarError;

        #[test]
        fn test_detached_node_is_stale() {
            let handle = ElementHandle::new(7, "#task-input");
            let err = classify(&handle, &"Could not find node with given id");
            assert!(matches!(err, ProbarError::StaleElement { node: 7 }));
        }

        #[test]
        fn test_other_errors_are_command_failures() {
            let handle = ElementHandle::new(7, "#task-input");
            let err = classify(&handle, &"Element is not clickable");
            assert!(matches!(err, ProbarError::CommandFailed { .. }));
            assert!(!err.is_locate_failure());
        }

        #[test]
        fn test_only_missing_nodes_count_as_no_match() {
            assert!(is_missing_node(&"No node found for given backend id"));
            assert!(is_missing_node(&"Could not find node with given id"));
            assert!(!is_missing_node(&"Target closed"));
            assert!(!is_missing_node(&"DOM.querySelectorAll: Invalid selector"));
            assert!(!is_missing_node(&"Timeout while waiting for response"));
        }
    }
}
