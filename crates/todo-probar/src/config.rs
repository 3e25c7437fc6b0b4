//! Harness configuration.
//!
//! Everything a journey run needs besides the driver: the page URL, browser
//! launch options, readiness timing, and the application contract. All
//! sections are optional in YAML and fall back to the built-in defaults.

use crate::browser::BrowserConfig;
use crate::contract::AppContract;
use crate::result::{ProbarError, ProbarResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Page the journey targets unless overridden
pub const DEFAULT_URL: &str = "https://ngo500.github.io/todo_website/";

/// Complete configuration of one journey run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Application URL
    pub url: String,
    /// Browser launch options
    pub browser: BrowserConfig,
    /// Readiness timing
    pub wait: WaitOptions,
    /// Selectors and strings of the application
    pub contract: AppContract,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            browser: BrowserConfig::default(),
            wait: WaitOptions::default(),
            contract: AppContract::default(),
        }
    }
}

impl HarnessConfig {
    /// Set the application URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Replace the browser options
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Replace the readiness timing
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ProbarResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load(path: &Path) -> ProbarResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml).map_err(|e| match e {
            ProbarError::ConfigError { message } => ProbarError::ConfigError {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> ProbarResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject values no run could succeed with
    pub fn validate(&self) -> ProbarResult<()> {
        if self.url.trim().is_empty() {
            return Err(config_error("url must not be empty"));
        }
        if self.wait.timeout_ms == 0 {
            return Err(config_error("wait.timeout_ms must be greater than zero"));
        }
        if self.wait.poll_interval_ms == 0 {
            return Err(config_error("wait.poll_interval_ms must be greater than zero"));
        }
        if self.wait.poll_interval_ms > self.wait.timeout_ms {
            return Err(config_error(
                "wait.poll_interval_ms must not exceed wait.timeout_ms",
            ));
        }
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            return Err(config_error("browser viewport must be non-empty"));
        }
        let contract = &self.contract;
        for (name, value) in [
            ("contract.tab_path", &contract.tab_path),
            ("contract.tab_key_attribute", &contract.tab_key_attribute),
            ("contract.active_tab_class", &contract.active_tab_class),
            ("contract.input_id", &contract.input_id),
            ("contract.add_button_id", &contract.add_button_id),
            ("contract.item_path", &contract.item_path),
            ("contract.checkbox_class", &contract.checkbox_class),
            ("contract.delete_button_class", &contract.delete_button_class),
            ("contract.items_left_id", &contract.items_left_id),
            ("contract.empty_state_class", &contract.empty_state_class),
            ("contract.empty_icon_path", &contract.empty_icon_path),
            ("contract.empty_message_id", &contract.empty_message_id),
        ] {
            if value.trim().is_empty() {
                return Err(config_error(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> ProbarError {
    ProbarError::ConfigError {
        message: message.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_empty_document_is_default() {
            let config = HarnessConfig::from_yaml_str("{}").unwrap();
            assert_eq!(config, HarnessConfig::default());
            assert_eq!(config.url, DEFAULT_URL);
        }

        #[test]
        fn test_partial_override() {
            let yaml = r"
url: http://localhost:8080/
wait:
  timeout_ms: 2500
browser:
  headless: false
contract:
  title: My Tasks
";
            let config = HarnessConfig::from_yaml_str(yaml).unwrap();
            assert_eq!(config.url, "http://localhost:8080/");
            assert_eq!(config.wait.timeout_ms, 2500);
            assert_eq!(config.wait.poll_interval_ms, WaitOptions::default().poll_interval_ms);
            assert!(!config.browser.headless);
            assert_eq!(config.contract.title, "My Tasks");
            assert_eq!(config.contract.input_id, "task-input");
        }

        #[test]
        fn test_yaml_round_trip() {
            let config = HarnessConfig::default().with_url("http://127.0.0.1:3000/");
            let yaml = config.to_yaml().unwrap();
            assert_eq!(HarnessConfig::from_yaml_str(&yaml).unwrap(), config);
        }

        #[test]
        fn test_malformed_yaml() {
            let err = HarnessConfig::from_yaml_str("url: [unclosed").unwrap_err();
            assert!(matches!(err, ProbarError::Yaml(_)));
        }
    }

    mod validate_tests {
        use super::*;

        #[test]
        fn test_rejects_empty_url() {
            let err = HarnessConfig::from_yaml_str("url: ''").unwrap_err();
            assert!(err.to_string().contains("url must not be empty"));
        }

        #[test]
        fn test_rejects_zero_timeout() {
            let config = HarnessConfig::default().with_wait(WaitOptions::new().with_timeout(0));
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_rejects_poll_longer_than_timeout() {
            let config = HarnessConfig::default()
                .with_wait(WaitOptions::new().with_timeout(10).with_poll_interval(20));
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_rejects_blank_selector() {
            let err = HarnessConfig::from_yaml_str("contract:\n  input_id: ' '").unwrap_err();
            assert!(err.to_string().contains("contract.input_id"));
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_load_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("todo.yaml");
            std::fs::write(&path, "url: http://example.test/\n").unwrap();
            let config = HarnessConfig::load(&path).unwrap();
            assert_eq!(config.url, "http://example.test/");
        }

        #[test]
        fn test_load_names_the_file_on_invalid_config() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("bad.yaml");
            std::fs::write(&path, "url: ''\n").unwrap();
            let err = HarnessConfig::load(&path).unwrap_err();
            assert!(err.to_string().contains("bad.yaml"));
        }

        #[test]
        fn test_load_missing_file_is_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let err = HarnessConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
            assert!(matches!(err, ProbarError::Io(_)));
        }
    }
}
