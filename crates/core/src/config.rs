use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::paths::Paths;
use crate::types::Mode;

/// The page the widget tree belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// Document location; query, fragment and path parameters are stripped
    /// to obtain the base URI.
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub session: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
    /// `None` follows HTTP(S)_PROXY, `Some("")` forces a direct connection.
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub no_proxy: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("widgetlink/{}", env!("CARGO_PKG_VERSION"))
}

fn default_follow_redirects() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            follow_redirects: default_follow_redirects(),
            proxy: None,
            no_proxy: Vec::new(),
        }
    }
}

/// Element id convention shared with the server's markup:
/// `prefix + path.replace('/', "__") + suffix`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderConfig {
    #[serde(default = "default_content_prefix")]
    pub content_prefix: String,
    #[serde(default = "default_nested_prefix")]
    pub nested_prefix: String,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

fn default_content_prefix() -> String {
    "beng_widget___".to_string()
}

fn default_nested_prefix() -> String {
    "beng_iframe___".to_string()
}

fn default_suffix() -> String {
    "__".to_string()
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            content_prefix: default_content_prefix(),
            nested_prefix: default_nested_prefix(),
            suffix: default_suffix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshConfig {
    /// Mode used for the navigation target of a nested browsing context.
    #[serde(default = "default_nested_context_mode")]
    pub nested_context_mode: Mode,
}

fn default_nested_context_mode() -> Mode {
    Mode::Frame
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            nested_context_mode: default_nested_context_mode(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub placeholders: PlaceholderConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The configured page location, trimmed; `None` when unset.
    pub fn page_location(&self) -> Option<&str> {
        let location = self.page.location.trim();
        if location.is_empty() {
            None
        } else {
            Some(location)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.transport.timeout_secs, 30);
        assert!(cfg.transport.follow_redirects);
        assert_eq!(cfg.placeholders.content_prefix, "beng_widget___");
        assert_eq!(cfg.placeholders.nested_prefix, "beng_iframe___");
        assert_eq!(cfg.placeholders.suffix, "__");
        assert_eq!(cfg.refresh.nested_context_mode, Mode::Frame);
        assert!(cfg.page_location().is_none());
    }

    #[test]
    fn test_camel_case_keys() {
        let raw = r#"{
  "page": { "location": " http://h/p?x=1 ", "session": "S1" },
  "transport": { "timeoutSecs": 5, "noProxy": ["localhost"] },
  "refresh": { "nestedContextMode": "focus" }
}"#;
        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.page_location(), Some("http://h/p?x=1"));
        assert_eq!(cfg.page.session, "S1");
        assert_eq!(cfg.transport.timeout_secs, 5);
        assert_eq!(cfg.transport.no_proxy, vec!["localhost".to_string()]);
        assert_eq!(cfg.refresh.nested_context_mode, Mode::Focus);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(dir.path().join("nested"));
        let mut cfg = Config::default();
        cfg.page.session = "abc".to_string();
        cfg.save(&paths.config_file()).unwrap();

        let loaded = Config::load_or_default(&paths).unwrap();
        assert_eq!(loaded.page.session, "abc");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(dir.path().to_path_buf());
        let cfg = Config::load_or_default(&paths).unwrap();
        assert_eq!(cfg.page.session, "");
    }
}
