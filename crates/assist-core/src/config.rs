//! Search endpoint and credential configuration.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Language;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    /// Failed to parse the config file.
    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    /// Failed to write the config file.
    #[error("Failed to write config file {path}: {message}")]
    Write { path: String, message: String },

    /// Endpoint is empty or not an http(s) URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Page size must be positive.
    #[error("Page size must be greater than zero")]
    ZeroPageSize,

    /// No language entries configured.
    #[error("At least one language must be configured")]
    NoLanguages,

    /// The same label appears twice in the credential table.
    #[error("Duplicate language label: {0}")]
    DuplicateLanguage(String),
}

/// Credentials and index for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Language label (e.g., "English").
    pub label: String,
    /// Backend index name.
    pub index_name: String,
    /// Value sent as the `Client-Id` header.
    #[serde(default)]
    pub client_id: String,
    /// Value sent as the `Secret-Key` header.
    #[serde(default)]
    pub secret_key: String,
}

impl LanguageConfig {
    /// Create an entry without credentials.
    pub fn new(label: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            index_name: index_name.into(),
            client_id: String::new(),
            secret_key: String::new(),
        }
    }

    /// Set the credentials.
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.secret_key = secret_key.into();
        self
    }

    /// Whether both credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.secret_key.is_empty()
    }
}

/// Configuration resolved once at startup and passed by reference into the
/// request builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint receiving the POST.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Items per results page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// `size` field sent with every request.
    #[serde(default = "default_result_size")]
    pub result_size: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of resolved responses kept in the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Credential table keyed by language label. The first entry is the
    /// fallback for unknown labels.
    #[serde(default = "default_languages")]
    pub languages: Vec<LanguageConfig>,
}

fn default_endpoint() -> String {
    "https://uat.search-assist.webc.in/api/search".to_string()
}

fn default_page_size() -> u32 {
    28
}

fn default_result_size() -> u32 {
    50
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_cache_capacity() -> usize {
    256
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig::new(Language::English.label(), "qa-en"),
        LanguageConfig::new(Language::Arabic.label(), "qa-ar"),
    ]
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            page_size: default_page_size(),
            result_size: default_result_size(),
            timeout_secs: default_timeout_secs(),
            cache_capacity: default_cache_capacity(),
            languages: default_languages(),
        }
    }
}

impl SearchConfig {
    /// Load config from a file. Paths ending in `.json` are parsed as JSON,
    /// everything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: display.clone(),
            message: e.to_string(),
        })?;

        if display.ends_with(".json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })
        } else {
            Self::from_toml_str(&content).map_err(|e| match e {
                ConfigError::Parse { message, .. } => ConfigError::Parse {
                    path: display,
                    message,
                },
                other => other,
            })
        }
    }

    /// Parse TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = if display.ends_with(".json") {
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Write {
                path: display.clone(),
                message: e.to_string(),
            })?
        } else {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Write {
                path: display.clone(),
                message: e.to_string(),
            })?
        };

        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: display,
            message: e.to_string(),
        })
    }

    /// Check the structural rules. Missing credentials are not an error;
    /// see [`SearchConfig::languages_missing_credentials`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidEndpoint("endpoint is empty".to_string()));
        }

        let parsed = url::Url::parse(&self.endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidEndpoint(format!(
                "{}: unsupported scheme {}",
                self.endpoint,
                parsed.scheme()
            )));
        }

        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }

        if self.languages.is_empty() {
            return Err(ConfigError::NoLanguages);
        }

        let mut seen = HashSet::new();
        for entry in &self.languages {
            if !seen.insert(entry.label.as_str()) {
                return Err(ConfigError::DuplicateLanguage(entry.label.clone()));
            }
        }

        Ok(())
    }

    /// Look up the credential record for a label, falling back to the first
    /// configured entry. `None` only when the table is empty.
    pub fn language(&self, label: &str) -> Option<&LanguageConfig> {
        self.languages
            .iter()
            .find(|entry| entry.label == label)
            .or_else(|| self.languages.first())
    }

    /// Labels whose entries lack a client ID or secret key.
    pub fn languages_missing_credentials(&self) -> Vec<&str> {
        self.languages
            .iter()
            .filter(|entry| !entry.has_credentials())
            .map(|entry| entry.label.as_str())
            .collect()
    }
}

/// Generate a commented default `assist.toml`.
pub fn generate_default_config() -> String {
    format!(
        r#"# Search assist client configuration

endpoint = "{endpoint}"
page_size = {page_size}
result_size = {result_size}
timeout_secs = {timeout}
cache_capacity = {capacity}

# The first entry is used when a location names an unknown language.
[[languages]]
label = "English"
index_name = "qa-en"
client_id = ""
secret_key = ""

[[languages]]
label = "Arabic"
index_name = "qa-ar"
client_id = ""
secret_key = ""
"#,
        endpoint = default_endpoint(),
        page_size = default_page_size(),
        result_size = default_result_size(),
        timeout = default_timeout_secs(),
        capacity = default_cache_capacity(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 28);
        assert_eq!(config.result_size, 50);
        assert_eq!(config.languages.len(), 2);
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let parsed = SearchConfig::from_toml_str(&generate_default_config()).unwrap();
        assert_eq!(parsed, SearchConfig::default());
    }

    #[test]
    fn test_language_lookup_and_fallback() {
        let config = SearchConfig::default();
        assert_eq!(config.language("Arabic").unwrap().index_name, "qa-ar");
        assert_eq!(config.language("Klingon").unwrap().index_name, "qa-en");

        let empty = SearchConfig {
            languages: Vec::new(),
            ..SearchConfig::default()
        };
        assert!(empty.language("English").is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SearchConfig::from_toml_str(
            r#"
endpoint = "https://search.example.com/api"

[[languages]]
label = "Arabic"
index_name = "prod-ar"
client_id = "id"
secret_key = "secret"
"#,
        )
        .unwrap();

        assert_eq!(config.endpoint, "https://search.example.com/api");
        assert_eq!(config.page_size, 28);
        assert_eq!(config.languages.len(), 1);
        assert!(config.languages[0].has_credentials());
        assert_eq!(config.language("English").unwrap().label, "Arabic");
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = SearchConfig {
            endpoint: "ftp://example.com".to_string(),
            ..SearchConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidEndpoint(_))));

        let config = SearchConfig {
            endpoint: "   ".to_string(),
            ..SearchConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_empty_table() {
        let mut config = SearchConfig::default();
        config.languages.push(LanguageConfig::new("English", "qa-en-2"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateLanguage(label)) if label == "English"
        ));

        config.languages.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoLanguages)));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let config = SearchConfig {
            page_size: 0,
            ..SearchConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroPageSize)));
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = SearchConfig::default();
        assert_eq!(config.languages_missing_credentials(), vec!["English", "Arabic"]);

        config.languages[0] = config.languages[0].clone().with_credentials("id", "key");
        assert_eq!(config.languages_missing_credentials(), vec!["Arabic"]);
    }

    #[test]
    fn test_unparseable_toml() {
        let result = SearchConfig::from_toml_str("page_size = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
