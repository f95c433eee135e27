use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeprepConfig {
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl CodeprepConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: CodeprepConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Environment overrides applied on top of file or default values.
    pub fn with_env(mut self) -> Self {
        self.apply_env(|key| std::env::var(key).ok());
        self
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("CODEPREP_PRIMARY_URL") {
            self.execution.primary.url = url;
        }
        if let Some(url) = var("CODEPREP_SECONDARY_URL") {
            let key = self.execution.primary.api_key.clone();
            self.execution.secondary = Some(BackendConfig { url, api_key: key });
        }
        if let Some(key) = var("CODEPREP_API_KEY") {
            self.execution.primary.api_key = Some(key.clone());
            if let Some(secondary) = self.execution.secondary.as_mut() {
                secondary.api_key = Some(key);
            }
        }
        if let Some(node) = var("CODEPREP_NODE") {
            self.reference.command = node;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.primary.url.is_empty() {
            return Err(ConfigError::Invalid("execution.primary.url is empty".into()));
        }
        if self.execution.timeout_secs == 0 {
            return Err(ConfigError::Invalid("execution.timeout_secs must be > 0".into()));
        }
        if self.reference.timeout_ms == 0 {
            return Err(ConfigError::Invalid("reference.timeout_ms must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub primary: BackendConfig,
    #[serde(default)]
    pub secondary: Option<BackendConfig>,
    pub timeout_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            primary: BackendConfig {
                url: "http://localhost:2000/api/v2/execute".to_string(),
                api_key: None,
            },
            secondary: None,
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub command: String,
    pub timeout_ms: u64,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            command: "node".to_string(),
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub cache_ttl_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { cache_ttl_secs: 600 }
    }
}
