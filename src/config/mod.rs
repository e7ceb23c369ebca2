use crate::error::{JsonFaultError, Result};
use crate::exception::PrefixMatcher;
use dashmap::DashMap;
use std::env;
use std::sync::Arc;

/// Adds message prefixes treated as developer misuse, comma separated
pub const MISUSE_PREFIXES_KEY: &str = "JSONFAULT_MISUSE_PREFIXES";

/// Whether error pages name the request path
pub const SHOW_DETAILS_KEY: &str = "JSONFAULT_SHOW_DETAILS";

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Seeded from the process environment
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(JsonFaultError::invalid_config(key, raw)),
        }
    }

    /// Comma separated values, trimmed, empties dropped
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Settings for [`JsonProcessingFilter`](crate::exception::JsonProcessingFilter)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub show_details: bool,
    pub extra_misuse_prefixes: Vec<String>,
}

impl FilterConfig {
    pub fn load(config: &ConfigService) -> Result<Self> {
        let loaded = Self {
            show_details: config.get_bool(SHOW_DETAILS_KEY)?.unwrap_or(false),
            extra_misuse_prefixes: config.get_list(MISUSE_PREFIXES_KEY),
        };
        tracing::debug!(
            show_details = loaded.show_details,
            extra_prefixes = loaded.extra_misuse_prefixes.len(),
            "Loaded JSON error filter configuration"
        );
        Ok(loaded)
    }

    /// Default prefix plus the configured extras
    pub fn misuse_matcher(&self) -> PrefixMatcher {
        PrefixMatcher::default().with_prefixes(self.extra_misuse_prefixes.iter().cloned())
    }
}
