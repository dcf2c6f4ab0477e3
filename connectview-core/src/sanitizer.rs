//! Secret redaction for connector configurations
//!
//! Connector configs routinely carry credentials (JDBC passwords, JAAS
//! configs, cloud keys). Every config map leaves the pipeline through
//! [`ConfigSanitizer::sanitize`], which replaces the value of any key that
//! matches a sensitive pattern.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::config::SanitizerConfig;
use crate::models::ConnectorConfig;
use crate::{Error, Result};

/// Replacement written in place of a redacted value
pub const MASK: &str = "******";

/// Key patterns that are always redacted.
///
/// Plain patterns match as a case-insensitive key suffix; patterns containing
/// regex metacharacters are used as full-key regexes.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "sasl.jaas.config",
    "basic.auth.user.info",
    "password",
    "secret",
    "token",
    "key",
    ".*credentials.*",
    "aws.access.key.id",
    "aws.secret.access.key",
    "aws.session.token",
];

#[derive(Debug, Clone)]
pub struct ConfigSanitizer {
    enabled: bool,
    patterns: Vec<Regex>,
}

impl ConfigSanitizer {
    /// Build a sanitizer from configuration
    pub fn new(config: &SanitizerConfig) -> Result<Self> {
        let patterns = DEFAULT_PATTERNS
            .iter()
            .copied()
            .chain(config.patterns.iter().map(String::as_str))
            .map(compile_pattern)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            enabled = config.enabled,
            patterns = patterns.len(),
            "Config sanitizer initialized"
        );

        Ok(Self {
            enabled: config.enabled,
            patterns,
        })
    }

    /// Sanitizer that passes configs through untouched
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            patterns: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_sensitive(&self, key: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(key))
    }

    /// Return a copy of `config` with sensitive values masked
    #[must_use]
    pub fn sanitize(&self, config: ConnectorConfig) -> ConnectorConfig {
        if !self.enabled {
            return config;
        }
        config
            .into_iter()
            .map(|(key, value)| {
                if self.is_sensitive(&key) {
                    (key, MASK.to_string())
                } else {
                    (key, value)
                }
            })
            .collect()
    }
}

impl Default for ConfigSanitizer {
    fn default() -> Self {
        Self::new(&SanitizerConfig::default()).unwrap_or_else(|_| Self::disabled())
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    let is_regex = pattern.contains(['*', '^', '$', '[', '(', '|', '+', '?']);
    let source = if is_regex {
        format!("^(?:{pattern})$")
    } else {
        format!("^.*{}$", regex::escape(pattern))
    };
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Configuration(format!("invalid sanitizer pattern '{pattern}': {e}")))
}
