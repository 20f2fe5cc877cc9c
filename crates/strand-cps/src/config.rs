//! Transform configuration: runtime protocol names, synthesized-name prefix,
//! recursion bound and per-warning severity overrides.
//!
//! Loaded from the `[transform]` table of a TOML document:
//!
//! ```toml
//! [transform]
//! reserved_prefix = "__"
//! max_depth = 256
//!
//! [transform.runtime]
//! new_counter = "newDeferralCounter"
//!
//! [transform.severity]
//! empty-wait = "off"
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, TransformWarning};

/// How a warning is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Not reported
    Off,
    /// Reported, compilation proceeds
    Warn,
    /// Reported, compilation of the function fails
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Off => write!(f, "off"),
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Names of the runtime deferral-counter protocol the output calls into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeNames {
    /// Global function creating a counter
    pub new_counter: String,
    /// Counter method returning a deferred callback
    pub defer: String,
    /// Counter method registering the continuation
    pub wait: String,
}

impl Default for RuntimeNames {
    fn default() -> Self {
        Self {
            new_counter: "newDeferralCounter".to_string(),
            defer: "defer".to_string(),
            wait: "wait".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Prefix of every synthesized name; user declarations may not use it.
    pub reserved_prefix: String,

    pub runtime: RuntimeNames,

    /// Deepest statement nesting accepted.
    pub max_depth: usize,

    /// Check the rotated output before returning it.
    pub verify: bool,

    /// Per-warning severity overrides. Key = warning name (e.g. "empty-wait").
    pub(crate) severity: HashMap<String, Severity>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            reserved_prefix: "__".to_string(),
            runtime: RuntimeNames::default(),
            max_depth: 256,
            verify: true,
            severity: HashMap::new(),
        }
    }
}

#[derive(Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    transform: TransformConfig,
}

impl TransformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `[transform]` table of a TOML document. A document without
    /// the table yields the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let document: ConfigDocument = toml::from_str(source)?;
        document.transform.validate()?;
        Ok(document.transform)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.reserved_prefix) {
            return Err(ConfigError::InvalidPrefix(self.reserved_prefix.clone()));
        }
        for name in [
            &self.runtime.new_counter,
            &self.runtime.defer,
            &self.runtime.wait,
        ] {
            if !is_identifier(name) {
                return Err(ConfigError::InvalidRuntimeName(name.clone()));
            }
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if let Some(unknown) = self
            .severity
            .keys()
            .find(|name| !TransformWarning::NAMES.contains(&name.as_str()))
        {
            return Err(ConfigError::UnknownWarning(unknown.clone()));
        }
        Ok(())
    }

    /// Set the severity for a specific warning.
    pub fn set_severity(&mut self, warning: &str, severity: Severity) {
        self.severity.insert(warning.to_string(), severity);
    }

    /// Get the effective severity for a warning, falling back to its default.
    pub fn effective_severity(&self, warning: &str, default: Severity) -> Severity {
        self.severity.get(warning).copied().unwrap_or(default)
    }

    /// Check if a warning is explicitly disabled.
    pub fn is_disabled(&self, warning: &str) -> bool {
        self.severity.get(warning) == Some(&Severity::Off)
    }

    /// Whether `name` could clash with a synthesized name.
    pub fn is_reserved(&self, name: &str) -> bool {
        name.starts_with(&self.reserved_prefix)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
