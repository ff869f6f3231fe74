//! Per-call tag options.
//!
//! Unknown fields are rejected when options come from JSON, so a typo such as
//! `"defered"` fails loudly instead of being spread into tag attributes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Options for [`AssetContext::javascript`](crate::AssetContext::javascript).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptOptions {
    /// Also emit preload/modulepreload links for the whole dependency closure.
    #[serde(default = "default_true")]
    pub preload: bool,

    #[serde(default, rename = "async")]
    pub is_async: bool,

    #[serde(default)]
    pub defer: bool,

    /// Overrides the default `type="module"`.
    #[serde(default, rename = "type")]
    pub script_type: Option<String>,

    /// Subresource integrity hash.
    #[serde(default)]
    pub integrity: Option<String>,

    /// Cross-origin policy. An empty string renders a bare attribute.
    #[serde(default)]
    pub crossorigin: Option<String>,

    /// Scripts bundled in this file. Informational only.
    #[serde(default)]
    pub provides: Vec<String>,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            preload: true,
            is_async: false,
            defer: false,
            script_type: None,
            integrity: None,
            crossorigin: None,
            provides: Vec::new(),
        }
    }
}

impl ScriptOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::InvalidOptions)
    }

    #[must_use]
    pub fn with_preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    #[must_use]
    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    #[must_use]
    pub fn with_defer(mut self, defer: bool) -> Self {
        self.defer = defer;
        self
    }

    #[must_use]
    pub fn with_type(mut self, script_type: impl Into<String>) -> Self {
        self.script_type = Some(script_type.into());
        self
    }

    #[must_use]
    pub fn with_integrity(mut self, integrity: impl Into<String>) -> Self {
        self.integrity = Some(integrity.into());
        self
    }

    #[must_use]
    pub fn with_crossorigin(mut self, crossorigin: impl Into<String>) -> Self {
        self.crossorigin = Some(crossorigin.into());
        self
    }
}

/// Options for [`AssetContext::css`](crate::AssetContext::css).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleOptions {
    #[serde(default = "default_true")]
    pub preload: bool,

    #[serde(default)]
    pub integrity: Option<String>,

    #[serde(default)]
    pub crossorigin: Option<String>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            preload: true,
            integrity: None,
            crossorigin: None,
        }
    }
}

impl StyleOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::InvalidOptions)
    }

    #[must_use]
    pub fn with_preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    #[must_use]
    pub fn with_integrity(mut self, integrity: impl Into<String>) -> Self {
        self.integrity = Some(integrity.into());
        self
    }

    #[must_use]
    pub fn with_crossorigin(mut self, crossorigin: impl Into<String>) -> Self {
        self.crossorigin = Some(crossorigin.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_defaults() {
        let options = ScriptOptions::from_json("{}").unwrap();
        assert_eq!(options, ScriptOptions::default());
        assert!(options.preload);
        assert!(options.script_type.is_none());
    }

    #[test]
    fn test_script_from_json() {
        let options = ScriptOptions::from_json(
            r#"{"preload": false, "async": true, "type": "text/javascript", "integrity": "sha384-x", "provides": ["a.js"]}"#,
        )
        .unwrap();
        assert!(!options.preload);
        assert!(options.is_async);
        assert!(!options.defer);
        assert_eq!(options.script_type.as_deref(), Some("text/javascript"));
        assert_eq!(options.integrity.as_deref(), Some("sha384-x"));
        assert_eq!(options.provides, vec!["a.js"]);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(matches!(
            ScriptOptions::from_json(r#"{"defered": true}"#),
            Err(Error::InvalidOptions(_))
        ));
        assert!(StyleOptions::from_json(r#"{"media": "print"}"#).is_err());
    }

    #[test]
    fn test_style_from_json() {
        let options = StyleOptions::from_json(r#"{"crossorigin": "anonymous"}"#).unwrap();
        assert!(options.preload);
        assert_eq!(options.crossorigin.as_deref(), Some("anonymous"));
    }
}
