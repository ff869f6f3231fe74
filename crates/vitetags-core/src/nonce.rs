//! Per-render record of resources that must not be cache-busted.

use std::collections::BTreeMap;

/// Logical files (and the built paths they resolved to) whose URLs must be
/// generated without a nonce suffix.
///
/// Filled while walking the manifest; hosts may add or remove entries by
/// hand. One registry lives for one page render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NonceSuppressionRegistry {
    files: BTreeMap<String, String>,
}

impl NonceSuppressionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_disabled_for_file(&self, file: &str) -> bool {
        self.files.contains_key(file)
    }

    #[must_use]
    pub fn is_disabled_for_path(&self, path: &str) -> bool {
        self.files.values().any(|p| p == path)
    }

    /// Record `file → path`, replacing any earlier path for `file`.
    pub fn add(&mut self, file: impl Into<String>, path: impl Into<String>) {
        self.files.insert(file.into(), path.into());
    }

    /// Forget `file`. Returns the path it was mapped to.
    pub fn remove(&mut self, file: &str) -> Option<String> {
        self.files.remove(file)
    }

    #[must_use]
    pub fn path_for(&self, file: &str) -> Option<&str> {
        self.files.get(file).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `(file, path)` pairs ordered by file.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(f, p)| (f.as_str(), p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_and_path_lookup() {
        let mut registry = NonceSuppressionRegistry::new();
        registry.add("app.js", "dist/assets/app.ab12.js");

        assert!(registry.is_disabled_for_file("app.js"));
        assert!(registry.is_disabled_for_path("dist/assets/app.ab12.js"));
        assert!(!registry.is_disabled_for_file("dist/assets/app.ab12.js"));
        assert!(!registry.is_disabled_for_path("app.js"));
    }

    #[test]
    fn test_remove_only_affects_one_file() {
        let mut registry = NonceSuppressionRegistry::new();
        registry.add("app.js", "dist/app.js");
        registry.add("lib.js", "dist/lib.js");

        assert_eq!(registry.remove("app.js").as_deref(), Some("dist/app.js"));
        assert!(!registry.is_disabled_for_file("app.js"));
        assert!(!registry.is_disabled_for_path("dist/app.js"));
        assert!(registry.is_disabled_for_file("lib.js"));
        assert!(registry.is_disabled_for_path("dist/lib.js"));
        assert_eq!(registry.len(), 1);
        assert!(registry.remove("app.js").is_none());
    }

    #[test]
    fn test_add_replaces_path() {
        let mut registry = NonceSuppressionRegistry::new();
        registry.add("app.js", "dist/app.v1.js");
        registry.add("app.js", "dist/app.v2.js");

        assert_eq!(registry.path_for("app.js"), Some("dist/app.v2.js"));
        assert!(!registry.is_disabled_for_path("dist/app.v1.js"));
        assert_eq!(registry.iter().count(), 1);
    }
}
