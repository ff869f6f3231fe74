//! Lazily loaded, fail-soft manifest access.

use super::{Manifest, ManifestEntry};
use crate::config::Config;
use crate::error::Result;
use crate::urls::ResourceUrlGenerator;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Something that can be resolved to a built path.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// Logical source path, looked up in the manifest.
    Name(&'a str),
    /// An entry already in hand (or an ad-hoc one for a CSS dependency).
    Entry(&'a ManifestEntry),
}

impl<'a> From<&'a str> for Resource<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for Resource<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

impl<'a> From<&'a ManifestEntry> for Resource<'a> {
    fn from(entry: &'a ManifestEntry) -> Self {
        Self::Entry(entry)
    }
}

#[derive(Debug)]
enum Source {
    File(PathBuf),
    Fixed(Arc<Manifest>),
}

/// Owns the manifest and resolves logical names to built paths.
///
/// The manifest is read on first use and cached until [`invalidate`] is
/// called. A missing or malformed file is logged and treated as empty, so
/// every lookup comes back `None` and pages render without those assets.
///
/// [`invalidate`]: ManifestProvider::invalidate
#[derive(Debug)]
pub struct ManifestProvider {
    source: Source,
    output_base: String,
    cache: RwLock<Option<Arc<Manifest>>>,
}

impl ManifestProvider {
    /// Provider reading the manifest file named by the config.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::from_path(&config.manifest_path, &config.output_base)
    }

    #[must_use]
    pub fn from_path(path: &Path, output_base: impl Into<String>) -> Self {
        Self {
            source: Source::File(path.to_path_buf()),
            output_base: output_base.into(),
            cache: RwLock::new(None),
        }
    }

    /// Provider over an in-memory manifest.
    #[must_use]
    pub fn from_manifest(manifest: Manifest, output_base: impl Into<String>) -> Self {
        Self {
            source: Source::Fixed(Arc::new(manifest)),
            output_base: output_base.into(),
            cache: RwLock::new(None),
        }
    }

    /// The loaded manifest, loading it first if needed.
    ///
    /// Two threads racing here may both parse the file; the first stored
    /// result wins and both observe it afterwards.
    pub fn manifest(&self) -> Arc<Manifest> {
        if let Some(manifest) = self.read_cache().as_ref() {
            return Arc::clone(manifest);
        }

        let loaded = self.load();
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.get_or_insert(loaded))
    }

    /// Whether the manifest has been loaded since construction or the last
    /// invalidation.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.read_cache().is_some()
    }

    /// Drop the cached manifest; the next lookup reloads it.
    pub fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Exact-key lookup of a logical source path.
    #[must_use]
    pub fn resolve_resource(&self, file: &str) -> Option<ManifestEntry> {
        self.manifest().get(file).cloned()
    }

    /// Built path for a logical name or entry, joined with the output base.
    pub fn resolve_path<'r>(&self, resource: impl Into<Resource<'r>>) -> Option<String> {
        match resource.into() {
            Resource::Name(name) => {
                let manifest = self.manifest();
                manifest.get(name).and_then(|entry| self.built_path(&entry.file))
            }
            Resource::Entry(entry) => self.built_path(&entry.file),
        }
    }

    /// [`resolve_path`](Self::resolve_path) followed by URL generation.
    ///
    /// Unresolvable resources yield `Ok(None)`; generator failures propagate.
    pub fn resolve_url<'r>(
        &self,
        resource: impl Into<Resource<'r>>,
        urls: &dyn ResourceUrlGenerator,
    ) -> Result<Option<String>> {
        self.resolve_path(resource)
            .map(|path| urls.url_for_resource(&path))
            .transpose()
    }

    fn built_path(&self, file: &str) -> Option<String> {
        let file = file.trim_start_matches('/');
        if file.is_empty() {
            return None;
        }

        let base = self.output_base.trim_end_matches('/');
        if base.is_empty() {
            Some(file.to_string())
        } else {
            Some(format!("{base}/{file}"))
        }
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, Option<Arc<Manifest>>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> Arc<Manifest> {
        let path = match &self.source {
            Source::Fixed(manifest) => return Arc::clone(manifest),
            Source::File(path) => path,
        };

        match Manifest::load(path) {
            Ok(manifest) => {
                tracing::debug!(
                    path = %path.display(),
                    entries = manifest.len(),
                    "loaded manifest"
                );
                Arc::new(manifest)
            }
            Err(e) => {
                tracing::warn!(error = %e, "manifest unavailable, no assets will resolve");
                Arc::new(Manifest::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urls::NonceStyle;

    fn sample() -> Manifest {
        Manifest::new()
            .with_entry(
                "app.js",
                ManifestEntry::new("assets/app.ab12.js")
                    .with_imports(["lib.js"])
                    .with_css(["app.css"]),
            )
            .with_entry("lib.js", ManifestEntry::new("assets/lib.cd34.js"))
    }

    struct PrefixUrls;

    impl ResourceUrlGenerator for PrefixUrls {
        fn url_for_resource(&self, path: &str) -> Result<String> {
            Ok(format!("https://cdn.test/{path}"))
        }

        fn nonce_style(&self) -> Option<NonceStyle> {
            None
        }

        fn set_nonce_style(&mut self, _style: Option<NonceStyle>) {}
    }

    #[test]
    fn test_resolve_resource() {
        let provider = ManifestProvider::from_manifest(sample(), "dist");
        let entry = provider.resolve_resource("app.js").unwrap();
        assert_eq!(entry.file, "assets/app.ab12.js");
        assert!(provider.resolve_resource("missing.js").is_none());
    }

    #[test]
    fn test_resolve_path_by_name_and_entry() {
        let provider = ManifestProvider::from_manifest(sample(), "dist/");
        assert_eq!(
            provider.resolve_path("lib.js").as_deref(),
            Some("dist/assets/lib.cd34.js")
        );
        assert_eq!(
            provider.resolve_path(&ManifestEntry::adhoc("app.css")).as_deref(),
            Some("dist/app.css")
        );
        assert!(provider.resolve_path("missing.js").is_none());
        assert!(provider.resolve_path(&ManifestEntry::adhoc("")).is_none());
    }

    #[test]
    fn test_resolve_path_empty_base() {
        let provider = ManifestProvider::from_manifest(sample(), "");
        assert_eq!(
            provider.resolve_path("app.js").as_deref(),
            Some("assets/app.ab12.js")
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let provider = ManifestProvider::from_manifest(sample(), "dist");
        let first = provider.resolve_path("app.js");
        let second = provider.resolve_path("app.js");
        assert_eq!(first, second);
        assert_eq!(
            provider.resolve_resource("app.js"),
            provider.resolve_resource("app.js")
        );
    }

    #[test]
    fn test_resolve_url() {
        let provider = ManifestProvider::from_manifest(sample(), "dist");
        assert_eq!(
            provider.resolve_url("app.js", &PrefixUrls).unwrap().as_deref(),
            Some("https://cdn.test/dist/assets/app.ab12.js")
        );
        assert!(provider.resolve_url("missing.js", &PrefixUrls).unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ManifestProvider::from_path(&dir.path().join("manifest.json"), "dist");
        assert!(provider.resolve_resource("app.js").is_none());
        assert!(provider.manifest().is_empty());
        assert!(provider.is_loaded());
    }

    #[test]
    fn test_malformed_file_is_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, r#"{"app.js": "not an entry"}"#).unwrap();

        let provider = ManifestProvider::from_path(&path, "dist");
        assert!(provider.resolve_path("app.js").is_none());
    }

    #[test]
    fn test_loads_lazily_and_invalidates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, r#"{"app.js": {"file": "assets/app.v1.js"}}"#).unwrap();

        let provider = ManifestProvider::from_path(&path, "dist");
        assert!(!provider.is_loaded());
        assert_eq!(
            provider.resolve_path("app.js").as_deref(),
            Some("dist/assets/app.v1.js")
        );

        std::fs::write(&path, r#"{"app.js": {"file": "assets/app.v2.js"}}"#).unwrap();
        // Cached until invalidated
        assert_eq!(
            provider.resolve_path("app.js").as_deref(),
            Some("dist/assets/app.v1.js")
        );

        provider.invalidate();
        assert!(!provider.is_loaded());
        assert_eq!(
            provider.resolve_path("app.js").as_deref(),
            Some("dist/assets/app.v2.js")
        );
    }
}
