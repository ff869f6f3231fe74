//! Resource URL generation and scoped nonce suppression.
//!
//! A URL generator maps a path relative to the public root to the URL a
//! browser requests, normally appending a cache-busting "nonce" query
//! (`?m=<mtime>`). Files whose names already carry a content hash must not get
//! one, or the same chunk could be fetched twice under different URLs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vitetags_util::fs::{is_contained_relative, modified_unix_secs};
use vitetags_util::hash::short_fingerprint;

/// Length of the digest prefix used by [`NonceStyle::Hash`].
const HASH_NONCE_LEN: usize = 12;

/// How a URL generator busts caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceStyle {
    /// `?m=<modification time in seconds>`
    Mtime,
    /// `?h=<first 12 hex chars of the BLAKE3 digest>`
    Hash,
}

impl NonceStyle {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mtime => "mtime",
            Self::Hash => "hash",
        }
    }
}

/// Maps resource paths to URLs.
///
/// Implemented by the host; [`SimpleUrlGenerator`] covers the common case of
/// a public directory served under a base URL.
pub trait ResourceUrlGenerator {
    /// URL for a path relative to the public root.
    ///
    /// Errors (missing file, path escaping the root) are configuration
    /// problems and propagate to the caller.
    fn url_for_resource(&self, path: &str) -> Result<String>;

    /// Current nonce style, `None` when suffixing is off.
    fn nonce_style(&self) -> Option<NonceStyle>;

    fn set_nonce_style(&mut self, style: Option<NonceStyle>);
}

/// Nonce suffixing switched off for as long as this guard lives.
///
/// The previous style is restored on drop, so it comes back even when URL
/// generation fails or unwinds.
pub struct NonceSuppressed<'g> {
    generator: &'g mut dyn ResourceUrlGenerator,
    previous: Option<NonceStyle>,
}

impl<'g> NonceSuppressed<'g> {
    pub fn acquire(generator: &'g mut dyn ResourceUrlGenerator) -> Self {
        let previous = generator.nonce_style();
        generator.set_nonce_style(None);
        Self {
            generator,
            previous,
        }
    }

    /// Generate a URL with suffixing off.
    pub fn url_for_resource(&self, path: &str) -> Result<String> {
        self.generator.url_for_resource(path)
    }
}

impl Drop for NonceSuppressed<'_> {
    fn drop(&mut self) {
        self.generator.set_nonce_style(self.previous.take());
    }
}

/// URL generator for a public directory served under a base URL.
///
/// `dist/assets/app.js` under root `public/` and base `/` becomes
/// `/dist/assets/app.js?m=1700000000`.
#[derive(Debug, Clone)]
pub struct SimpleUrlGenerator {
    base_url: String,
    public_root: PathBuf,
    nonce_style: Option<NonceStyle>,
    verify_exists: bool,
}

impl SimpleUrlGenerator {
    /// Generator with mtime nonces that requires resources to exist.
    #[must_use]
    pub fn new(base_url: impl Into<String>, public_root: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            public_root: public_root.into(),
            nonce_style: Some(NonceStyle::Mtime),
            verify_exists: true,
        }
    }

    #[must_use]
    pub fn with_nonce_style(mut self, style: Option<NonceStyle>) -> Self {
        self.nonce_style = style;
        self
    }

    /// When off, missing files produce a URL without a nonce instead of an error.
    #[must_use]
    pub fn with_verify_exists(mut self, verify: bool) -> Self {
        self.verify_exists = verify;
        self
    }

    fn nonce_for(&self, absolute: &Path) -> Result<Option<String>> {
        match self.nonce_style {
            None => Ok(None),
            Some(NonceStyle::Mtime) => {
                Ok(modified_unix_secs(absolute).map(|secs| format!("m={secs}")))
            }
            Some(NonceStyle::Hash) => {
                let digest = short_fingerprint(absolute, HASH_NONCE_LEN)?;
                Ok(Some(format!("h={digest}")))
            }
        }
    }

    fn ensure_inside_root(&self, absolute: &Path, path: &str) -> Result<()> {
        let root = dunce::canonicalize(&self.public_root)?;
        let resolved = dunce::canonicalize(absolute)?;
        if resolved.starts_with(&root) {
            Ok(())
        } else {
            Err(Error::ResourceOutsideRoot {
                path: path.to_string(),
            })
        }
    }
}

impl ResourceUrlGenerator for SimpleUrlGenerator {
    fn url_for_resource(&self, path: &str) -> Result<String> {
        let (path_and_query, fragment) = match path.find('#') {
            Some(idx) => path.split_at(idx),
            None => (path, ""),
        };
        let (relative, query) = match path_and_query.find('?') {
            Some(idx) => path_and_query.split_at(idx),
            None => (path_and_query, ""),
        };

        if !is_contained_relative(Path::new(relative)) {
            return Err(Error::ResourceOutsideRoot {
                path: path.to_string(),
            });
        }

        let absolute = self.public_root.join(relative);
        let base = self.base_url.trim_end_matches('/');
        let mut url = format!("{base}/{}{query}", relative.trim_start_matches("./"));

        if !absolute.is_file() {
            if self.verify_exists {
                return Err(Error::ResourceNotFound {
                    path: path.to_string(),
                });
            }
            url.push_str(fragment);
            return Ok(url);
        }

        // Symlinks may still point outside the root
        self.ensure_inside_root(&absolute, path)?;

        if let Some(nonce) = self.nonce_for(&absolute)? {
            url.push(if query.is_empty() { '?' } else { '&' });
            url.push_str(&nonce);
        }
        url.push_str(fragment);

        Ok(url)
    }

    fn nonce_style(&self) -> Option<NonceStyle> {
        self.nonce_style
    }

    fn set_nonce_style(&mut self, style: Option<NonceStyle>) {
        self.nonce_style = style;
    }
}
