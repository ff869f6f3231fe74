//! Vite build manifest model.
//!
//! The manifest is the JSON document written by `vite build --manifest`. It
//! maps each logical source path (e.g. `src/main.ts`) to the chunk built from
//! it:
//!
//! ```json
//! {
//!   "src/main.ts": {
//!     "file": "assets/main.4889e940.js",
//!     "src": "src/main.ts",
//!     "isEntry": true,
//!     "imports": ["_shared.83069a53.js"],
//!     "css": ["assets/main.b82dbe22.css"]
//!   }
//! }
//! ```
//!
//! `imports` name other manifest keys; `css` already names built stylesheet
//! paths, which are generally not manifest keys themselves.

mod provider;

pub use provider::{ManifestProvider, Resource};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// One chunk or asset in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Built output path, relative to the build output base.
    pub file: String,

    /// Logical source path this chunk was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    /// Chunk name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_entry: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_dynamic_entry: bool,

    /// Manifest keys this chunk statically imports, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// Manifest keys this chunk may import lazily. Never preloaded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic_imports: Vec<String>,

    /// Built stylesheet paths this chunk depends on, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<String>,

    /// Other built assets (fonts, images) referenced by this chunk.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

impl ManifestEntry {
    /// Create an entry for a built file with no dependencies.
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Default::default()
        }
    }

    /// Stand-in entry for a file that is referenced but not a manifest key,
    /// such as a chunk's CSS dependency.
    #[must_use]
    pub fn adhoc(file: impl Into<String>) -> Self {
        Self::new(file)
    }

    #[must_use]
    pub fn with_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports = imports.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_css<I, S>(mut self, css: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.css = css.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn entry_point(mut self) -> Self {
        self.is_entry = true;
        self
    }
}

/// Parsed build manifest, keyed by logical source path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: HashMap<String, ManifestEntry>,
}

/// A reference from one manifest entry that does not resolve to a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DanglingImport {
    /// Key of the entry holding the reference.
    pub owner: String,
    /// The missing key.
    pub import: String,
}

impl Manifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest JSON.
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Read and parse a manifest file, reporting every failure.
    ///
    /// Page rendering goes through [`ManifestProvider`], which degrades these
    /// errors to an empty manifest instead.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            vitetags_util::fs::read_to_string_lossy(path).map_err(|source| Error::ManifestRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&content).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Add or replace an entry.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, entry: ManifestEntry) -> Self {
        self.entries.insert(key.into(), entry);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys of entries flagged `isEntry`, sorted.
    #[must_use]
    pub fn entry_points(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .iter()
            .filter(|(_, entry)| entry.is_entry)
            .map(|(key, _)| key)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Every built path the manifest references: chunk files, CSS and assets.
    #[must_use]
    pub fn referenced_files(&self) -> BTreeSet<&str> {
        let mut files = BTreeSet::new();
        for (_, entry) in self.iter() {
            files.insert(entry.file.as_str());
            files.extend(entry.css.iter().map(String::as_str));
            files.extend(entry.assets.iter().map(String::as_str));
        }
        files
    }

    /// Static and dynamic imports naming keys that are not in the manifest, sorted.
    #[must_use]
    pub fn dangling_imports(&self) -> Vec<DanglingImport> {
        let mut dangling: Vec<DanglingImport> = self
            .iter()
            .flat_map(|(owner, entry)| {
                entry
                    .imports
                    .iter()
                    .chain(&entry.dynamic_imports)
                    .filter(|import| !self.contains(import))
                    .map(move |import| DanglingImport {
                        owner: owner.to_string(),
                        import: import.clone(),
                    })
            })
            .collect();
        dangling.sort();
        dangling
    }
}

impl FromIterator<(String, ManifestEntry)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, ManifestEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
