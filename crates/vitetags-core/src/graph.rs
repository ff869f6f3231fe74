//! Manifest dependency graph resolution.
//!
//! Starting from an entry, walk `imports` depth-first, emitting each chunk's
//! stylesheets and then its script once all of its imports have been emitted,
//! so dependencies always come first. Every touched path is registered for
//! nonce suppression and collected into one flat [`PreloadSet`].
//!
//! ```text
//! app.js ──imports──▶ lib.js        emit order:
//!   │                   │             1. <script lib.js>
//!   └─css─▶ app.css     └─ (none)     2. <link app.css>
//!                                     3. <script app.js>
//! ```
//!
//! The walk runs on an explicit stack with a visited set, so shared chunks are
//! emitted once and import cycles terminate.

use crate::emitter::TagEmitter;
use crate::error::Result;
use crate::manifest::{ManifestEntry, ManifestProvider};
use crate::nonce::NonceSuppressionRegistry;
use crate::options::{ScriptOptions, StyleOptions};
use crate::requirements::{ScriptAttributes, StyleAttributes};
use indexmap::IndexMap;
use std::collections::HashSet;

/// A resource to hint with `<link rel="preload">` / `modulepreload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadRequest {
    /// Built path.
    pub path: String,
    /// Value of the `as` attribute.
    pub as_: Option<String>,
    /// Value of the `type` attribute.
    pub mime: Option<String>,
}

impl PreloadRequest {
    #[must_use]
    pub fn new(path: impl Into<String>, as_: Option<&str>) -> Self {
        Self {
            path: path.into(),
            as_: as_.map(str::to_string),
            mime: None,
        }
    }

    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Preload requests keyed by logical identifier, in discovery order.
///
/// Inserting an existing key replaces its request without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadSet {
    requests: IndexMap<String, PreloadRequest>,
}

impl PreloadSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, request: PreloadRequest) {
        self.requests.insert(key.into(), request);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PreloadRequest> {
        self.requests.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PreloadRequest)> {
        self.requests.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.requests.keys().map(String::as_str)
    }
}

enum Frame {
    Enter { file: String, root: bool },
    Exit { file: String, path: String, css: Vec<String>, root: bool },
}

/// One resolution pass: the state threaded through a single top-level call.
pub struct ResolvePass<'p, 'e> {
    provider: &'p ManifestProvider,
    nonce: &'p mut NonceSuppressionRegistry,
    emitter: &'p mut TagEmitter<'e>,
    preloads: PreloadSet,
}

impl<'p, 'e> ResolvePass<'p, 'e> {
    pub fn new(
        provider: &'p ManifestProvider,
        nonce: &'p mut NonceSuppressionRegistry,
        emitter: &'p mut TagEmitter<'e>,
    ) -> Self {
        Self {
            provider,
            nonce,
            emitter,
            preloads: PreloadSet::new(),
        }
    }

    #[must_use]
    pub fn into_preloads(self) -> PreloadSet {
        self.preloads
    }

    /// Emit `file` and its import closure.
    ///
    /// Only the entry's own script tag receives `options`; transitively
    /// imported chunks get a plain module script. Unresolvable files are
    /// skipped without error.
    pub fn add_js(&mut self, file: &str, options: &ScriptOptions) -> Result<()> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut emitted_css: HashSet<String> = HashSet::new();
        let mut stack = vec![Frame::Enter {
            file: file.to_string(),
            root: true,
        }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter { file, root } => {
                    if !visited.insert(file.clone()) {
                        continue;
                    }

                    let Some(entry) = self.provider.resolve_resource(&file) else {
                        tracing::debug!(%file, "not in manifest, skipping");
                        continue;
                    };
                    let Some(path) = self.provider.resolve_path(&entry) else {
                        tracing::debug!(%file, "no built path, skipping");
                        continue;
                    };

                    self.nonce.add(file.as_str(), path.as_str());
                    self.preloads
                        .insert(file.as_str(), PreloadRequest::new(path.as_str(), Some("script")));

                    let ManifestEntry { imports, css, .. } = entry;
                    stack.push(Frame::Exit {
                        file,
                        path,
                        css,
                        root,
                    });
                    // Reversed so the first import is walked first
                    stack.extend(
                        imports
                            .into_iter()
                            .rev()
                            .map(|file| Frame::Enter { file, root: false }),
                    );
                }
                Frame::Exit {
                    file,
                    path,
                    css,
                    root,
                } => {
                    for css_file in css {
                        self.add_css_dependency(&css_file, &mut emitted_css)?;
                    }

                    let attributes = if root {
                        ScriptAttributes::from_options(options)
                    } else {
                        ScriptAttributes::module()
                    };
                    tracing::trace!(%file, %path, "script");
                    self.emitter.script(self.nonce, &path, &attributes)?;
                }
            }
        }

        Ok(())
    }

    /// Emit a stylesheet entry. Stylesheets have no further dependencies.
    pub fn add_css(&mut self, file: &str, media: Option<&str>, options: &StyleOptions) -> Result<()> {
        let Some(path) = self.provider.resolve_path(file) else {
            tracing::debug!(%file, "stylesheet not in manifest, skipping");
            return Ok(());
        };

        self.nonce.add(file, path.as_str());
        self.preloads
            .insert(file, PreloadRequest::new(path.as_str(), Some("style")));
        self.emitter
            .stylesheet(self.nonce, &path, media, &StyleAttributes::from(options))
    }

    /// Collect a preload for `file` without emitting a primary tag.
    pub fn preload_file(&mut self, file: &str, as_: Option<&str>, mime: Option<&str>) {
        let Some(path) = self.provider.resolve_path(file) else {
            tracing::debug!(%file, "preload target not in manifest, skipping");
            return;
        };

        self.nonce.add(file, path.as_str());
        let mut request = PreloadRequest::new(path, as_);
        request.mime = mime.map(str::to_string);
        self.preloads.insert(file, request);
    }

    /// A chunk's CSS entry names a built file, not a manifest key, so it is
    /// resolved through an ad-hoc entry.
    fn add_css_dependency(&mut self, css_file: &str, emitted: &mut HashSet<String>) -> Result<()> {
        let Some(path) = self.provider.resolve_path(&ManifestEntry::adhoc(css_file)) else {
            return Ok(());
        };

        self.nonce.add(css_file, path.as_str());
        self.preloads
            .insert(css_file, PreloadRequest::new(path.as_str(), Some("style")));

        if emitted.insert(path.clone()) {
            self.emitter
                .stylesheet(self.nonce, &path, None, &StyleAttributes::default())?;
        }
        Ok(())
    }
}
