//! Turns resolved built paths into tags on the requirements sink.

use crate::error::Result;
use crate::graph::PreloadSet;
use crate::html::{create_tag, Attr};
use crate::nonce::NonceSuppressionRegistry;
use crate::requirements::{Requirements, ScriptAttributes, StyleAttributes};
use crate::urls::{NonceSuppressed, ResourceUrlGenerator};

/// Whether a built path is a JavaScript module (and gets `modulepreload`).
#[must_use]
pub fn is_js_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    [".js", ".cjs", ".mjs"].iter().any(|ext| path.ends_with(ext))
}

/// Emits tags for built paths, generating URLs without a nonce for every
/// suppressed path.
pub struct TagEmitter<'e> {
    urls: &'e mut dyn ResourceUrlGenerator,
    requirements: &'e mut dyn Requirements,
    disabled_nonce_paths: &'e [String],
}

impl<'e> TagEmitter<'e> {
    /// `disabled_nonce_paths` are suppressed in addition to whatever the
    /// registry passed to each call holds.
    pub fn new(
        urls: &'e mut dyn ResourceUrlGenerator,
        requirements: &'e mut dyn Requirements,
        disabled_nonce_paths: &'e [String],
    ) -> Self {
        Self {
            urls,
            requirements,
            disabled_nonce_paths,
        }
    }

    /// URL for a built path, with the nonce suffix off while generating it if
    /// the path is suppressed.
    pub fn url_for(&mut self, nonce: &NonceSuppressionRegistry, path: &str) -> Result<String> {
        let suppressed = nonce.is_disabled_for_path(path)
            || self.disabled_nonce_paths.iter().any(|p| p == path);

        if suppressed {
            let guard = NonceSuppressed::acquire(&mut *self.urls);
            guard.url_for_resource(path)
        } else {
            self.urls.url_for_resource(path)
        }
    }

    pub fn script(
        &mut self,
        nonce: &NonceSuppressionRegistry,
        path: &str,
        attributes: &ScriptAttributes,
    ) -> Result<()> {
        let url = self.url_for(nonce, path)?;
        self.requirements.add_script(&url, attributes);
        Ok(())
    }

    pub fn stylesheet(
        &mut self,
        nonce: &NonceSuppressionRegistry,
        path: &str,
        media: Option<&str>,
        attributes: &StyleAttributes,
    ) -> Result<()> {
        let url = self.url_for(nonce, path)?;
        self.requirements.add_stylesheet(&url, media, attributes);
        Ok(())
    }

    /// Insert a `<link rel="modulepreload|preload">` per request, in order.
    ///
    /// Requests whose URL comes back empty are skipped.
    pub fn insert_preload_tags(
        &mut self,
        nonce: &NonceSuppressionRegistry,
        preloads: &PreloadSet,
    ) -> Result<()> {
        for (key, request) in preloads.iter() {
            let url = self.url_for(nonce, &request.path)?;
            if url.is_empty() {
                tracing::debug!(%key, path = %request.path, "no URL for preload, skipping");
                continue;
            }

            let rel = if is_js_path(&request.path) {
                "modulepreload"
            } else {
                "preload"
            };

            let mut attrs = vec![
                ("rel", Attr::Value(rel)),
                ("href", Attr::Value(&url)),
                ("crossorigin", Attr::Flag),
            ];
            if let Some(as_) = &request.as_ {
                attrs.push(("as", Attr::Value(as_)));
            }
            if let Some(mime) = &request.mime {
                attrs.push(("type", Attr::Value(mime)));
            }

            self.requirements
                .insert_head_markup(&create_tag("link", &attrs, None));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PreloadRequest;
    use crate::requirements::RequirementsBuffer;
    use crate::urls::NonceStyle;

    struct NonceUrls {
        style: Option<NonceStyle>,
    }

    impl ResourceUrlGenerator for NonceUrls {
        fn url_for_resource(&self, path: &str) -> Result<String> {
            if path.starts_with("blank/") {
                return Ok(String::new());
            }
            Ok(match self.style {
                Some(_) => format!("/{path}?m=1"),
                None => format!("/{path}"),
            })
        }

        fn nonce_style(&self) -> Option<NonceStyle> {
            self.style
        }

        fn set_nonce_style(&mut self, style: Option<NonceStyle>) {
            self.style = style;
        }
    }

    #[test]
    fn test_is_js_path() {
        assert!(is_js_path("dist/app.js"));
        assert!(is_js_path("dist/app.mjs"));
        assert!(is_js_path("dist/app.cjs"));
        assert!(is_js_path("dist/app.js?v=1"));
        assert!(!is_js_path("dist/app.css"));
        assert!(!is_js_path("dist/font.woff2"));
        assert!(!is_js_path("dist/app.json"));
        assert!(!is_js_path("dist/app.jsx"));
    }

    #[test]
    fn test_url_for_respects_suppression() {
        let mut urls = NonceUrls {
            style: Some(NonceStyle::Mtime),
        };
        let mut sink = RequirementsBuffer::new();
        let fixed = vec!["dist/vendor.js".to_string()];
        let mut registry = NonceSuppressionRegistry::new();
        registry.add("app.js", "dist/app.js");

        let mut emitter = TagEmitter::new(&mut urls, &mut sink, &fixed);
        assert_eq!(emitter.url_for(&registry, "dist/app.js").unwrap(), "/dist/app.js");
        assert_eq!(emitter.url_for(&registry, "dist/vendor.js").unwrap(), "/dist/vendor.js");
        assert_eq!(emitter.url_for(&registry, "dist/other.js").unwrap(), "/dist/other.js?m=1");
        drop(emitter);

        assert_eq!(urls.nonce_style(), Some(NonceStyle::Mtime));
    }

    #[test]
    fn test_insert_preload_tags() {
        let mut urls = NonceUrls { style: None };
        let mut sink = RequirementsBuffer::new();
        let mut preloads = PreloadSet::new();
        preloads.insert("app.js", PreloadRequest::new("dist/app.js", Some("script")));
        preloads.insert("app.css", PreloadRequest::new("dist/app.css", Some("style")));
        preloads.insert(
            "font.woff2",
            PreloadRequest::new("dist/font.woff2", Some("font")).with_mime("font/woff2"),
        );
        preloads.insert("gone.js", PreloadRequest::new("blank/gone.js", Some("script")));
        preloads.insert("bare.bin", PreloadRequest::new("dist/bare.bin", None));

        let registry = NonceSuppressionRegistry::new();
        TagEmitter::new(&mut urls, &mut sink, &[])
            .insert_preload_tags(&registry, &preloads)
            .unwrap();

        assert_eq!(
            sink.head_markup(),
            vec![
                r#"<link rel="modulepreload" href="/dist/app.js" crossorigin as="script">"#,
                r#"<link rel="preload" href="/dist/app.css" crossorigin as="style">"#,
                r#"<link rel="preload" href="/dist/font.woff2" crossorigin as="font" type="font/woff2">"#,
                r#"<link rel="preload" href="/dist/bare.bin" crossorigin>"#,
            ]
        );
    }
}
