//! The page requirements sink tags are handed to.

use crate::html::{create_tag, Attr};
use crate::options::{ScriptOptions, StyleOptions};
use indexmap::{IndexMap, IndexSet};

/// Attributes of an emitted `<script>` tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptAttributes {
    pub script_type: Option<String>,
    pub is_async: bool,
    pub defer: bool,
    pub integrity: Option<String>,
    pub crossorigin: Option<String>,
}

impl ScriptAttributes {
    /// Plain `type="module"` script.
    #[must_use]
    pub fn module() -> Self {
        Self {
            script_type: Some("module".to_string()),
            ..Default::default()
        }
    }

    /// Module script with caller options applied on top.
    #[must_use]
    pub fn from_options(options: &ScriptOptions) -> Self {
        Self {
            script_type: options
                .script_type
                .clone()
                .or_else(|| Some("module".to_string())),
            is_async: options.is_async,
            defer: options.defer,
            integrity: options.integrity.clone(),
            crossorigin: options.crossorigin.clone(),
        }
    }

    fn html_attrs<'a>(&'a self, attrs: &mut Vec<(&'static str, Attr<'a>)>) {
        if let Some(t) = &self.script_type {
            attrs.push(("type", Attr::Value(t)));
        }
        if self.is_async {
            attrs.push(("async", Attr::Flag));
        }
        if self.defer {
            attrs.push(("defer", Attr::Flag));
        }
        if let Some(integrity) = &self.integrity {
            attrs.push(("integrity", Attr::Value(integrity)));
        }
        push_crossorigin(self.crossorigin.as_deref(), attrs);
    }
}

/// Attributes of an emitted stylesheet `<link>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleAttributes {
    pub integrity: Option<String>,
    pub crossorigin: Option<String>,
}

impl From<&StyleOptions> for StyleAttributes {
    fn from(options: &StyleOptions) -> Self {
        Self {
            integrity: options.integrity.clone(),
            crossorigin: options.crossorigin.clone(),
        }
    }
}

fn push_crossorigin<'a>(value: Option<&'a str>, attrs: &mut Vec<(&'static str, Attr<'a>)>) {
    match value {
        Some("") => attrs.push(("crossorigin", Attr::Flag)),
        Some(v) => attrs.push(("crossorigin", Attr::Value(v))),
        None => {}
    }
}

/// Page-wide registry of required scripts, stylesheets and head markup.
pub trait Requirements {
    fn add_script(&mut self, url: &str, attributes: &ScriptAttributes);

    fn add_stylesheet(&mut self, url: &str, media: Option<&str>, attributes: &StyleAttributes);

    /// Raw markup for the document head.
    fn insert_head_markup(&mut self, markup: &str);

    /// Inline script body.
    fn add_custom_script(&mut self, script: &str, attributes: &ScriptAttributes);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Stylesheet {
    media: Option<String>,
    attributes: StyleAttributes,
}

/// Recording [`Requirements`] implementation that renders HTML.
///
/// Scripts and stylesheets are deduplicated by URL (first position kept,
/// latest attributes win), head markup by content.
#[derive(Debug, Clone, Default)]
pub struct RequirementsBuffer {
    scripts: IndexMap<String, ScriptAttributes>,
    stylesheets: IndexMap<String, Stylesheet>,
    head: IndexSet<String>,
    custom_scripts: Vec<(String, ScriptAttributes)>,
}

impl RequirementsBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn script_urls(&self) -> Vec<&str> {
        self.scripts.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn script(&self, url: &str) -> Option<&ScriptAttributes> {
        self.scripts.get(url)
    }

    #[must_use]
    pub fn stylesheet_urls(&self) -> Vec<&str> {
        self.stylesheets.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn stylesheet_media(&self, url: &str) -> Option<&str> {
        self.stylesheets.get(url).and_then(|s| s.media.as_deref())
    }

    #[must_use]
    pub fn head_markup(&self) -> Vec<&str> {
        self.head.iter().map(String::as_str).collect()
    }

    #[must_use]
    pub fn custom_scripts(&self) -> Vec<&str> {
        self.custom_scripts.iter().map(|(s, _)| s.as_str()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
            && self.stylesheets.is_empty()
            && self.head.is_empty()
            && self.custom_scripts.is_empty()
    }

    /// Tags for `<head>`: inserted markup, then stylesheets.
    #[must_use]
    pub fn render_head(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.head.iter().cloned().collect();
        for (url, sheet) in &self.stylesheets {
            let mut attrs = vec![("rel", Attr::Value("stylesheet")), ("href", Attr::Value(url))];
            if let Some(media) = &sheet.media {
                attrs.push(("media", Attr::Value(media)));
            }
            if let Some(integrity) = &sheet.attributes.integrity {
                attrs.push(("integrity", Attr::Value(integrity)));
            }
            push_crossorigin(sheet.attributes.crossorigin.as_deref(), &mut attrs);
            tags.push(create_tag("link", &attrs, None));
        }
        tags
    }

    /// Tags for the end of `<body>`: inline scripts, then script includes.
    #[must_use]
    pub fn render_body(&self) -> Vec<String> {
        let mut tags = Vec::new();
        for (script, attributes) in &self.custom_scripts {
            let mut attrs = Vec::new();
            attributes.html_attrs(&mut attrs);
            tags.push(create_tag("script", &attrs, Some(script)));
        }
        for (url, attributes) in &self.scripts {
            let mut attrs = vec![("src", Attr::Value(url.as_str()))];
            attributes.html_attrs(&mut attrs);
            tags.push(create_tag("script", &attrs, None));
        }
        tags
    }
}

impl Requirements for RequirementsBuffer {
    fn add_script(&mut self, url: &str, attributes: &ScriptAttributes) {
        self.scripts.insert(url.to_string(), attributes.clone());
    }

    fn add_stylesheet(&mut self, url: &str, media: Option<&str>, attributes: &StyleAttributes) {
        self.stylesheets.insert(
            url.to_string(),
            Stylesheet {
                media: media.map(str::to_string),
                attributes: attributes.clone(),
            },
        );
    }

    fn insert_head_markup(&mut self, markup: &str) {
        self.head.insert(markup.to_string());
    }

    fn add_custom_script(&mut self, script: &str, attributes: &ScriptAttributes) {
        self.custom_scripts
            .push((script.to_string(), attributes.clone()));
    }
}
