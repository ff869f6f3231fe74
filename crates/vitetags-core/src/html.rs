//! Minimal HTML tag construction.

use std::fmt::Write;

/// An attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr<'a> {
    /// `name="value"`
    Value(&'a str),
    /// Bare boolean attribute: `name`.
    Flag,
}

/// Elements that never take content or a closing tag.
const VOID_ELEMENTS: &[&str] = &["link", "meta", "base", "img", "br", "hr", "input"];

/// Build a tag. Attributes render in the given order; `content` is emitted raw.
#[must_use]
pub fn create_tag(name: &str, attrs: &[(&str, Attr<'_>)], content: Option<&str>) -> String {
    let mut tag = format!("<{name}");
    for (key, value) in attrs {
        match value {
            Attr::Value(v) => {
                let _ = write!(tag, " {key}=\"{}\"", escape_attr(v));
            }
            Attr::Flag => {
                let _ = write!(tag, " {key}");
            }
        }
    }
    tag.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return tag;
    }

    if let Some(content) = content {
        tag.push_str(content);
    }
    let _ = write!(tag, "</{name}>");
    tag
}

/// Escape text for use inside a double-quoted attribute.
#[must_use]
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_element() {
        let tag = create_tag(
            "link",
            &[
                ("rel", Attr::Value("preload")),
                ("href", Attr::Value("/a.css")),
                ("crossorigin", Attr::Flag),
            ],
            None,
        );
        assert_eq!(tag, r#"<link rel="preload" href="/a.css" crossorigin>"#);
    }

    #[test]
    fn test_element_with_content() {
        let tag = create_tag("script", &[("type", Attr::Value("module"))], Some("go()"));
        assert_eq!(tag, r#"<script type="module">go()</script>"#);
        assert_eq!(create_tag("script", &[], None), "<script></script>");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(
            escape_attr(r#"/a.js?x=1&y="2"<'>"#),
            "/a.js?x=1&amp;y=&quot;2&quot;&lt;&#039;&gt;"
        );
    }
}
