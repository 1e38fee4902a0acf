//! Minimal custom-element markup parsing and serialization.
//!
//! Parses snippets like `<x-hello-card name="Ada" compact></x-hello-card>` into a tag and
//! its string attributes, the way a host page's parser would hand them to an element.

use std::sync::LazyLock;

use regex::Regex;

/// A parsed element tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    /// Tag name, lowercased
    pub tag: String,

    /// Attributes in source order; presence-only attributes have an empty value
    pub attributes: Vec<(String, String)>,
}

impl MarkupElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<([a-zA-Z][a-zA-Z0-9._-]*)((?:\s+[^>]*?)?)\s*/?>").expect("Invalid open tag regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Match: name="value", name='value', name=value or a bare name
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("Invalid attribute regex")
});

/// Parse the opening tag of a markup snippet. Anything after it is ignored.
pub fn parse_markup(source: &str) -> Option<MarkupElement> {
    let source = source.trim();

    let caps = OPEN_TAG_RE.captures(source)?;
    let tag = caps.get(1)?.as_str().to_ascii_lowercase();
    let attrs_str = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    Some(MarkupElement {
        tag,
        attributes: parse_attributes(attrs_str),
    })
}

fn parse_attributes(attrs_str: &str) -> Vec<(String, String)> {
    let mut attributes: Vec<(String, String)> = Vec::new();

    for caps in ATTR_RE.captures_iter(attrs_str) {
        let Some(name) = caps.get(1) else {
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();

        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| html_unescape(m.as_str()))
            .unwrap_or_default();

        // Later duplicates are dropped, as in HTML.
        if attributes.iter().all(|(n, _)| *n != name) {
            attributes.push((name, value));
        }
    }

    attributes
}

/// Serialize an empty custom element with the given attributes.
pub fn to_markup(tag: &str, attributes: &[(String, String)]) -> String {
    let attrs_str: String = attributes
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                format!(" {name}")
            } else {
                format!(r#" {}="{}""#, name, html_escape(value))
            }
        })
        .collect();

    format!("<{tag}{attrs_str}></{tag}>")
}

/// Escape HTML special characters including single quotes for XSS prevention.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
