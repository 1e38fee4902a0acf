//! Manifest validation and coercion preview.

use std::cell::RefCell;
use std::convert::Infallible;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde_json::Value;

use graft_bundle::{ElementManifest, Manifest};
use graft_element::{
    define, parse_markup, ElementDefinition, MemoryNode, MemoryRegistry, PropValue, Props,
    RenderMode, UiRuntime,
};

/// Run the check command.
pub async fn run(manifest_path: &Path, markup: Option<&str>) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;

    tracing::info!(
        "{} is valid: {} element(s)",
        manifest_path.display(),
        manifest.elements.len()
    );
    for element in &manifest.elements {
        tracing::info!(
            "  <{}> {} observes [{}]",
            element.tag,
            element.component,
            element.observed_attributes().join(", ")
        );
    }

    if let Some(markup) = markup {
        let preview = preview_markup(&manifest, markup)?;
        for line in preview.report() {
            tracing::info!("{}", line);
        }
    }

    Ok(())
}

/// Props an element would mount with, given some markup.
#[derive(Debug)]
struct MarkupPreview {
    tag: String,

    /// Attributes the element does not observe
    ignored: Vec<String>,

    /// Data props as first rendered
    props: Value,

    /// Callback props bridged to events
    callbacks: Vec<String>,
}

impl MarkupPreview {
    fn report(&self) -> Vec<String> {
        let mut lines = vec![format!("<{}> mounts with {}", self.tag, self.props)];
        if !self.callbacks.is_empty() {
            lines.push(format!("  callbacks: {}", self.callbacks.join(", ")));
        }
        if !self.ignored.is_empty() {
            lines.push(format!("  not observed: {}", self.ignored.join(", ")));
        }
        lines
    }
}

/// Runtime that records the props of the first render instead of rendering.
#[derive(Default)]
struct PreviewRuntime {
    mounted: RefCell<Option<Props>>,
}

impl UiRuntime for PreviewRuntime {
    type Container = MemoryNode;
    type Component = String;
    type Session = ();
    type Error = Infallible;

    fn mount(
        &self,
        _component: &String,
        _container: &MemoryNode,
        props: Props,
        _mode: RenderMode,
    ) -> Result<(), Infallible> {
        *self.mounted.borrow_mut() = Some(props);
        Ok(())
    }

    fn update(&self, _session: &mut (), props: Props, _mode: RenderMode) -> Result<(), Infallible> {
        *self.mounted.borrow_mut() = Some(props);
        Ok(())
    }

    fn unmount(&self, _session: ()) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Upgrade `markup` against its manifest element in an in-memory document.
fn preview_markup(manifest: &Manifest, markup: &str) -> Result<MarkupPreview> {
    let parsed = parse_markup(markup).with_context(|| format!("Not an element tag: {markup}"))?;
    let element = manifest
        .element(&parsed.tag)
        .with_context(|| format!("<{}> is not defined in the manifest", parsed.tag))?;

    let runtime = Rc::new(PreviewRuntime::default());
    let mut registry = MemoryRegistry::new();
    define(&mut registry, Rc::clone(&runtime), definition(manifest, element))?;

    let mut instance = registry
        .upgrade(markup)
        .unwrap_or_else(|never| match never {})
        .with_context(|| format!("<{}> did not upgrade", parsed.tag))?;
    instance.connect().unwrap_or_else(|never| match never {});

    let mounted = runtime.mounted.borrow_mut().take().unwrap_or_default();
    let callbacks = mounted
        .iter()
        .filter(|(_, value)| matches!(value, PropValue::Callback(_)))
        .map(|(name, _)| name.clone())
        .collect();

    Ok(MarkupPreview {
        tag: parsed.tag.clone(),
        ignored: parsed
            .attributes
            .iter()
            .filter(|(name, _)| !element.props.contains(name))
            .map(|(name, _)| name.clone())
            .collect(),
        props: mounted.to_json(),
        callbacks,
    })
}

fn definition(manifest: &Manifest, element: &ElementManifest) -> ElementDefinition<String> {
    ElementDefinition {
        tag: element.tag.clone(),
        component: element.component.clone(),
        schema: element.props.clone(),
        shadow: element.shadow,
        events: element.events.clone(),
        render_mode: manifest.runtime.render_mode(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MANIFEST: &str = r#"
[[element]]
tag = "x-counter"
component = "Counter"
shadow = "open"
props = { start = "number", step = "number", compact = "boolean", config = "json" }
events = { onChange = "change" }
"#;

    #[test]
    fn previews_coerced_props() {
        let manifest: Manifest = MANIFEST.parse().unwrap();

        let preview = preview_markup(
            &manifest,
            r#"<x-counter start="10" step="abc" compact config='{"a":1}' class="big">"#,
        )
        .unwrap();

        assert_eq!(preview.props, json!({"start": 10, "compact": true, "config": {"a": 1}}));
        assert_eq!(preview.callbacks, ["onChange"]);
        assert_eq!(preview.ignored, ["class"]);
    }

    #[test]
    fn report_lists_callbacks_and_ignored() {
        let manifest: Manifest = MANIFEST.parse().unwrap();

        let preview = preview_markup(&manifest, r#"<x-counter id="a">"#).unwrap();
        let report = preview.report();

        assert_eq!(report[0], "<x-counter> mounts with {}");
        assert_eq!(report[1], "  callbacks: onChange");
        assert_eq!(report[2], "  not observed: id");
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let manifest: Manifest = MANIFEST.parse().unwrap();

        let result = preview_markup(&manifest, "<x-other>");

        assert!(result.unwrap_err().to_string().contains("not defined"));
    }

    #[test]
    fn unparsable_markup_is_an_error() {
        let manifest: Manifest = MANIFEST.parse().unwrap();

        assert!(preview_markup(&manifest, "x-counter").is_err());
    }
}
