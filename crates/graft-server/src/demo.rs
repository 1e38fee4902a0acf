//! Demo page listing every manifest element.

use graft_bundle::Manifest;
use graft_element::{html_escape, to_markup};

/// Render the demo page.
///
/// `bundle_url` is where the page loads the bundle from; `error` is the last build
/// failure, shown above the elements.
pub fn render_demo_page(manifest: &Manifest, bundle_url: &str, error: Option<&str>) -> String {
    let banner = error
        .map(|e| format!(r#"<pre class="error">{}</pre>"#, html_escape(e)))
        .unwrap_or_default();

    let sections: String = manifest
        .elements
        .iter()
        .map(|element| {
            let markup = to_markup(&element.tag, &element.demo);
            let events: Vec<&str> = element.events.iter().map(|(_, event)| event).collect();
            format!(
                r#"<section data-events="{events}">
  <h2><code>{tag}</code></h2>
  <div class="preview">{markup}</div>
  <pre>{source}</pre>
</section>
"#,
                events = html_escape(&events.join(" ")),
                tag = html_escape(&element.tag),
                markup = markup,
                source = html_escape(&markup),
            )
        })
        .collect();

    let content = if sections.is_empty() {
        "<p>No elements yet. Add an <code>[[element]]</code> entry to graft.toml.</p>".to_string()
    } else {
        sections
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Graft Dev</title>
  <style>
    body {{ font-family: system-ui, sans-serif; max-width: 800px; margin: 2rem auto; padding: 0 1rem; }}
    section {{ border-top: 1px solid #ddd; padding: 1rem 0; }}
    pre {{ background: #f5f5f5; padding: 1rem; border-radius: 0.5rem; overflow-x: auto; }}
    .error {{ background: #fee; color: #900; }}
    .log {{ font-size: 0.85rem; color: #555; }}
  </style>
</head>
<body>
  <h1>Elements</h1>
  {banner}
  {content}
  <script src="{bundle_url}"></script>
  <script>
    for (const section of document.querySelectorAll('section[data-events]')) {{
      const log = document.createElement('div');
      log.className = 'log';
      section.appendChild(log);
      for (const name of section.dataset.events.split(' ').filter(Boolean)) {{
        section.addEventListener(name, (event) => {{
          log.textContent = name + ': ' + JSON.stringify(event.detail);
        }});
      }}
    }}
  </script>
</body>
</html>"#,
        bundle_url = html_escape(bundle_url),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[[element]]
tag = "x-counter"
component = "Counter"
props = { start = "number" }
events = { onChange = "change" }
demo = { start = "10" }
"#;

    #[test]
    fn renders_each_element_with_demo_attributes() {
        let manifest: Manifest = MANIFEST.parse().unwrap();

        let page = render_demo_page(&manifest, "/dist/elements.js", None);

        assert!(page.contains(r#"<x-counter start="10"></x-counter>"#));
        assert!(page.contains(r#"data-events="change""#));
        assert!(page.contains(r#"<script src="/dist/elements.js"></script>"#));
        assert!(!page.contains(r#"class="error""#));
    }

    #[test]
    fn shows_escaped_build_error() {
        let manifest: Manifest = MANIFEST.parse().unwrap();

        let page = render_demo_page(&manifest, "/dist/elements.js", Some("bad <script>"));

        assert!(page.contains(r#"<pre class="error">bad &lt;script&gt;</pre>"#));
    }

    #[test]
    fn empty_manifest_has_hint() {
        let page = render_demo_page(&Manifest::default(), "/elements.js", None);

        assert!(page.contains("No elements yet"));
    }
}
