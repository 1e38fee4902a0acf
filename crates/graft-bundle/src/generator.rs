//! Custom element code generator.
//!
//! Emits the browser-side half of the adapter: one class per manifest element plus the
//! coercion helpers they share.

use crate::manifest::{ElementManifest, RuntimeConfig};

/// Shared helpers, emitted once per bundle.
///
/// Coercion mirrors `graft_element::coerce`: absent is `undefined`, numbers must be finite
/// decimals, booleans are `""` or any casing of `"true"`, JSON failures are `undefined`.
pub fn generate_prelude() -> String {
    format!("const __graftNumber = /{NUMBER_PATTERN}/i;\n\n{COERCE_HELPERS}")
}

/// Finite decimal syntax accepted for number attributes (matched case-insensitively).
const NUMBER_PATTERN: &str = r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:e[+-]?\d+)?$";

const COERCE_HELPERS: &str = r#"const __graftCoerce = {
  text: (value) => value,
  number: (value) => {
    const trimmed = value.trim();
    if (!__graftNumber.test(trimmed)) return undefined;
    const n = Number(trimmed);
    return Number.isFinite(n) ? n : undefined;
  },
  boolean: (value) => value === '' || value.toLowerCase() === 'true',
  json: (value) => {
    try {
      return JSON.parse(value);
    } catch (e) {
      return undefined;
    }
  },
};

function __graftCoerceAttribute(kind, value) {
  if (value === null || value === undefined) return undefined;
  return __graftCoerce[kind](value);
}
"#;

/// Generate the custom element class for one manifest element.
///
/// The class registers itself only when its tag has no entry yet, so the bundle can be
/// included more than once.
pub fn generate_element(element: &ElementManifest, runtime: &RuntimeConfig) -> String {
    let class_name = to_pascal_case(&element.tag);
    let tag_literal = js_string(&element.tag);

    let schema_entries: String = element
        .props
        .iter()
        .map(|(name, kind)| format!("    {}: '{}',\n", js_string(name), kind.as_str()))
        .collect();

    let event_entries: String = element
        .events
        .iter()
        .map(|(callback, event)| format!("    {}: {},\n", js_string(callback), js_string(event)))
        .collect();

    let mount_container = match element.shadow {
        Some(mode) => format!(
            "this.attachShadow({{ mode: '{}' }}).appendChild(this.#container);",
            mode.as_str()
        ),
        None => "this.appendChild(this.#container);".to_string(),
    };

    let create_element = &runtime.create_element;
    let tree = if runtime.strict {
        format!(
            "{create_element}({strict_mode}, null, {create_element}({component}, props))",
            strict_mode = runtime.strict_mode,
            component = element.component,
        )
    } else {
        format!("{create_element}({}, props)", element.component)
    };

    format!(
        r#"/**
 * {class_name} - custom element wrapping {component}
 */
(function () {{
  const tag = {tag_literal};
  if (customElements.get(tag)) return;

  const schema = {{
{schema_entries}  }};

  const events = {{
{event_entries}  }};

  class {class_name} extends HTMLElement {{
    static observedAttributes = Object.keys(schema);

    #container = null;
    #root = null;
    #props = {{}};
    #initialized = false;

    connectedCallback() {{
      if (!this.#container) {{
        this.#container = document.createElement('div');
        {mount_container}
      }}

      if (!this.#initialized) {{
        this.#initialized = true;
        for (const key of Object.keys(schema)) {{
          if (Object.prototype.hasOwnProperty.call(this, key)) continue;
          Object.defineProperty(this, key, {{
            configurable: true,
            enumerable: true,
            get: () => this.#props[key],
            set: (value) => {{
              this.#props[key] = value;
              this.#render();
            }},
          }});
        }}
        for (const key of Object.keys(schema)) {{
          const value = __graftCoerceAttribute(schema[key], this.getAttribute(key));
          if (value !== undefined) this.#props[key] = value;
        }}
      }}

      if (!this.#root) this.#root = {create_root}(this.#container);
      this.#render();
    }}

    disconnectedCallback() {{
      if (!this.#root) return;
      this.#root.unmount();
      this.#root = null;
    }}

    attributeChangedCallback(name, oldValue, newValue) {{
      const kind = schema[name];
      if (kind === undefined) return;

      const value = __graftCoerceAttribute(kind, newValue);
      if (value === undefined) {{
        delete this.#props[name];
      }} else {{
        this.#props[name] = value;
      }}
      this.#render();
    }}

    #render() {{
      if (!this.#root) return;

      const props = {{ ...this.#props }};
      for (const [callback, name] of Object.entries(events)) {{
        props[callback] = (detail) => {{
          this.dispatchEvent(new CustomEvent(name, {{ detail, bubbles: true, composed: true }}));
        }};
      }}

      this.#root.render({tree});
    }}
  }}

  customElements.define(tag, {class_name});
}})();
"#,
        class_name = class_name,
        component = element.component,
        tag_literal = tag_literal,
        schema_entries = schema_entries,
        event_entries = event_entries,
        mount_container = mount_container,
        create_root = runtime.create_root,
        tree = tree,
    )
}

/// Convert a tag name to a PascalCase class name.
fn to_pascal_case(s: &str) -> String {
    let name: String = s
        .split(|c: char| !c.is_ascii_alphanumeric())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Quote a string as a JavaScript literal.
fn js_string(s: &str) -> String {
    // JSON strings are valid JavaScript, apart from these two line terminators.
    serde_json::Value::from(s)
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
