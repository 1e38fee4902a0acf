//! Wrap UI components as standards-based custom elements.
//!
//! Given a component, a typed property schema, a shadow-DOM policy and an event map,
//! [`define`] registers a custom element class with a host registry. Each instance of that
//! class coerces observed attributes into props, exposes accessor-backed properties,
//! renders through an injected [`UiRuntime`] and re-dispatches component callbacks as
//! bubbling, composed DOM events.

pub mod coerce;
pub mod define;
pub mod element;
pub mod events;
pub mod host;
pub mod markup;
pub mod memory;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

pub use coerce::coerce;
pub use define::{define, validate_tag_name, DefineError, Definition, ElementClass, ElementDefinition};
pub use element::ElementInstance;
pub use events::{CustomEvent, EventCallback, EventMap, PropValue, Props};
pub use host::{ElementRegistry, HostElement, RenderMode, ShadowMode, UiRuntime};
pub use markup::{html_escape, parse_markup, to_markup, MarkupElement};
pub use memory::{MemoryElement, MemoryHost, MemoryNode, MemoryRegistry, NodeKind};
pub use schema::{PropKind, PropSchema};
