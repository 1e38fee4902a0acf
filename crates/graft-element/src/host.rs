//! Trait definitions for the two collaborators the adapter depends on: the host
//! environment (DOM nodes, custom-element registry) and the injected UI runtime.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::define::ElementClass;
use crate::events::{CustomEvent, Props};

/// Shadow root mode for encapsulated elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowMode {
    Open,
    Closed,
}

impl ShadowMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadowMode::Open => "open",
            ShadowMode::Closed => "closed",
        }
    }
}

/// Diagnostic mode the runtime should render under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Wrap the tree in the runtime's strict/diagnostic mode
    #[default]
    Strict,
    /// Render the component as is
    Standard,
}

/// The host node a custom element instance is attached to.
///
/// Handles are cheap to clone and refer to the same node; event bridge callbacks keep a
/// clone so they can dispatch after the render that created them.
pub trait HostElement: Clone + 'static {
    /// Any node the host can create or attach under.
    type Node: Clone;

    /// Current value of an attribute, or `None` when it is not present.
    fn attribute(&self, name: &str) -> Option<String>;

    /// The host element itself as a node.
    fn node(&self) -> Self::Node;

    /// Attach a shadow root in the given mode and return it.
    fn attach_shadow(&self, mode: ShadowMode) -> Self::Node;

    /// Create a detached container node for the runtime to render into.
    fn create_container(&self) -> Self::Node;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node);

    /// Dispatch an event with the host element as target.
    fn dispatch_event(&self, event: CustomEvent);
}

/// An injected UI-tree runtime able to mount a component into a container.
///
/// These are the only three operations the adapter performs on it.
pub trait UiRuntime {
    /// Container node type the runtime renders into.
    type Container: Clone;

    /// Component reference understood by the runtime.
    type Component;

    /// A live mounted tree.
    type Session;

    /// Failure raised by the runtime. The adapter never catches it.
    type Error: std::error::Error + 'static;

    /// Mount `component` with `props` into `container` (initial render).
    fn mount(
        &self,
        component: &Self::Component,
        container: &Self::Container,
        props: Props,
        mode: RenderMode,
    ) -> Result<Self::Session, Self::Error>;

    /// Replace the props of a mounted tree (re-render).
    fn update(
        &self,
        session: &mut Self::Session,
        props: Props,
        mode: RenderMode,
    ) -> Result<(), Self::Error>;

    /// Unmount and release a tree.
    fn unmount(&self, session: Self::Session) -> Result<(), Self::Error>;
}

/// A registry of custom element classes keyed by tag name.
pub trait ElementRegistry<R: UiRuntime> {
    /// Whether an entry exists for `tag`.
    fn contains(&self, tag: &str) -> bool;

    /// Register `class` under its tag. Callers check [`ElementRegistry::contains`] first.
    fn define(&mut self, class: Rc<ElementClass<R>>);
}
