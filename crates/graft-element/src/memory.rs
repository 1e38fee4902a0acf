//! In-memory host environment.
//!
//! A small node tree, host element and registry that behave like their browser
//! counterparts as far as the adapter can observe. Useful for headless hosts and tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::define::ElementClass;
use crate::element::ElementInstance;
use crate::events::CustomEvent;
use crate::host::{ElementRegistry, HostElement, ShadowMode, UiRuntime};
use crate::markup::parse_markup;

/// Kind of an in-memory node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(String),
    ShadowRoot(ShadowMode),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    children: Vec<MemoryNode>,
}

/// A shared handle to an in-memory node.
#[derive(Debug, Clone)]
pub struct MemoryNode(Rc<RefCell<NodeData>>);

impl MemoryNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Element(tag.into()))
    }

    fn with_kind(kind: NodeKind) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            kind,
            children: Vec::new(),
        })))
    }

    pub fn kind(&self) -> NodeKind {
        self.0.borrow().kind.clone()
    }

    pub fn children(&self) -> Vec<MemoryNode> {
        self.0.borrow().children.clone()
    }

    pub fn append(&self, child: &MemoryNode) {
        self.0.borrow_mut().children.push(child.clone());
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &MemoryNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug)]
struct HostData {
    node: MemoryNode,
    attributes: Vec<(String, String)>,
    shadow_root: Option<MemoryNode>,
    events: Vec<CustomEvent>,
}

/// An in-memory custom element host.
#[derive(Debug, Clone)]
pub struct MemoryHost(Rc<RefCell<HostData>>);

impl MemoryHost {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(HostData {
            node: MemoryNode::element(tag),
            attributes: Vec::new(),
            shadow_root: None,
            events: Vec::new(),
        })))
    }

    /// Set an attribute, returning its previous value.
    pub fn set_attribute(&self, name: &str, value: &str) -> Option<String> {
        let mut data = self.0.borrow_mut();
        match data.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => Some(std::mem::replace(&mut entry.1, value.to_string())),
            None => {
                data.attributes.push((name.to_string(), value.to_string()));
                None
            }
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        let mut data = self.0.borrow_mut();
        let index = data.attributes.iter().position(|(n, _)| n == name)?;
        Some(data.attributes.remove(index).1)
    }

    pub fn attributes(&self) -> Vec<(String, String)> {
        self.0.borrow().attributes.clone()
    }

    pub fn shadow_root(&self) -> Option<MemoryNode> {
        self.0.borrow().shadow_root.clone()
    }

    /// Every event dispatched on this host, oldest first.
    pub fn dispatched_events(&self) -> Vec<CustomEvent> {
        self.0.borrow().events.clone()
    }
}

impl HostElement for MemoryHost {
    type Node = MemoryNode;

    fn attribute(&self, name: &str) -> Option<String> {
        self.0
            .borrow()
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn node(&self) -> MemoryNode {
        self.0.borrow().node.clone()
    }

    fn attach_shadow(&self, mode: ShadowMode) -> MemoryNode {
        let root = MemoryNode::with_kind(NodeKind::ShadowRoot(mode));
        self.0.borrow_mut().shadow_root = Some(root.clone());
        root
    }

    fn create_container(&self) -> MemoryNode {
        MemoryNode::element("div")
    }

    fn append_child(&self, parent: &MemoryNode, child: &MemoryNode) {
        parent.append(child);
    }

    fn dispatch_event(&self, event: CustomEvent) {
        self.0.borrow_mut().events.push(event);
    }
}

/// A custom element registry backed by a map.
#[derive(Debug)]
pub struct MemoryRegistry<R: UiRuntime> {
    classes: HashMap<String, Rc<ElementClass<R>>>,
}

impl<R: UiRuntime> Default for MemoryRegistry<R> {
    fn default() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }
}

impl<R: UiRuntime> ElementRegistry<R> for MemoryRegistry<R> {
    fn contains(&self, tag: &str) -> bool {
        self.classes.contains_key(tag)
    }

    fn define(&mut self, class: Rc<ElementClass<R>>) {
        self.classes.insert(class.tag().to_string(), class);
    }
}

impl<R: UiRuntime> MemoryRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &str) -> Option<&Rc<ElementClass<R>>> {
        self.classes.get(tag)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl<R: UiRuntime<Container = MemoryNode>> MemoryRegistry<R> {
    /// Create an unattached element for a registered tag.
    pub fn create_element(&self, tag: &str) -> Option<MemoryElement<R>> {
        let class = self.classes.get(tag)?;
        let host = MemoryHost::new(tag);
        Some(MemoryElement {
            instance: class.instantiate(host.clone()),
            host,
        })
    }

    /// Create an element from markup, the way a page parser upgrades it.
    ///
    /// Every observed attribute present in the markup is delivered as a change
    /// notification before the element is connected. Returns `Ok(None)` for unparsable
    /// markup or an unregistered tag.
    pub fn upgrade(&self, markup: &str) -> Result<Option<MemoryElement<R>>, R::Error> {
        let Some(parsed) = parse_markup(markup) else {
            return Ok(None);
        };
        let Some(mut element) = self.create_element(&parsed.tag) else {
            return Ok(None);
        };

        for (name, value) in &parsed.attributes {
            element.host.set_attribute(name, value);
        }
        for (name, value) in &parsed.attributes {
            if element.instance.class().is_observed(name) {
                element.instance.attribute_changed(name, None, Some(value))?;
            }
        }

        Ok(Some(element))
    }
}

/// An in-memory host paired with its adapter instance.
///
/// Attribute mutations update the host and forward a notification for observed
/// attributes, as a browser would.
pub struct MemoryElement<R: UiRuntime<Container = MemoryNode>> {
    host: MemoryHost,
    instance: ElementInstance<R, MemoryHost>,
}

impl<R: UiRuntime<Container = MemoryNode>> MemoryElement<R> {
    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    pub fn instance(&self) -> &ElementInstance<R, MemoryHost> {
        &self.instance
    }

    pub fn connect(&mut self) -> Result<(), R::Error> {
        self.instance.connected()
    }

    pub fn disconnect(&mut self) -> Result<(), R::Error> {
        self.instance.disconnected()
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), R::Error> {
        let old = self.host.set_attribute(name, value);
        if !self.instance.class().is_observed(name) {
            return Ok(());
        }
        self.instance
            .attribute_changed(name, old.as_deref(), Some(value))
    }

    pub fn remove_attribute(&mut self, name: &str) -> Result<(), R::Error> {
        let Some(old) = self.host.remove_attribute(name) else {
            return Ok(());
        };
        if !self.instance.class().is_observed(name) {
            return Ok(());
        }
        self.instance.attribute_changed(name, Some(&old), None)
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.instance.property(name)
    }

    pub fn set_property(&mut self, name: &str, value: Value) -> Result<(), R::Error> {
        self.instance.set_property(name, value)
    }
}
