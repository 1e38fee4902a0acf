//! Per-instance custom element state machine.
//!
//! An instance moves between unattached and attached as the host delivers lifecycle
//! notifications. Attribute changes may arrive in either state.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde_json::Value;

use crate::coerce::coerce;
use crate::define::ElementClass;
use crate::events::{CustomEvent, EventCallback, Props};
use crate::host::{HostElement, UiRuntime};

/// State of one custom element instance.
pub struct ElementInstance<R, H>
where
    R: UiRuntime,
    H: HostElement<Node = R::Container>,
{
    class: Rc<ElementClass<R>>,
    host: H,

    /// Render container, created on first attach and kept for the instance's lifetime
    container: Option<H::Node>,

    /// Live mounted tree; present only while attached
    session: Option<R::Session>,

    /// Current prop values, keyed by schema name
    values: BTreeMap<String, Value>,

    /// Names with an installed accessor; `None` until first attach
    accessors: Option<BTreeSet<String>>,

    /// Plain instance properties that are not backed by an accessor
    own_properties: BTreeMap<String, Value>,
}

impl<R, H> ElementInstance<R, H>
where
    R: UiRuntime,
    H: HostElement<Node = R::Container>,
{
    pub(crate) fn new(class: Rc<ElementClass<R>>, host: H) -> Self {
        Self {
            class,
            host,
            container: None,
            session: None,
            values: BTreeMap::new(),
            accessors: None,
            own_properties: BTreeMap::new(),
        }
    }

    pub fn class(&self) -> &Rc<ElementClass<R>> {
        &self.class
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn container(&self) -> Option<&H::Node> {
        self.container.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    /// Current prop values as the component will receive them.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Whether `name` is served by an installed accessor.
    pub fn has_accessor(&self, name: &str) -> bool {
        self.accessors
            .as_ref()
            .is_some_and(|names| names.contains(name))
    }

    /// Handle attachment to the document.
    pub fn connected(&mut self) -> Result<(), R::Error> {
        if self.container.is_none() {
            self.container = Some(self.create_container());
        }

        if self.accessors.is_none() {
            self.install_accessors();
            self.seed_from_attributes();
        }

        tracing::debug!(tag = %self.class.tag(), "element connected");

        if self.session.is_some() {
            return self.render();
        }

        let Some(container) = self.container.as_ref() else {
            return Ok(());
        };

        let props = self.props();
        let session = self.class.runtime().mount(
            self.class.component(),
            container,
            props,
            self.class.render_mode(),
        )?;
        self.session = Some(session);

        Ok(())
    }

    /// Handle detachment. The container and values are kept for a later re-attach.
    pub fn disconnected(&mut self) -> Result<(), R::Error> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        tracing::debug!(tag = %self.class.tag(), "element disconnected");
        self.class.runtime().unmount(session)
    }

    /// Handle an attribute change notification.
    ///
    /// Attributes outside the schema are ignored. A value that does not coerce removes the
    /// prop so the component default applies.
    pub fn attribute_changed(
        &mut self,
        name: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> Result<(), R::Error> {
        let Some(kind) = self.class.schema().kind_of(name) else {
            tracing::trace!(tag = %self.class.tag(), attribute = name, "ignoring unobserved attribute");
            return Ok(());
        };

        tracing::trace!(
            tag = %self.class.tag(),
            attribute = name,
            old = old_value,
            new = new_value,
            "attribute changed"
        );

        match coerce(kind, new_value) {
            Some(value) => {
                self.values.insert(name.to_string(), value);
            }
            None => {
                self.values.remove(name);
            }
        }

        self.render()
    }

    /// Read a property.
    pub fn property(&self, name: &str) -> Option<&Value> {
        if self.has_accessor(name) {
            self.values.get(name)
        } else {
            self.own_properties.get(name)
        }
    }

    /// Assign a property.
    ///
    /// Accessor-backed props store `value` verbatim, without coercion, and re-render once.
    /// Anything else becomes a plain instance property the component never sees.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<(), R::Error> {
        if !self.has_accessor(name) {
            self.own_properties.insert(name.to_string(), value);
            return Ok(());
        }

        self.values.insert(name.to_string(), value);
        self.render()
    }

    fn create_container(&self) -> H::Node {
        let container = self.host.create_container();

        match self.class.shadow() {
            Some(mode) => {
                let root = self.host.attach_shadow(mode);
                self.host.append_child(&root, &container);
            }
            None => {
                self.host.append_child(&self.host.node(), &container);
            }
        }

        container
    }

    /// Install one accessor per schema prop. Names already set as plain properties keep
    /// their plain property.
    fn install_accessors(&mut self) {
        let names = self
            .class
            .schema()
            .names()
            .filter(|name| !self.own_properties.contains_key(*name))
            .map(str::to_string)
            .collect();

        self.accessors = Some(names);
    }

    fn seed_from_attributes(&mut self) {
        let class = Rc::clone(&self.class);

        for (name, kind) in class.schema().iter() {
            let raw = self.host.attribute(name);
            if let Some(value) = coerce(kind, raw.as_deref()) {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    fn render(&mut self) -> Result<(), R::Error> {
        let props = self.props();
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        self.class
            .runtime()
            .update(session, props, self.class.render_mode())
    }

    /// Current values plus one event-bridge callback per event mapping.
    fn props(&self) -> Props {
        let mut props = Props::new();

        for (name, value) in &self.values {
            props.insert_value(name.clone(), value.clone());
        }

        for (callback, event) in self.class.events().iter() {
            let host = self.host.clone();
            let event = event.to_string();
            props.insert_callback(
                callback,
                EventCallback::new(move |detail| {
                    tracing::trace!(event = %event, "dispatching bridged event");
                    host.dispatch_event(CustomEvent::bridged(event.clone(), detail));
                }),
            );
        }

        props
    }
}
