//! The element adapter factory.
//!
//! [`define`] turns an [`ElementDefinition`] into an [`ElementClass`] and registers it.
//! The class is the immutable configuration record shared by every instance of its tag.

use std::fmt;
use std::rc::Rc;

use crate::element::ElementInstance;
use crate::events::EventMap;
use crate::host::{ElementRegistry, HostElement, RenderMode, ShadowMode, UiRuntime};
use crate::schema::{PropKind, PropSchema};

/// Everything needed to define one custom element.
#[derive(Debug, Clone)]
pub struct ElementDefinition<C> {
    /// Custom element tag name (e.g., "x-hello-card")
    pub tag: String,

    /// Component reference handed to the runtime on mount
    pub component: C,

    /// Declared props; also the observed attributes
    pub schema: PropSchema,

    /// Shadow root mode, or `None` to render into the light DOM
    pub shadow: Option<ShadowMode>,

    /// Callback prop to event name mapping
    pub events: EventMap,

    pub render_mode: RenderMode,
}

impl<C> ElementDefinition<C> {
    /// A definition with an empty schema, no events, light DOM, strict rendering.
    pub fn new(tag: impl Into<String>, component: C) -> Self {
        Self {
            tag: tag.into(),
            component,
            schema: PropSchema::new(),
            shadow: None,
            events: EventMap::new(),
            render_mode: RenderMode::default(),
        }
    }

    pub fn prop(mut self, name: impl Into<String>, kind: PropKind) -> Self {
        self.schema.insert(name, kind);
        self
    }

    pub fn event(mut self, callback: impl Into<String>, event: impl Into<String>) -> Self {
        self.events.insert(callback, event);
        self
    }

    pub fn shadow(mut self, mode: ShadowMode) -> Self {
        self.shadow = Some(mode);
        self
    }

    pub fn render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }
}

/// A registered element class.
pub struct ElementClass<R: UiRuntime> {
    tag: String,
    component: R::Component,
    runtime: Rc<R>,
    schema: PropSchema,
    events: EventMap,
    shadow: Option<ShadowMode>,
    render_mode: RenderMode,
}

impl<R: UiRuntime> ElementClass<R> {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn component(&self) -> &R::Component {
        &self.component
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn schema(&self) -> &PropSchema {
        &self.schema
    }

    pub fn events(&self) -> &EventMap {
        &self.events
    }

    pub fn shadow(&self) -> Option<ShadowMode> {
        self.shadow
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Attribute names the host should forward change notifications for.
    pub fn observed_attributes(&self) -> Vec<&str> {
        self.schema.names().collect()
    }

    pub fn is_observed(&self, attribute: &str) -> bool {
        self.schema.contains(attribute)
    }

    /// Create an unattached instance bound to `host`.
    pub fn instantiate<H>(self: &Rc<Self>, host: H) -> ElementInstance<R, H>
    where
        H: HostElement<Node = R::Container>,
    {
        ElementInstance::new(Rc::clone(self), host)
    }
}

impl<R: UiRuntime> fmt::Debug for ElementClass<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementClass")
            .field("tag", &self.tag)
            .field("schema", &self.schema)
            .field("events", &self.events)
            .field("shadow", &self.shadow)
            .field("render_mode", &self.render_mode)
            .finish_non_exhaustive()
    }
}

/// Outcome of a [`define`] call.
#[derive(Debug)]
pub enum Definition<R: UiRuntime> {
    /// A new class was registered
    Registered(Rc<ElementClass<R>>),
    /// The tag already had an entry; nothing changed
    AlreadyDefined,
}

impl<R: UiRuntime> Definition<R> {
    /// The newly registered class, if any.
    pub fn class(&self) -> Option<&Rc<ElementClass<R>>> {
        match self {
            Definition::Registered(class) => Some(class),
            Definition::AlreadyDefined => None,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Definition::Registered(_))
    }
}

/// Errors that can occur when defining an element.
#[derive(Debug, thiserror::Error)]
pub enum DefineError {
    #[error("Invalid custom element name '{0}': tag names must contain a hyphen")]
    InvalidTagName(String),
}

/// Check the custom element naming contract.
pub fn validate_tag_name(tag: &str) -> Result<(), DefineError> {
    if !tag.contains('-') {
        return Err(DefineError::InvalidTagName(tag.to_string()));
    }
    Ok(())
}

/// Define a custom element backed by `runtime`.
///
/// The tag is validated before the registry is touched. Defining a tag that already has an
/// entry is a no-op returning [`Definition::AlreadyDefined`]; the existing class is kept.
pub fn define<R, G>(
    registry: &mut G,
    runtime: Rc<R>,
    definition: ElementDefinition<R::Component>,
) -> Result<Definition<R>, DefineError>
where
    R: UiRuntime,
    G: ElementRegistry<R> + ?Sized,
{
    validate_tag_name(&definition.tag)?;

    if registry.contains(&definition.tag) {
        tracing::debug!(tag = %definition.tag, "element already defined, skipping");
        return Ok(Definition::AlreadyDefined);
    }

    let class = Rc::new(ElementClass {
        tag: definition.tag,
        component: definition.component,
        runtime,
        schema: definition.schema,
        events: definition.events,
        shadow: definition.shadow,
        render_mode: definition.render_mode,
    });

    tracing::debug!(
        tag = %class.tag,
        props = class.schema.len(),
        events = class.events.len(),
        "defined custom element"
    );

    registry.define(Rc::clone(&class));

    Ok(Definition::Registered(class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRegistry;
    use crate::testing::{Recorder, RecordingRuntime};

    fn runtime() -> Rc<RecordingRuntime> {
        Rc::new(RecordingRuntime::new(Recorder::default()))
    }

    #[test]
    fn rejects_tag_without_hyphen() {
        let mut registry = MemoryRegistry::new();

        let result = define(
            &mut registry,
            runtime(),
            ElementDefinition::new("hellocard", "HelloCard"),
        );

        assert!(matches!(result, Err(DefineError::InvalidTagName(tag)) if tag == "hellocard"));
        assert!(registry.is_empty());
    }

    #[test]
    fn invalid_tag_does_not_affect_other_registrations() {
        let mut registry = MemoryRegistry::new();
        let runtime = runtime();

        define(&mut registry, Rc::clone(&runtime), ElementDefinition::new("x-ok", "Ok")).unwrap();
        let _ = define(&mut registry, Rc::clone(&runtime), ElementDefinition::new("bad", "Bad"));
        define(&mut registry, runtime, ElementDefinition::new("x-also-ok", "AlsoOk")).unwrap();

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn second_define_is_a_no_op() {
        let mut registry = MemoryRegistry::new();
        let runtime = runtime();

        let first = define(
            &mut registry,
            Rc::clone(&runtime),
            ElementDefinition::new("x-hello-card", "HelloCard").prop("name", PropKind::Text),
        )
        .unwrap();
        let second = define(
            &mut registry,
            runtime,
            ElementDefinition::new("x-hello-card", "Replacement").prop("other", PropKind::Json),
        )
        .unwrap();

        assert!(first.is_registered());
        assert!(matches!(second, Definition::AlreadyDefined));
        assert_eq!(registry.len(), 1);

        let class = registry.get("x-hello-card").unwrap();
        assert!(Rc::ptr_eq(class, first.class().unwrap()));
        assert_eq!(*class.component(), "HelloCard");
    }

    #[test]
    fn observed_attributes_follow_schema_order() {
        let mut registry = MemoryRegistry::new();

        let definition = define(
            &mut registry,
            runtime(),
            ElementDefinition::new("x-counter", "Counter")
                .prop("start", PropKind::Number)
                .prop("step", PropKind::Number)
                .event("onChange", "change"),
        )
        .unwrap();

        let class = definition.class().unwrap();
        assert_eq!(class.observed_attributes(), ["start", "step"]);
        assert!(!class.is_observed("onChange"));
    }
}
