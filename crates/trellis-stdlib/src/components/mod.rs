// Implementations of the whitelisted components.
//
// Each component turns its props and already-rendered children into a host
// tree. Props arrive straight from program text, so implementations accept
// whatever they are given and fall back to their defaults.

use lazy_static::lazy_static;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::render::RenderNode;

pub mod chart;
pub mod content;
pub mod layout;
pub mod navigation;

pub use chart::Chart;
pub use content::{Alert, Button, Image, Input, Table, Typography};
pub use layout::{Card, Container, Flex, Grid, Modal};
pub use navigation::{Navbar, Sidebar};

/// A component implementation the render engine can call
pub trait UiComponent: Send + Sync {
    /// The name programs use to refer to this component
    fn component_type(&self) -> &str;

    /// Render the component into a host tree
    fn render(&self, props: &ComponentProps) -> RenderNode;
}

/// Props passed to a component, with the rendered children kept separately
#[derive(Debug, Clone, Default)]
pub struct ComponentProps {
    values: Map<String, Value>,
    children: Vec<RenderNode>,
}

impl ComponentProps {
    pub fn new(values: Map<String, Value>, children: Vec<RenderNode>) -> Self {
        Self { values, children }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// A prop as display text; numbers and booleans are stringified
    pub fn string(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn string_or(&self, name: &str, default: &str) -> String {
        self.string(name).unwrap_or_else(|| default.to_string())
    }

    /// A prop that is set and renders as non-empty text
    pub fn non_empty(&self, name: &str) -> Option<String> {
        self.string(name).filter(|s| !s.is_empty())
    }

    /// Truthiness of a boolean prop, with a default when absent
    pub fn flag_or(&self, name: &str, default: bool) -> bool {
        match self.get(name) {
            None => default,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Some(_) => true,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// An array prop; anything else reads as empty
    pub fn array(&self, name: &str) -> &[Value] {
        match self.get(name) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }

    /// Rendered children, or the `children` prop as text when no children were nested
    pub fn children(&self) -> Vec<RenderNode> {
        if !self.children.is_empty() {
            return self.children.clone();
        }
        self.string("children").map(RenderNode::text).into_iter().collect()
    }
}

/// Display text for an arbitrary value placed in a cell or list
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(_) => String::new(),
        other => other.to_string(),
    }
}

/// Named set of component implementations
#[derive(Clone, Default)]
pub struct ComponentLibrary {
    components: HashMap<String, Arc<dyn UiComponent>>,
}

impl ComponentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, component: Arc<dyn UiComponent>) {
        self.components.insert(component.component_type().to_string(), component);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn UiComponent>> {
        self.components.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Sorted component names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ComponentLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentLibrary").field("components", &self.names()).finish()
    }
}

/// Build a library holding every standard component
pub fn standard_library() -> ComponentLibrary {
    let mut library = ComponentLibrary::new();
    let components: Vec<Arc<dyn UiComponent>> = vec![
        Arc::new(Button),
        Arc::new(Card),
        Arc::new(Input),
        Arc::new(Table),
        Arc::new(Modal),
        Arc::new(Sidebar),
        Arc::new(Navbar),
        Arc::new(Typography),
        Arc::new(Chart),
        Arc::new(Image),
        Arc::new(Alert),
        Arc::new(Flex),
        Arc::new(Grid),
        Arc::new(Container),
    ];
    for component in components {
        library.register(component);
    }
    library
}

lazy_static! {
    static ref LIBRARY: ComponentLibrary = standard_library();
}

/// The process-wide standard component library
pub fn library() -> &'static ComponentLibrary {
    &LIBRARY
}
