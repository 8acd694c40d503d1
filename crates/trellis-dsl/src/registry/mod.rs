//! The component whitelist.
//!
//! Every component a plan may instantiate is registered here together with
//! its prop contract. A name that is not in the registry does not exist as far
//! as the planner, the validator, the compiler and the render engine are
//! concerned.

use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{self, Write};

mod standard;

lazy_static! {
    static ref WHITELIST: ComponentRegistry = standard::standard_registry();
}

/// The process-wide component whitelist
pub fn whitelist() -> &'static ComponentRegistry {
    &WHITELIST
}

/// The value kind a prop accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropKind {
    String,
    Boolean,
    Number,
    Enum,
    Array,
    Node,
}

impl fmt::Display for PropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropKind::String => "string",
            PropKind::Boolean => "boolean",
            PropKind::Number => "number",
            PropKind::Enum => "enum",
            PropKind::Array => "array",
            PropKind::Node => "node",
        };
        f.write_str(name)
    }
}

/// Contract for a single prop of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropSpec {
    /// Prop name as it appears in a plan
    pub name: String,

    /// Accepted value kind
    pub kind: PropKind,

    /// Whether a plan must provide the prop
    pub required: bool,

    /// Value used by the component implementation when the prop is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Allowed values when `kind` is `Enum`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Element kind when `kind` is `Array` (e.g. "string", "object")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<String>,

    /// Human-readable description, shown to the planner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropSpec {
    fn of_kind(name: &str, kind: PropKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
            values: Vec::new(),
            items: None,
            description: None,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::of_kind(name, PropKind::String)
    }

    pub fn boolean(name: &str) -> Self {
        Self::of_kind(name, PropKind::Boolean)
    }

    pub fn number(name: &str) -> Self {
        Self::of_kind(name, PropKind::Number)
    }

    pub fn node(name: &str) -> Self {
        Self::of_kind(name, PropKind::Node)
    }

    /// An enumerated prop restricted to `values`
    pub fn one_of(name: &str, values: &[&str]) -> Self {
        let mut spec = Self::of_kind(name, PropKind::Enum);
        spec.values = values.iter().map(|v| v.to_string()).collect();
        spec
    }

    /// An array prop whose elements are of kind `items`
    pub fn array_of(name: &str, items: &str) -> Self {
        let mut spec = Self::of_kind(name, PropKind::Array);
        spec.items = Some(items.to_string());
        spec
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Check whether a plan value conforms to this prop's kind
    pub fn accepts(&self, value: &Value) -> bool {
        match self.kind {
            PropKind::String => value.is_string(),
            PropKind::Boolean => value.is_boolean(),
            PropKind::Number => value.is_number(),
            PropKind::Enum => value
                .as_str()
                .map(|v| self.values.iter().any(|allowed| allowed == v))
                .unwrap_or(false),
            PropKind::Array => value.is_array(),
            PropKind::Node => value.is_string() || value.is_array() || value.is_object(),
        }
    }
}

/// A whitelisted component and its prop contract
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSpec {
    /// Unique component name, used as the plan node `type`
    pub name: String,

    /// Human-readable description, shown to the planner
    pub description: String,

    /// Props in declaration order
    pub props: Vec<PropSpec>,
}

impl ComponentSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            props: Vec::new(),
        }
    }

    pub fn prop(mut self, prop: PropSpec) -> Self {
        self.props.push(prop);
        self
    }

    /// Look up a prop contract by name
    pub fn get_prop(&self, name: &str) -> Option<&PropSpec> {
        self.props.iter().find(|p| p.name == name)
    }
}

/// Ordered, immutable registry of component specifications
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<ComponentSpec>,
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    /// Build a registry from specs; a later spec with a duplicate name replaces the earlier one
    pub fn new(specs: impl IntoIterator<Item = ComponentSpec>) -> Self {
        let mut registry = Self::default();
        for spec in specs {
            match registry.index.get(&spec.name) {
                Some(&position) => registry.components[position] = spec,
                None => {
                    registry.index.insert(spec.name.clone(), registry.components.len());
                    registry.components.push(spec);
                }
            }
        }
        registry
    }

    pub fn get(&self, name: &str) -> Option<&ComponentSpec> {
        self.index.get(name).map(|&i| &self.components[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names in registration order
    pub fn list_names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn components(&self) -> &[ComponentSpec] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Render the whole registry as planner-facing documentation.
    ///
    /// The output is stable: components and props appear in registration
    /// order, so the same registry always yields the same text.
    pub fn describe_for_prompt(&self) -> String {
        let mut summary = String::from("AVAILABLE COMPONENTS (you can ONLY use these):\n\n");
        for component in &self.components {
            let _ = writeln!(summary, "<{}>: {}", component.name, component.description);
            summary.push_str("  Props:\n");
            for prop in &component.props {
                summary.push_str(&describe_prop(prop));
                summary.push('\n');
            }
            summary.push('\n');
        }
        summary
    }
}

fn describe_prop(prop: &PropSpec) -> String {
    let mut line = format!("    - {}", prop.name);
    match prop.kind {
        PropKind::Enum => {
            let _ = write!(line, " (one of: {})", prop.values.join(", "));
        }
        PropKind::Array => match &prop.items {
            Some(items) => {
                let _ = write!(line, " (array of {})", items);
            }
            None => line.push_str(" (array)"),
        },
        kind => {
            let _ = write!(line, " ({})", kind);
        }
    }
    if prop.required {
        line.push_str(" [REQUIRED]");
    }
    if let Some(default) = &prop.default {
        let rendered = match default {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let _ = write!(line, " [default: {}]", rendered);
    }
    if let Some(description) = &prop.description {
        let _ = write!(line, " - {}", description);
    }
    line
}
