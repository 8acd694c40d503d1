use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A UI plan: a single root node under the `layout` key.
///
/// `layout` is optional only so that candidate plans received from the
/// planner can be represented before validation; a validated plan always
/// carries a layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<PlanNode>,
}

impl Plan {
    pub fn new(layout: PlanNode) -> Self {
        Self { layout: Some(layout) }
    }

    /// Interpret an arbitrary JSON value as a candidate plan.
    ///
    /// Never fails: anything that is not an object yields a plan without a
    /// layout, which the validator reports.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                let layout = match map.remove("layout") {
                    None | Some(Value::Null) => None,
                    Some(root) => Some(PlanNode::from_value(root)),
                };
                Plan { layout }
            }
            _ => Plan::default(),
        }
    }
}

/// A node of the plan tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanNode {
    /// Raw text content
    Text(String),

    /// A component instance
    Element(ElementNode),

    /// Anything else the planner produced; kept so it can be reported with its path
    Malformed(Value),
}

impl PlanNode {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => PlanNode::Text(text),
            Value::Object(_) => match serde_json::from_value::<ElementNode>(value.clone()) {
                Ok(element) => PlanNode::Element(element),
                Err(_) => PlanNode::Malformed(value),
            },
            other => PlanNode::Malformed(other),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        PlanNode::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            PlanNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Visit every element in the subtree, depth first, parents before children
    pub fn visit_elements<'a>(&'a self, visit: &mut dyn FnMut(&'a ElementNode)) {
        if let PlanNode::Element(element) = self {
            visit(element);
            for child in &element.children {
                child.visit_elements(visit);
            }
        }
    }
}

impl From<ElementNode> for PlanNode {
    fn from(element: ElementNode) -> Self {
        PlanNode::Element(element)
    }
}

/// A component instance in the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    /// Component name; must be whitelisted for the plan to validate
    #[serde(rename = "type")]
    pub component_type: String,

    /// Prop values keyed by prop name, in the order the planner produced them
    #[serde(default, deserialize_with = "deserialize_props")]
    pub props: Map<String, Value>,

    /// Nested nodes
    #[serde(default, deserialize_with = "deserialize_children", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlanNode>,
}

impl ElementNode {
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            props: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn with_prop(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<PlanNode>) -> Self {
        self.children.push(child.into());
        self
    }
}

impl From<&str> for PlanNode {
    fn from(text: &str) -> Self {
        PlanNode::Text(text.to_string())
    }
}

/// Props that are not an object are treated as no props
fn deserialize_props<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(props) => Ok(props),
        _ => Ok(Map::new()),
    }
}

/// Children may be a list of nodes or a bare string; other shapes carry no children
fn deserialize_children<'de, D>(deserializer: D) -> Result<Vec<PlanNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let children = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(PlanNode::from_value).collect(),
        Value::String(text) => vec![PlanNode::Text(text)],
        _ => Vec::new(),
    };
    Ok(children)
}
