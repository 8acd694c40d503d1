//! Deterministic lowering of a plan into UI-program text.
//!
//! The emitted program is a restricted JSX module: one import line naming the
//! components in first-use order, and a single zero-argument entry point
//! returning the tree. The render engine in `trellis-stdlib` interprets
//! exactly this subset.

use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;
use tracing::warn;

use crate::plan::{ElementNode, Plan, PlanNode};
use crate::registry::{whitelist, ComponentRegistry};

mod escape;

pub use escape::{escape_text, escape_text_content, is_valid_prop_name, sanitize_blocked_name};

/// Name of the function every compiled program exports
pub const ENTRY_POINT: &str = "GeneratedUI";

/// Module specifier the compiled program imports components from
pub const COMPONENT_MODULE: &str = "./components";

/// The composition primitive; always in scope, never imported
pub const FRAGMENT: &str = "Fragment";

const ROOT_INDENT: usize = 4;
const INDENT_STEP: usize = 2;

/// Program text plus the components it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledArtifact {
    pub code: String,
    pub used_components: Vec<String>,
}

impl CompiledArtifact {
    /// The program produced when there is nothing to compile
    pub fn fallback() -> Self {
        Self {
            code: format!(
                "// No layout plan provided\nexport default function {}() {{\n  return <{f}>No UI generated yet.</{f}>;\n}}",
                ENTRY_POINT,
                f = FRAGMENT
            ),
            used_components: Vec::new(),
        }
    }
}

/// Compiles plans against a component registry
pub struct PlanCompiler<'r> {
    registry: &'r ComponentRegistry,
}

impl<'r> PlanCompiler<'r> {
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Lower a plan into program text. Never fails.
    ///
    /// Nodes naming components outside the registry become inert comments;
    /// malformed nodes are skipped. A root that is not a component element is
    /// wrapped in a fragment so the entry point always returns one tree.
    pub fn compile(&self, plan: Option<&Plan>) -> CompiledArtifact {
        let Some(layout) = plan.and_then(|p| p.layout.as_ref()) else {
            return CompiledArtifact::fallback();
        };

        let mut emitter = Emitter {
            registry: self.registry,
            used: Vec::new(),
        };

        let root_is_component = matches!(layout, PlanNode::Element(e) if self.registry.contains(&e.component_type));
        let body = if root_is_component {
            emitter.node(layout, ROOT_INDENT)
        } else {
            let pad = " ".repeat(ROOT_INDENT);
            emitter
                .node(layout, ROOT_INDENT + INDENT_STEP)
                .map(|inner| format!("{pad}<{f}>\n{inner}\n{pad}</{f}>", f = FRAGMENT))
        };

        let Some(body) = body else {
            warn!("Plan root produced no output, using fallback program");
            return CompiledArtifact::fallback();
        };

        let mut code = String::new();
        if !emitter.used.is_empty() {
            let _ = write!(
                code,
                "import {{ {} }} from \"{}\";\n\n",
                emitter.used.join(", "),
                COMPONENT_MODULE
            );
        }
        let _ = write!(code, "export default function {}() {{\n  return (\n{}\n  );\n}}", ENTRY_POINT, body);

        CompiledArtifact {
            code,
            used_components: emitter.used,
        }
    }
}

/// Compile against the standard whitelist
pub fn compile(plan: Option<&Plan>) -> CompiledArtifact {
    PlanCompiler::new(whitelist()).compile(plan)
}

struct Emitter<'r> {
    registry: &'r ComponentRegistry,
    used: Vec<String>,
}

impl Emitter<'_> {
    fn node(&mut self, node: &PlanNode, indent: usize) -> Option<String> {
        let pad = " ".repeat(indent);
        match node {
            PlanNode::Text(text) => Some(format!("{}{}", pad, escape_text_content(text))),
            PlanNode::Element(element) => self.element(element, &pad, indent),
            PlanNode::Malformed(value) => match value.get("type").and_then(Value::as_str) {
                Some(name) if !name.is_empty() && !self.registry.contains(name) => Some(blocked(name, &pad)),
                _ => {
                    warn!(node = %value, "Skipping malformed plan node");
                    None
                }
            },
        }
    }

    fn element(&mut self, element: &ElementNode, pad: &str, indent: usize) -> Option<String> {
        let tag = element.component_type.as_str();
        if tag.is_empty() {
            return None;
        }
        if !self.registry.contains(tag) {
            warn!(component = %tag, "Blocked prohibited component");
            return Some(blocked(tag, pad));
        }
        if !self.used.iter().any(|name| name == tag) {
            self.used.push(tag.to_string());
        }

        let attributes = self.attributes(element);
        let text = element.props.get("children").and_then(Value::as_str).map(escape_text_content);
        let children: Vec<String> = element
            .children
            .iter()
            .filter_map(|child| self.node(child, indent + INDENT_STEP))
            .collect();

        let out = match (text, children.is_empty()) {
            (None, true) => format!("{pad}<{tag}{attributes} />"),
            (Some(text), true) => format!("{pad}<{tag}{attributes}>{text}</{tag}>"),
            (text, false) => {
                let mut out = format!("{pad}<{tag}{attributes}>\n");
                if let Some(text) = text {
                    let _ = writeln!(out, "{pad}  {text}");
                }
                for child in &children {
                    out.push_str(child);
                    out.push('\n');
                }
                let _ = write!(out, "{pad}</{tag}>");
                out
            }
        };
        Some(out)
    }

    fn attributes(&self, element: &ElementNode) -> String {
        let mut attributes = String::new();
        for (key, value) in &element.props {
            if key == "children" {
                continue;
            }
            if !is_valid_prop_name(key) {
                warn!(component = %element.component_type, prop = %key, "Dropping prop with invalid name");
                continue;
            }
            let _ = match value {
                Value::String(s) => write!(attributes, " {}=\"{}\"", key, escape_text(s)),
                Value::Bool(true) => write!(attributes, " {}", key),
                Value::Bool(false) => write!(attributes, " {}={{false}}", key),
                Value::Number(n) => write!(attributes, " {}={{{}}}", key, n),
                other => write!(attributes, " {}={{{}}}", key, other),
            };
        }
        attributes
    }
}

fn blocked(name: &str, pad: &str) -> String {
    format!(
        "{}{{/* ⚠️ Blocked prohibited component: \"{}\" */}}",
        pad,
        sanitize_blocked_name(name)
    )
}
