//! Sandboxed execution of compiled UI programs.
//!
//! A program is never loaded or compiled as code. The engine strips the module
//! syntax, parses the remaining declarations into a small syntax tree and
//! interprets it against a closed scope: the `Fragment` primitive and the
//! component implementations that are also on the whitelist. No other name
//! resolves, so neither host tags nor program-local functions can be
//! instantiated.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use trellis_dsl::compiler::{ENTRY_POINT, FRAGMENT};
use trellis_dsl::{whitelist, ComponentRegistry};

use crate::components::{library, ComponentLibrary, ComponentProps, UiComponent};
use crate::render::RenderNode;

mod parser;
mod text;

use parser::{parse_program, Child, Element, Expr};

lazy_static! {
    static ref IMPORT_LINE: Regex = Regex::new(r"(?m)^import\s+.*$").expect("valid import regex");
    static ref EXPORT_DEFAULT: Regex = Regex::new(r"export\s+default\s+").expect("valid export regex");
    static ref STANDARD_ENGINE: RenderEngine = RenderEngine::new();
}

/// Failures while turning program text into a render tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The program is not in the accepted syntax
    #[error("Transform error: {0}")]
    Transform(String),

    /// The program parsed but failed while building the tree
    #[error("Render error: {0}")]
    Execution(String),

    /// No zero-argument entry point was declared
    #[error("Could not find {} component in the code.", ENTRY_POINT)]
    NoEntryPoint,
}

impl RenderError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RenderError::Transform(_) => "ERR_RENDER_TRANSFORM",
            RenderError::Execution(_) => "ERR_RENDER_EXECUTION",
            RenderError::NoEntryPoint => "ERR_RENDER_NO_ENTRY_POINT",
        }
    }
}

/// Outcome of a successful render
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Nothing to show: blank program text, or an entry point that returns nothing
    Empty,

    /// The rendered UI
    Tree(RenderNode),
}

impl Rendered {
    pub fn tree(&self) -> Option<&RenderNode> {
        match self {
            Rendered::Empty => None,
            Rendered::Tree(tree) => Some(tree),
        }
    }

    pub fn to_html(&self) -> String {
        self.tree().map(RenderNode::to_html).unwrap_or_default()
    }
}

/// Interprets compiled programs against a fixed component scope
pub struct RenderEngine {
    scope: HashMap<String, Arc<dyn UiComponent>>,
}

impl RenderEngine {
    /// An engine over the standard library, restricted to the standard whitelist
    pub fn new() -> Self {
        Self::with_library(library(), whitelist())
    }

    /// An engine whose scope holds the library components that `registry` allows
    pub fn with_library(library: &ComponentLibrary, registry: &ComponentRegistry) -> Self {
        let scope = registry
            .list_names()
            .into_iter()
            .filter_map(|name| library.get(name).map(|component| (name.to_string(), component)))
            .collect();
        Self { scope }
    }

    /// Names that resolve inside a program, sorted
    pub fn scope_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scope.keys().map(String::as_str).collect();
        names.push(FRAGMENT);
        names.sort_unstable();
        names
    }

    /// Render program text.
    ///
    /// Blank text renders as [`Rendered::Empty`]. Every failure is returned as
    /// a [`RenderError`]; the engine holds no state between calls, so the same
    /// text always yields the same result.
    pub fn render(&self, code: &str) -> Result<Rendered, RenderError> {
        if code.trim().is_empty() {
            return Ok(Rendered::Empty);
        }
        debug!(bytes = code.len(), "Rendering program");

        let source = strip_module_syntax(code);
        let program = parse_program(&source)?;

        // Later declarations shadow earlier ones
        let entry = program
            .functions
            .iter()
            .rev()
            .find(|f| f.name == ENTRY_POINT)
            .filter(|f| f.params.is_empty())
            .ok_or(RenderError::NoEntryPoint)?;

        let nodes = match &entry.body {
            Some(expr) => self.evaluate(expr)?,
            None => Vec::new(),
        };

        let mut nodes = nodes.into_iter();
        Ok(match (nodes.next(), nodes.next()) {
            (None, _) => Rendered::Empty,
            (Some(only), None) => Rendered::Tree(only),
            (Some(first), Some(second)) => {
                let mut all = vec![first, second];
                all.extend(nodes);
                Rendered::Tree(RenderNode::fragment(all))
            }
        })
    }

    fn evaluate(&self, expr: &Expr) -> Result<Vec<RenderNode>, RenderError> {
        match expr {
            Expr::Element(element) => Ok(vec![self.element(element)?]),
            Expr::Fragment(children) => Ok(vec![RenderNode::fragment(self.children(children)?)]),
            Expr::Literal(value) => literal_nodes(value),
        }
    }

    fn element(&self, element: &Element) -> Result<RenderNode, RenderError> {
        if element.tag == FRAGMENT {
            return Ok(RenderNode::fragment(self.children(&element.children)?));
        }

        let component = self.scope.get(&element.tag).ok_or_else(|| {
            RenderError::Execution(format!("\"{}\" is not an available component", element.tag))
        })?;

        let mut values = Map::new();
        for (name, value) in &element.attributes {
            if name != "key" {
                values.insert(name.clone(), value.clone());
            }
        }
        let children = self.children(&element.children)?;
        Ok(component.render(&ComponentProps::new(values, children)))
    }

    fn children(&self, children: &[Child]) -> Result<Vec<RenderNode>, RenderError> {
        let mut nodes = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Child::Text(text) => nodes.push(RenderNode::text(text.clone())),
                Child::Expr(expr) => nodes.extend(self.evaluate(expr)?),
            }
        }
        Ok(nodes)
    }
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Render with the standard engine
pub fn render(code: &str) -> Result<Rendered, RenderError> {
    STANDARD_ENGINE.render(code)
}

/// Remove import lines and the first `export default` so only declarations remain
pub(crate) fn strip_module_syntax(code: &str) -> String {
    let without_imports = IMPORT_LINE.replace_all(code, "");
    EXPORT_DEFAULT.replace(&without_imports, "").into_owned()
}

/// Nodes for a literal placed as a child: nulls and booleans render nothing
fn literal_nodes(value: &Value) -> Result<Vec<RenderNode>, RenderError> {
    match value {
        Value::Null | Value::Bool(_) => Ok(Vec::new()),
        Value::String(s) => Ok(vec![RenderNode::text(s.clone())]),
        Value::Number(n) => Ok(vec![RenderNode::text(n.to_string())]),
        Value::Array(items) => {
            let mut nodes = Vec::new();
            for item in items {
                nodes.extend(literal_nodes(item)?);
            }
            Ok(nodes)
        }
        Value::Object(_) => Err(RenderError::Execution(
            "Objects are not valid as a UI child".to_string(),
        )),
    }
}
