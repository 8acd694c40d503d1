//! The render tree produced by component implementations.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Elements that never have children or a closing tag in HTML
const VOID_ELEMENTS: &[&str] = &["input", "img"];

/// A node of a rendered UI tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderNode {
    /// A host element such as `div` or `button`
    Element {
        tag: String,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<RenderNode>,
    },

    /// Text content
    Text { text: String },

    /// A transparent grouping of nodes
    Fragment { children: Vec<RenderNode> },
}

impl RenderNode {
    pub fn element(tag: &str) -> Self {
        RenderNode::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        RenderNode::Text { text: text.into() }
    }

    pub fn fragment(children: Vec<RenderNode>) -> Self {
        RenderNode::Fragment { children }
    }

    /// An empty fragment, what a component renders when it renders nothing
    pub fn empty() -> Self {
        RenderNode::Fragment { children: Vec::new() }
    }

    /// Set an attribute; no-op on non-elements
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let RenderNode::Element { attributes, .. } = &mut self {
            attributes.insert(name.to_string(), value.into());
        }
        self
    }

    /// Set a boolean attribute, present only when `on`
    pub fn flag(self, name: &str, on: bool) -> Self {
        if on {
            self.attr(name, "")
        } else {
            self
        }
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    pub fn style(self, style: impl Into<String>) -> Self {
        self.attr("style", style)
    }

    /// Append a child; no-op on text nodes
    pub fn child(mut self, child: RenderNode) -> Self {
        match &mut self {
            RenderNode::Element { children, .. } | RenderNode::Fragment { children } => children.push(child),
            RenderNode::Text { .. } => {}
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = RenderNode>) -> Self {
        for node in nodes {
            self = self.child(node);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            RenderNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        match self {
            RenderNode::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn child_nodes(&self) -> &[RenderNode] {
        match self {
            RenderNode::Element { children, .. } | RenderNode::Fragment { children } => children,
            RenderNode::Text { .. } => &[],
        }
    }

    /// Visit this node and all descendants, depth first
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a RenderNode)) {
        visit(self);
        for child in self.child_nodes() {
            child.walk(visit);
        }
    }

    /// Every element in the subtree with the given tag
    pub fn find_all(&self, tag: &str) -> Vec<&RenderNode> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if node.tag() == Some(tag) {
                found.push(node);
            }
        });
        found
    }

    /// Concatenated text of the subtree
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |node| {
            if let RenderNode::Text { text } = node {
                out.push_str(text);
            }
        });
        out
    }

    /// Serialize as HTML; text and attribute values are escaped
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        self.write_html(&mut html);
        html
    }

    fn write_html(&self, out: &mut String) {
        match self {
            RenderNode::Text { text } => out.push_str(&escape_html(text)),
            RenderNode::Fragment { children } => {
                for child in children {
                    child.write_html(out);
                }
            }
            RenderNode::Element { tag, attributes, children } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    if value.is_empty() {
                        let _ = write!(out, " {}", name);
                    } else {
                        let _ = write!(out, " {}=\"{}\"", name, escape_html(value));
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", tag);
            }
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
