use serde_json::Value;

use super::{child_path, error_codes, ValidationError, Validator, ROOT_PATH};
use crate::plan::{ElementNode, Plan, PlanNode};
use crate::registry::ComponentRegistry;

/// Checks the tree shape and that every element names a whitelisted component.
///
/// The walk never stops at the first problem: every violation in the tree is
/// reported, each with the path of the node it concerns.
pub struct WhitelistValidator<'r> {
    registry: &'r ComponentRegistry,
}

impl<'r> WhitelistValidator<'r> {
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        Self { registry }
    }

    fn check_node(&self, node: &PlanNode, path: &str, errors: &mut Vec<ValidationError>) {
        match node {
            PlanNode::Text(_) => {}
            PlanNode::Element(element) => self.check_element(element, path, errors),
            PlanNode::Malformed(value) => self.check_malformed(value, path, errors),
        }
    }

    fn check_element(&self, element: &ElementNode, path: &str, errors: &mut Vec<ValidationError>) {
        if element.component_type.is_empty() {
            errors.push(missing_type(path));
        } else if !self.registry.contains(&element.component_type) {
            errors.push(self.unknown_component(&element.component_type, path));
        }

        for (i, child) in element.children.iter().enumerate() {
            self.check_node(child, &child_path(path, i), errors);
        }
    }

    fn check_malformed(&self, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
        let Value::Object(object) = value else {
            errors.push(ValidationError::new(
                error_codes::INVALID_NODE,
                format!("Invalid node at {}: expected object or string", path),
                path,
            ));
            return;
        };

        match object.get("type") {
            None | Some(Value::Null) => errors.push(missing_type(path)),
            Some(Value::String(name)) if name.is_empty() => errors.push(missing_type(path)),
            Some(Value::String(name)) => errors.push(self.unknown_component(name, path)),
            Some(other) => errors.push(self.unknown_component(&other.to_string(), path)),
        }

        if let Some(Value::Array(children)) = object.get("children") {
            for (i, child) in children.iter().enumerate() {
                let child = PlanNode::from_value(child.clone());
                self.check_node(&child, &child_path(path, i), errors);
            }
        }
    }

    fn unknown_component(&self, name: &str, path: &str) -> ValidationError {
        ValidationError::new(
            error_codes::UNKNOWN_COMPONENT,
            format!(
                "Component \"{}\" at {} is NOT in the allowed list. Allowed: {}",
                name,
                path,
                self.registry.list_names().join(", ")
            ),
            path,
        )
    }
}

fn missing_type(path: &str) -> ValidationError {
    ValidationError::new(error_codes::MISSING_TYPE, format!("Missing \"type\" at {}", path), path)
}

impl Validator for WhitelistValidator<'_> {
    fn validate(&self, plan: &Plan) -> Vec<ValidationError> {
        let Some(layout) = &plan.layout else {
            return vec![ValidationError {
                code: error_codes::MISSING_LAYOUT,
                message: "Plan must have a \"layout\" key".to_string(),
                path: None,
            }];
        };

        let mut errors = Vec::new();
        self.check_node(layout, ROOT_PATH, &mut errors);
        errors
    }
}
