use std::error::Error;
use std::fmt;

use crate::plan::{ElementNode, Plan, PlanNode};
use crate::registry::{whitelist, ComponentRegistry};

mod props;
mod structure;

pub use props::PropValidator;
pub use structure::WhitelistValidator;

/// Represents a single violation found in a candidate plan
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error code (should be a constant identifier)
    pub code: &'static str,

    /// Human-readable error message
    pub message: String,

    /// Optional path to the offending node (e.g., "layout.children[2]")
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(code: &'static str, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl Error for ValidationError {}

/// Validation error codes
pub mod error_codes {
    /// The plan has no `layout` root
    pub const MISSING_LAYOUT: &str = "ERR_PLAN_VALIDATION_MISSING_LAYOUT";

    /// A node is neither an element object nor a text string
    pub const INVALID_NODE: &str = "ERR_PLAN_VALIDATION_INVALID_NODE";

    /// An element object has no `type`
    pub const MISSING_TYPE: &str = "ERR_PLAN_VALIDATION_MISSING_TYPE";

    /// An element names a component outside the whitelist
    pub const UNKNOWN_COMPONENT: &str = "ERR_PLAN_VALIDATION_UNKNOWN_COMPONENT";

    /// A required prop is absent
    pub const MISSING_REQUIRED_PROP: &str = "ERR_PLAN_VALIDATION_MISSING_REQUIRED_PROP";

    /// A prop value does not match the declared kind or enum values
    pub const INVALID_PROP_VALUE: &str = "ERR_PLAN_VALIDATION_INVALID_PROP_VALUE";

    /// A prop is not declared by the component
    pub const UNKNOWN_PROP: &str = "ERR_PLAN_VALIDATION_UNKNOWN_PROP";
}

/// A trait for validators that check specific aspects of a plan
pub trait Validator {
    /// Validate the plan and return a list of validation errors (if any)
    fn validate(&self, plan: &Plan) -> Vec<ValidationError>;
}

/// Runs the structural whitelist check and, when strict, prop conformance
pub struct PlanValidator<'r> {
    registry: &'r ComponentRegistry,
    strict_props: bool,
}

impl<'r> PlanValidator<'r> {
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        Self {
            registry,
            strict_props: false,
        }
    }

    /// Also check props against each component's contract
    pub fn strict(mut self, strict_props: bool) -> Self {
        self.strict_props = strict_props;
        self
    }

    /// Collect every violation in the plan; an empty list means the plan is valid
    pub fn validate(&self, plan: &Plan) -> Vec<ValidationError> {
        let mut validators: Vec<Box<dyn Validator + '_>> = vec![Box::new(WhitelistValidator::new(self.registry))];
        if self.strict_props {
            validators.push(Box::new(PropValidator::new(self.registry)));
        }

        let mut errors = Vec::new();
        for validator in validators {
            errors.extend(validator.validate(plan));
        }

        if !errors.is_empty() {
            tracing::debug!(violations = errors.len(), "Plan failed validation");
        }
        errors
    }

    /// Like [`PlanValidator::validate`], but as a `Result`
    pub fn check(&self, plan: &Plan) -> Result<(), crate::DslError> {
        let errors = self.validate(plan);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(crate::DslError::from_validation_errors(errors))
        }
    }
}

/// Validate a plan against the standard whitelist, structure only
pub fn validate_plan(plan: &Plan) -> Vec<ValidationError> {
    PlanValidator::new(whitelist()).validate(plan)
}

pub(crate) const ROOT_PATH: &str = "layout";

pub(crate) fn child_path(parent: &str, index: usize) -> String {
    format!("{}.children[{}]", parent, index)
}

/// Visit every well-formed element under `root` together with its path
pub(crate) fn walk_elements<'a>(root: &'a PlanNode, path: &str, visit: &mut dyn FnMut(&'a ElementNode, &str)) {
    if let PlanNode::Element(element) = root {
        visit(element, path);
        for (i, child) in element.children.iter().enumerate() {
            walk_elements(child, &child_path(path, i), visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_with_and_without_path() {
        let with_path = ValidationError::new(error_codes::MISSING_TYPE, "Missing \"type\"", "layout");
        assert_eq!(
            with_path.to_string(),
            "ERR_PLAN_VALIDATION_MISSING_TYPE: Missing \"type\" (at layout)"
        );

        let without_path = ValidationError {
            path: None,
            ..with_path
        };
        assert_eq!(without_path.to_string(), "ERR_PLAN_VALIDATION_MISSING_TYPE: Missing \"type\"");
    }

    #[test]
    fn test_strict_mode_adds_prop_violations() {
        let plan = Plan::from_value(json!({
            "layout": { "type": "Button", "props": { "variant": "neon" } }
        }));

        let lenient = PlanValidator::new(whitelist()).validate(&plan);
        assert!(lenient.is_empty());

        let strict = PlanValidator::new(whitelist()).strict(true).validate(&plan);
        let codes: Vec<&str> = strict.iter().map(|e| e.code).collect();
        assert!(codes.contains(&error_codes::MISSING_REQUIRED_PROP));
        assert!(codes.contains(&error_codes::INVALID_PROP_VALUE));
    }

    #[test]
    fn test_check_returns_dsl_error() {
        let plan = Plan::from_value(json!({ "screen": {} }));
        let err = PlanValidator::new(whitelist()).check(&plan).unwrap_err();
        assert_eq!(err.error_code(), error_codes::MISSING_LAYOUT);
    }
}
