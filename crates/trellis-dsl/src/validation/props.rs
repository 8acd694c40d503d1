use super::{error_codes, walk_elements, ValidationError, Validator, ROOT_PATH};
use crate::plan::{ElementNode, Plan};
use crate::registry::{ComponentRegistry, ComponentSpec, PropKind};

/// Checks each whitelisted element's props against the component contract.
///
/// Elements naming unknown components are skipped; the whitelist check
/// reports those.
pub struct PropValidator<'r> {
    registry: &'r ComponentRegistry,
}

impl<'r> PropValidator<'r> {
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        Self { registry }
    }

    fn check_element(&self, spec: &ComponentSpec, element: &ElementNode, path: &str, errors: &mut Vec<ValidationError>) {
        for prop in spec.props.iter().filter(|p| p.required) {
            let provided = element.props.contains_key(&prop.name)
                || (prop.name == "children" && !element.children.is_empty());
            if !provided {
                errors.push(ValidationError::new(
                    error_codes::MISSING_REQUIRED_PROP,
                    format!("Component \"{}\" at {} is missing required prop \"{}\"", spec.name, path, prop.name),
                    path,
                ));
            }
        }

        for (name, value) in &element.props {
            let prop_path = format!("{}.props.{}", path, name);
            let Some(prop) = spec.get_prop(name) else {
                errors.push(ValidationError::new(
                    error_codes::UNKNOWN_PROP,
                    format!("Component \"{}\" has no prop \"{}\"", spec.name, name),
                    prop_path,
                ));
                continue;
            };

            if !prop.accepts(value) {
                let expected = match prop.kind {
                    PropKind::Enum => format!("one of: {}", prop.values.join(", ")),
                    kind => kind.to_string(),
                };
                errors.push(ValidationError::new(
                    error_codes::INVALID_PROP_VALUE,
                    format!("Prop \"{}\" of \"{}\" expects {}, got {}", name, spec.name, expected, value),
                    prop_path,
                ));
            }
        }
    }
}

impl Validator for PropValidator<'_> {
    fn validate(&self, plan: &Plan) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(layout) = &plan.layout {
            walk_elements(layout, ROOT_PATH, &mut |element, path| {
                if let Some(spec) = self.registry.get(&element.component_type) {
                    self.check_element(spec, element, path, &mut errors);
                }
            });
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::whitelist;
    use serde_json::json;

    fn validate(value: serde_json::Value) -> Vec<ValidationError> {
        PropValidator::new(whitelist()).validate(&Plan::from_value(value))
    }

    #[test]
    fn test_conforming_props() {
        let errors = validate(json!({
            "layout": {
                "type": "Card",
                "props": { "title": "Login" },
                "children": [
                    { "type": "Input", "props": { "label": "Email", "type": "email" } },
                    { "type": "Button", "props": { "children": "Sign in", "variant": "primary", "disabled": false } }
                ]
            }
        }));
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_structural_children_satisfy_required_children_prop() {
        let errors = validate(json!({
            "layout": { "type": "Container", "children": ["hello"] }
        }));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_prop_violations() {
        let errors = validate(json!({
            "layout": {
                "type": "Flex",
                "props": { "gap": "xl", "onHover": "wiggle" },
                "children": [{ "type": "Grid", "props": { "columns": "three" }, "children": ["x"] }]
            }
        }));

        let summary: Vec<(&str, Option<&str>)> = errors.iter().map(|e| (e.code, e.path.as_deref())).collect();
        assert_eq!(
            summary,
            vec![
                (error_codes::INVALID_PROP_VALUE, Some("layout.props.gap")),
                (error_codes::UNKNOWN_PROP, Some("layout.props.onHover")),
                (error_codes::INVALID_PROP_VALUE, Some("layout.children[0].props.columns")),
            ]
        );
        assert!(errors[0].message.contains("one of: sm, md, lg"));
    }

    #[test]
    fn test_unknown_components_are_ignored() {
        assert!(validate(json!({ "layout": { "type": "Carousel", "props": { "x": 1 } } })).is_empty());
    }
}
