//! Fixtures shared by the Trellis end-to-end scenarios.

use serde_json::{json, Value};
use std::sync::Arc;
use trellis_core::testing::ScriptedOracle;
use trellis_core::{GenerationConfig, GenerationService};
use trellis_state_inmemory::InMemorySessionStore;

/// A pipeline over a fresh in-memory store and a scripted oracle
pub struct TestPipeline {
    pub service: GenerationService,
    pub oracle: Arc<ScriptedOracle>,
    pub store: Arc<InMemorySessionStore>,
}

impl TestPipeline {
    pub fn new(oracle: ScriptedOracle) -> Self {
        Self::with_config(oracle, GenerationConfig::default())
    }

    pub fn with_config(oracle: ScriptedOracle, config: GenerationConfig) -> Self {
        let oracle = Arc::new(oracle);
        let store = Arc::new(InMemorySessionStore::new());
        let service = GenerationService::new(store.clone(), oracle.clone(), config);
        Self { service, oracle, store }
    }
}

/// Planner answer and explanation for one successful generation
pub fn turn(plan: &Value, explanation: &str) -> [String; 2] {
    [plan.to_string(), explanation.to_string()]
}

pub mod plans {
    use super::*;

    pub fn login_form() -> Value {
        json!({
            "layout": {
                "type": "Container",
                "props": {},
                "children": [{
                    "type": "Card",
                    "props": { "title": "Login" },
                    "children": [{
                        "type": "Flex",
                        "props": { "direction": "column", "gap": "md" },
                        "children": [
                            { "type": "Input", "props": { "label": "Email", "type": "email", "placeholder": "Enter your email" } },
                            { "type": "Input", "props": { "label": "Password", "type": "password", "placeholder": "Enter your password" } },
                            { "type": "Button", "props": { "children": "Sign In", "variant": "primary" } }
                        ]
                    }]
                }]
            }
        })
    }

    pub fn dashboard() -> Value {
        json!({
            "layout": {
                "type": "Container",
                "children": [
                    { "type": "Navbar", "props": { "brand": "Acme", "items": ["Home", "Reports"] } },
                    { "type": "Typography", "props": { "variant": "h2", "children": "Overview" } },
                    { "type": "Grid", "props": { "columns": 2 }, "children": [
                        { "type": "Card", "props": { "title": "Revenue" }, "children": [
                            { "type": "Chart", "props": { "type": "bar", "data": [
                                { "label": "Q1", "value": 10 }, { "label": "Q2", "value": 25 }
                            ] } }
                        ] },
                        { "type": "Card", "props": { "title": "Orders" }, "children": [
                            { "type": "Table", "props": { "columns": ["Id", "Total"], "rows": [["1", "$20"]] } }
                        ] }
                    ] }
                ]
            }
        })
    }

    pub fn carousel() -> Value {
        json!({ "layout": { "type": "Carousel", "props": { "items": ["a", "b"] } } })
    }

    pub fn single_button(label: &str) -> Value {
        json!({ "layout": { "type": "Button", "props": { "children": label } } })
    }
}
