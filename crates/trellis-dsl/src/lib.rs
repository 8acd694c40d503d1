//! # Trellis DSL
//!
//! The plan language of Trellis. A plan is a JSON tree of component
//! instances under a single `layout` root; this crate defines the closed
//! component whitelist plans may use, parses and validates candidate plans,
//! and compiles validated plans into UI-program text.
//!
//! ## Features
//!
//! * Fixed component whitelist with per-prop contracts
//! * Lenient parsing that keeps malformed nodes so they can be reported
//! * Exhaustive validation with stable error codes and node paths
//! * Deterministic, injection-safe plan-to-code compilation
//!
//! ## Example
//!
//! ```
//! use trellis_dsl::{compile, parse_and_validate_plan};
//!
//! let text = "```json\n{\"layout\": {\"type\": \"Button\", \"props\": {\"children\": \"Save\"}}}\n```";
//!
//! let plan = parse_and_validate_plan(text).unwrap();
//! let artifact = compile(Some(&plan));
//! assert_eq!(artifact.used_components, vec!["Button"]);
//! assert!(artifact.code.contains("<Button>Save</Button>"));
//! ```

mod error;
mod parser;

pub mod compiler;
pub mod plan;
pub mod registry;
pub mod validation;

pub use compiler::{compile, CompiledArtifact, PlanCompiler, ENTRY_POINT};
pub use error::DslError;
pub use parser::{parse_plan, strip_code_fences};
pub use plan::{ElementNode, Plan, PlanNode};
pub use registry::{whitelist, ComponentRegistry, ComponentSpec, PropKind, PropSpec};
pub use validation::{validate_plan, PlanValidator, ValidationError};

/// Parse and validate planner output against the standard whitelist.
///
/// This function performs both steps the pipeline needs before compiling:
/// 1. Strips code fences and parses the JSON into a candidate plan
/// 2. Validates the tree structure and component names
///
/// # Errors
///
/// Returns `DslError::JsonError` for unparseable text, or the validation
/// errors for a plan that violates the whitelist.
pub fn parse_and_validate_plan(text: &str) -> Result<Plan, DslError> {
    let plan = parse_plan(text)?;
    PlanValidator::new(whitelist()).check(&plan)?;
    Ok(plan)
}

/// Returns the version of the trellis-dsl crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
