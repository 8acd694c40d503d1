//!
//! Standard component library and render engine for Trellis
//!

pub mod components;
pub mod engine;
pub mod render;

pub use components::{library, standard_library, ComponentLibrary, ComponentProps, UiComponent};
pub use engine::{render, RenderEngine, RenderError, Rendered};
pub use render::RenderNode;
