use super::{ComponentProps, UiComponent};
use crate::render::RenderNode;

const MAX_GRID_COLUMNS: i64 = 4;

/// Bordered container with an optional title
#[derive(Debug, Default)]
pub struct Card;

impl UiComponent for Card {
    fn component_type(&self) -> &str {
        "Card"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let mut card = RenderNode::element("div").class("ui-card");
        if let Some(title) = props.non_empty("title") {
            card = card.child(RenderNode::element("h3").class("ui-card__title").child(RenderNode::text(title)));
        }
        card.child(RenderNode::element("div").class("ui-card__body").children(props.children()))
    }
}

/// Centered max-width wrapper
#[derive(Debug, Default)]
pub struct Container;

impl UiComponent for Container {
    fn component_type(&self) -> &str {
        "Container"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        RenderNode::element("div").class("ui-container").children(props.children())
    }
}

/// Flexbox row or column
#[derive(Debug, Default)]
pub struct Flex;

impl UiComponent for Flex {
    fn component_type(&self) -> &str {
        "Flex"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let mut classes = vec![
            "ui-flex".to_string(),
            format!("ui-flex--{}", props.string_or("direction", "row")),
            format!("ui-flex--gap-{}", props.string_or("gap", "md")),
            format!("ui-flex--align-{}", props.string_or("align", "stretch")),
            format!("ui-flex--justify-{}", props.string_or("justify", "start")),
        ];
        if props.flag_or("wrap", false) {
            classes.push("ui-flex--wrap".to_string());
        }
        RenderNode::element("div").class(classes.join(" ")).children(props.children())
    }
}

/// CSS grid; more than four columns renders as four
#[derive(Debug, Default)]
pub struct Grid;

impl Grid {
    fn column_class(props: &ComponentProps) -> String {
        match props.get("columns") {
            None => "ui-grid--cols-2".to_string(),
            Some(_) => match props.number("columns") {
                Some(n) if n > MAX_GRID_COLUMNS as f64 => format!("ui-grid--cols-{}", MAX_GRID_COLUMNS),
                Some(n) if n.fract() == 0.0 => format!("ui-grid--cols-{}", n as i64),
                _ => format!("ui-grid--cols-{}", props.string_or("columns", "2")),
            },
        }
    }
}

impl UiComponent for Grid {
    fn component_type(&self) -> &str {
        "Grid"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let class = format!(
            "ui-grid {} ui-grid--gap-{}",
            Self::column_class(props),
            props.string_or("gap", "md")
        );
        RenderNode::element("div").class(class).children(props.children())
    }
}

/// Dialog overlay; renders nothing when `isOpen` is false
#[derive(Debug, Default)]
pub struct Modal;

impl UiComponent for Modal {
    fn component_type(&self) -> &str {
        "Modal"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        if !props.flag_or("isOpen", true) {
            return RenderNode::empty();
        }
        let title = props.string("title").unwrap_or_default();
        RenderNode::element("div").class("ui-modal-overlay").child(
            RenderNode::element("div")
                .class("ui-modal")
                .child(RenderNode::element("h3").class("ui-modal__title").child(RenderNode::text(title)))
                .child(RenderNode::element("div").class("ui-modal__body").children(props.children())),
        )
    }
}
