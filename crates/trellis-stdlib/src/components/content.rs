use serde_json::Value;

use super::{display_value, ComponentProps, UiComponent};
use crate::render::RenderNode;

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4"];
const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400";

/// Clickable button; `onClick` is descriptive only and never rendered
#[derive(Debug, Default)]
pub struct Button;

impl UiComponent for Button {
    fn component_type(&self) -> &str {
        "Button"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let class = format!(
            "ui-btn ui-btn--{} ui-btn--{}",
            props.string_or("variant", "primary"),
            props.string_or("size", "md")
        );
        RenderNode::element("button")
            .class(class)
            .flag("disabled", props.flag_or("disabled", false))
            .children(props.children())
    }
}

#[derive(Debug, Default)]
pub struct Input;

impl UiComponent for Input {
    fn component_type(&self) -> &str {
        "Input"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let mut group = RenderNode::element("div").class("ui-input-group");
        if let Some(label) = props.non_empty("label") {
            group = group.child(
                RenderNode::element("label")
                    .class("ui-input-group__label")
                    .child(RenderNode::text(label)),
            );
        }

        let mut input = RenderNode::element("input")
            .class("ui-input")
            .attr("type", props.string_or("type", "text"))
            .flag("disabled", props.flag_or("disabled", false));
        if let Some(placeholder) = props.string("placeholder") {
            input = input.attr("placeholder", placeholder);
        }
        group.child(input)
    }
}

/// Data table; rows that are not arrays render as empty rows
#[derive(Debug, Default)]
pub struct Table;

impl UiComponent for Table {
    fn component_type(&self) -> &str {
        "Table"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let header = RenderNode::element("tr").children(
            props
                .array("columns")
                .iter()
                .map(|col| RenderNode::element("th").child(RenderNode::text(display_value(col)))),
        );

        let rows = props.array("rows").iter().map(|row| {
            let cells = match row {
                Value::Array(cells) => cells.as_slice(),
                _ => &[][..],
            };
            RenderNode::element("tr").children(
                cells
                    .iter()
                    .map(|cell| RenderNode::element("td").child(RenderNode::text(display_value(cell)))),
            )
        });

        RenderNode::element("div").class("ui-table-wrapper").child(
            RenderNode::element("table")
                .class("ui-table")
                .child(RenderNode::element("thead").child(header))
                .child(RenderNode::element("tbody").children(rows)),
        )
    }
}

/// Headings h1 through h4; every other variant renders as a paragraph
#[derive(Debug, Default)]
pub struct Typography;

impl UiComponent for Typography {
    fn component_type(&self) -> &str {
        "Typography"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let variant = props.string_or("variant", "body");
        let tag = if HEADING_TAGS.contains(&variant.as_str()) {
            variant.as_str()
        } else {
            "p"
        };
        RenderNode::element(tag)
            .class(format!("ui-typo ui-typo--{}", variant))
            .children(props.children())
    }
}

#[derive(Debug, Default)]
pub struct Image;

impl UiComponent for Image {
    fn component_type(&self) -> &str {
        "Image"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let style = format!(
            "width: {}; height: {}; display: flex; justify-content: center; align-items: center; overflow: hidden; border-radius: 8px",
            props.string_or("width", "100%"),
            props.string_or("height", "auto")
        );
        RenderNode::element("div").class("ui-image-container").style(style).child(
            RenderNode::element("img")
                .attr("src", props.string_or("src", PLACEHOLDER_IMAGE))
                .attr("alt", props.string("alt").unwrap_or_default())
                .style("width: 100%; height: 100%; object-fit: cover"),
        )
    }
}

/// Notification banner with an icon matching its type
#[derive(Debug, Default)]
pub struct Alert;

impl Alert {
    fn icon(kind: &str) -> &'static str {
        match kind {
            "success" => "check-circle",
            "warning" => "alert-triangle",
            "error" => "x-circle",
            _ => "info",
        }
    }
}

impl UiComponent for Alert {
    fn component_type(&self) -> &str {
        "Alert"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let kind = props.string_or("type", "info");
        RenderNode::element("div")
            .class(format!("ui-alert ui-alert--{}", kind))
            .child(icon(Self::icon(&kind)))
            .child(RenderNode::element("span").child(RenderNode::text(props.string("message").unwrap_or_default())))
    }
}

/// Inline icon placeholder
pub(crate) fn icon(name: &str) -> RenderNode {
    RenderNode::element("span")
        .class(format!("ui-icon ui-icon--{}", name))
        .attr("aria-hidden", "true")
}
