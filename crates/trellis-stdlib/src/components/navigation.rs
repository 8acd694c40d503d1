use serde_json::Value;

use super::content::icon;
use super::{display_value, ComponentProps, UiComponent};
use crate::render::RenderNode;

/// Horizontal top bar with a brand and link labels
#[derive(Debug, Default)]
pub struct Navbar;

impl UiComponent for Navbar {
    fn component_type(&self) -> &str {
        "Navbar"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let links = props.array("items").iter().map(|item| {
            RenderNode::element("li")
                .class("ui-navbar__link")
                .child(RenderNode::text(display_value(item)))
        });

        RenderNode::element("nav")
            .class("ui-navbar")
            .child(
                RenderNode::element("div")
                    .class("ui-navbar__brand")
                    .child(RenderNode::text(props.string("brand").unwrap_or_default())),
            )
            .child(RenderNode::element("ul").class("ui-navbar__links").children(links))
    }
}

/// Vertical navigation panel; the item whose label equals `activeItem` is highlighted
#[derive(Debug, Default)]
pub struct Sidebar;

impl Sidebar {
    fn icon_for(name: &str) -> Option<&'static str> {
        let icon = match name {
            "Home" => "home",
            "Settings" => "settings",
            "User" | "Profile" => "user",
            "Chart" => "bar-chart",
            "Analytics" => "pie-chart",
            "Docs" => "file-text",
            "Billing" => "credit-card",
            "Users" => "users",
            "Dashboard" => "layout",
            _ => return None,
        };
        Some(icon)
    }

    fn item(item: &Value, active: Option<&str>) -> RenderNode {
        let (label, icon_name) = match item {
            Value::Object(fields) => (
                fields.get("label").map(display_value).unwrap_or_default(),
                fields.get("icon").map(display_value),
            ),
            other => (display_value(other), None),
        };

        let glyph = Self::icon_for(&label)
            .or_else(|| icon_name.as_deref().and_then(Self::icon_for))
            .unwrap_or("layout");

        let class = if active == Some(label.as_str()) {
            "ui-sidebar__item ui-sidebar__item--active"
        } else {
            "ui-sidebar__item"
        };

        RenderNode::element("div")
            .class(class)
            .style("display: flex; align-items: center; gap: 10px")
            .child(icon(glyph))
            .child(RenderNode::element("span").child(RenderNode::text(label)))
    }
}

impl UiComponent for Sidebar {
    fn component_type(&self) -> &str {
        "Sidebar"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let active = props.string("activeItem");
        RenderNode::element("nav")
            .class("ui-sidebar")
            .children(props.array("items").iter().map(|item| Self::item(item, active.as_deref())))
    }
}
