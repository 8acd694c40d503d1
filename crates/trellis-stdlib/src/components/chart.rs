use serde_json::Value;

use super::{ComponentProps, UiComponent};
use crate::render::RenderNode;

const CHART_COLORS: &[&str] = &["#4f46e5", "#06b6d4", "#f59e0b", "#ef4444", "#10b981", "#8b5cf6"];
const MIN_BAR_PERCENT: f64 = 4.0;
const LINE_HEIGHT: f64 = 120.0;
const LINE_STEP: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
struct DataPoint {
    label: String,
    value: f64,
}

/// Mocked bar, line or pie chart drawn with plain elements
#[derive(Debug, Default)]
pub struct Chart;

impl Chart {
    /// Missing labels become "Unknown" and non-numeric values become zero
    fn clean_data(props: &ComponentProps) -> Vec<DataPoint> {
        props
            .array("data")
            .iter()
            .map(|entry| {
                let label = match entry.get("label") {
                    Some(Value::String(s)) if !s.is_empty() => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => "Unknown".to_string(),
                };
                let value = entry.get("value").and_then(Value::as_f64).unwrap_or(0.0);
                DataPoint { label, value }
            })
            .collect()
    }

    fn bars(data: &[DataPoint], max: f64) -> RenderNode {
        RenderNode::element("div")
            .class("ui-chart__bars")
            .children(data.iter().enumerate().map(|(i, point)| {
                let height = (point.value / max * 100.0).max(MIN_BAR_PERCENT);
                RenderNode::element("div")
                    .class("ui-chart__bar")
                    .style(format!("height: {}%; background: {}", height, color(i)))
                    .child(
                        RenderNode::element("span")
                            .class("ui-chart__bar-label")
                            .child(RenderNode::text(point.label.clone())),
                    )
            }))
    }

    fn line(data: &[DataPoint], max: f64) -> RenderNode {
        let coordinates: Vec<(f64, f64)> = data
            .iter()
            .enumerate()
            .map(|(i, point)| (i as f64 * LINE_STEP + 30.0, LINE_HEIGHT - point.value / max * 100.0))
            .collect();
        let points = coordinates
            .iter()
            .map(|(x, y)| format!("{},{}", x, y))
            .collect::<Vec<_>>()
            .join(" ");

        let svg = RenderNode::element("svg")
            .attr("width", "100%")
            .attr("height", "120")
            .style("overflow: visible")
            .child(
                RenderNode::element("polyline")
                    .attr("points", points)
                    .attr("fill", "none")
                    .attr("stroke", CHART_COLORS[0])
                    .attr("stroke-width", "2"),
            )
            .children(coordinates.iter().map(|(x, y)| {
                RenderNode::element("circle")
                    .attr("cx", x.to_string())
                    .attr("cy", y.to_string())
                    .attr("r", "4")
                    .attr("fill", CHART_COLORS[0])
            }));

        let labels = RenderNode::element("div")
            .style("display: flex; justify-content: flex-start; gap: 45px; padding-left: 15px; overflow-x: auto")
            .children(data.iter().map(|point| {
                RenderNode::element("span")
                    .style("font-size: 11px; color: #6b7280; min-width: 30px; text-align: center")
                    .child(RenderNode::text(point.label.clone()))
            }));

        RenderNode::element("div")
            .class("ui-chart__line-container")
            .child(svg)
            .child(labels)
    }

    fn pie(data: &[DataPoint]) -> RenderNode {
        let sum: f64 = data.iter().map(|p| p.value).sum();
        let total = if sum == 0.0 { 1.0 } else { sum };

        let mut start = 0.0;
        let mut stops = Vec::with_capacity(data.len());
        for (i, point) in data.iter().enumerate() {
            let end = start + point.value / total * 100.0;
            stops.push(format!("{} {}% {}%", color(i), start, end));
            start = end;
        }

        let legend = RenderNode::element("div")
            .class("ui-chart__pie-legend")
            .children(data.iter().enumerate().map(|(i, point)| {
                RenderNode::element("div")
                    .class("ui-chart__pie-legend-item")
                    .child(
                        RenderNode::element("span")
                            .class("ui-chart__pie-legend-dot")
                            .style(format!("background: {}", color(i))),
                    )
                    .child(RenderNode::text(format!("{}: {}", point.label, point.value)))
            }));

        RenderNode::element("div")
            .class("ui-chart__pie")
            .child(
                RenderNode::element("div")
                    .class("ui-chart__pie-visual")
                    .style(format!("background: conic-gradient({})", stops.join(", "))),
            )
            .child(legend)
    }
}

fn color(index: usize) -> &'static str {
    CHART_COLORS[index % CHART_COLORS.len()]
}

impl UiComponent for Chart {
    fn component_type(&self) -> &str {
        "Chart"
    }

    fn render(&self, props: &ComponentProps) -> RenderNode {
        let mut chart = RenderNode::element("div").class("ui-chart");
        if let Some(title) = props.non_empty("title") {
            chart = chart.child(RenderNode::element("h4").class("ui-chart__title").child(RenderNode::text(title)));
        }

        let data = Self::clean_data(props);
        if data.is_empty() {
            return chart.child(
                RenderNode::element("div")
                    .style("padding: 20px; text-align: center; color: #6b7280; background: #f9fafb; border-radius: 8px")
                    .child(RenderNode::text("No chart data available")),
            );
        }

        let max = data.iter().map(|p| p.value).fold(1.0, f64::max);
        let body = match props.string_or("type", "bar").as_str() {
            "bar" => Self::bars(&data, max),
            "line" => Self::line(&data, max),
            "pie" => Self::pie(&data),
            _ => RenderNode::empty(),
        };
        chart.child(body)
    }
}
