//! Debug rendering of a node tree as nested `<div>` elements.

use std::fmt::Write as _;

use sapling_core::{floats_equal, Dimension, Edge, Edges, LogLevel, PrintOptions, Value};

use crate::engine::LayoutEngine;
use crate::error::Result;
use crate::node::NodeId;
use crate::style::Style;

/// Format like C's `%g`: six significant digits, trailing zeros dropped.
pub(crate) fn format_number(value: f32) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{value:.5e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..6).contains(&exponent) {
        let decimals = (5 - exponent).max(0) as usize;
        let fixed = format!("{value:.decimals$}");
        trim_fraction(&fixed).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn write_value(out: &mut String, name: &str, value: Value) {
    match value {
        Value::Undefined => {}
        Value::Auto => {
            let _ = write!(out, "{name}: auto; ");
        }
        Value::Point(v) => {
            let _ = write!(out, "{name}: {}px; ", format_number(v));
        }
        Value::Percent(v) => {
            let _ = write!(out, "{name}: {}%; ", format_number(v));
        }
    }
}

fn write_value_if_not_auto(out: &mut String, name: &str, value: Value) {
    if !value.is_auto() {
        write_value(out, name, value);
    }
}

fn write_factor(out: &mut String, name: &str, value: f32) {
    if !value.is_nan() {
        let _ = write!(out, "{name}: {}; ", format_number(value));
    }
}

fn write_value_if_not_zero(out: &mut String, name: &str, value: Value) {
    if !floats_equal(value.value(), 0.0) {
        write_value(out, name, value);
    }
}

fn write_edges(out: &mut String, name: &str, edges: &Edges) {
    let first = edges.get(Edge::Left);
    let four_equal = [Edge::Top, Edge::Right, Edge::Bottom]
        .into_iter()
        .all(|edge| first.approx_eq(edges.get(edge)));
    if four_equal {
        write_value_if_not_zero(out, name, first);
    } else {
        for (edge, value) in edges.iter() {
            write_value_if_not_zero(out, &format!("{name}-{edge}"), value);
        }
    }
}

fn write_style(out: &mut String, style: &Style, has_measure: bool) {
    let defaults = Style::default();
    out.push_str("style=\"");
    if style.flex_direction != defaults.flex_direction {
        let _ = write!(out, "flex-direction: {}; ", style.flex_direction);
    }
    if style.justify_content != defaults.justify_content {
        let _ = write!(out, "justify-content: {}; ", style.justify_content);
    }
    if style.align_items != defaults.align_items {
        let _ = write!(out, "align-items: {}; ", style.align_items);
    }
    if style.align_content != defaults.align_content {
        let _ = write!(out, "align-content: {}; ", style.align_content);
    }
    if style.align_self != defaults.align_self {
        let _ = write!(out, "align-self: {}; ", style.align_self);
    }

    write_factor(out, "flex-grow", style.flex_grow);
    write_factor(out, "flex-shrink", style.flex_shrink);
    write_value_if_not_auto(out, "flex-basis", style.flex_basis);
    write_factor(out, "flex", style.flex);

    if style.flex_wrap != defaults.flex_wrap {
        let _ = write!(out, "flexWrap: {}; ", style.flex_wrap);
    }
    if style.overflow != defaults.overflow {
        let _ = write!(out, "overflow: {}; ", style.overflow);
    }
    if style.display != defaults.display {
        let _ = write!(out, "display: {}; ", style.display);
    }

    write_edges(out, "margin", &style.margin);
    write_edges(out, "padding", &style.padding);
    write_edges(out, "border", &style.border);

    write_value_if_not_auto(out, "width", style.dimension(Dimension::Width));
    write_value_if_not_auto(out, "height", style.dimension(Dimension::Height));
    write_value_if_not_auto(out, "max-width", style.max_dimension(Dimension::Width));
    write_value_if_not_auto(out, "max-height", style.max_dimension(Dimension::Height));
    write_value_if_not_auto(out, "min-width", style.min_dimension(Dimension::Width));
    write_value_if_not_auto(out, "min-height", style.min_dimension(Dimension::Height));

    if style.position_type != defaults.position_type {
        let _ = write!(out, "position: {}; ", style.position_type);
    }
    for (name, edge) in [
        ("left", Edge::Left),
        ("right", Edge::Right),
        ("top", Edge::Top),
        ("bottom", Edge::Bottom),
    ] {
        write_value(out, name, style.position.computed(edge, Value::Undefined));
    }
    out.push_str("\" ");

    if has_measure {
        out.push_str("has-custom-measure=\"true\"");
    }
}

impl LayoutEngine {
    /// Render the subtree at `id` as indented `<div>` markup.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`](crate::LayoutError::UnknownNode) for a
    /// stale handle.
    pub fn node_to_string(&self, id: NodeId, options: PrintOptions) -> Result<String> {
        self.node(id)?;
        let mut out = String::new();
        self.write_node(&mut out, id, options, 0);
        Ok(out)
    }

    /// Send [`node_to_string`](Self::node_to_string) to the node's logger at
    /// debug level.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`](crate::LayoutError::UnknownNode) for a
    /// stale handle.
    pub fn print_node(&self, id: NodeId, options: PrintOptions) -> Result<()> {
        let text = self.node_to_string(id, options)?;
        self.log(Some(id), LogLevel::Debug, &text);
        Ok(())
    }

    fn write_node(&self, out: &mut String, id: NodeId, options: PrintOptions, level: usize) {
        let node = &self.nodes[id];
        let indent = "  ".repeat(level);
        out.push_str(&indent);
        out.push_str("<div ");

        if let Some(print) = &node.print {
            out.push_str(&print(id));
        }

        if options.contains(PrintOptions::LAYOUT) {
            let layout = &node.layout;
            let _ = write!(
                out,
                "layout=\"width: {}; height: {}; top: {}; left: {};\" ",
                format_number(layout.dimensions[Dimension::Width.index()]),
                format_number(layout.dimensions[Dimension::Height.index()]),
                format_number(layout.position(Edge::Top)),
                format_number(layout.position(Edge::Left)),
            );
        }

        if options.contains(PrintOptions::STYLE) {
            write_style(out, &node.style, node.measure.is_some());
        }
        out.push('>');

        if options.contains(PrintOptions::CHILDREN) && !node.children.is_empty() {
            for child in node.children.iter() {
                out.push('\n');
                self.write_node(out, child, options, level + 1);
            }
            out.push('\n');
            out.push_str(&indent);
        }
        out.push_str("</div>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sapling_core::{Direction, FlexDirection, Size};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_print_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-3.25), "-3.25");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert_eq!(format_number(123_456.0), "123456");
        assert_eq!(format_number(1_234_567.0), "1.23457e+06");
        assert_eq!(format_number(0.000_01), "1e-05");
        assert_eq!(format_number(f32::NAN), "nan");
    }

    #[test]
    fn test_print_layout_only() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        engine.set_width(root, Value::Point(100.0)).unwrap();
        engine.set_height(root, Value::Point(50.0)).unwrap();
        engine
            .calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr)
            .unwrap();
        let text = engine.node_to_string(root, PrintOptions::LAYOUT).unwrap();
        assert_eq!(
            text,
            "<div layout=\"width: 100; height: 50; top: 0; left: 0;\" ></div>"
        );
    }

    #[test]
    fn test_print_style_lists_non_defaults() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        engine.set_flex_direction(root, FlexDirection::Row).unwrap();
        engine.set_flex_grow(root, 2.0).unwrap();
        engine.set_width(root, Value::Percent(50.0)).unwrap();
        for edge in [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom] {
            engine.set_margin(root, edge, Value::Point(4.0)).unwrap();
        }
        engine.set_padding(root, Edge::Left, Value::Point(2.0)).unwrap();
        engine.set_position(root, Edge::Start, Value::Point(3.0)).unwrap();
        engine.set_position(root, Edge::Top, Value::Point(1.0)).unwrap();
        let text = engine.node_to_string(root, PrintOptions::STYLE).unwrap();
        assert_eq!(
            text,
            "<div style=\"flex-direction: row; flex-grow: 2; margin: 4px; \
             padding-left: 2px; width: 50%; top: 1px; \" ></div>"
        );
    }

    #[test]
    fn test_print_children_indented() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let child = engine.new_node();
        engine.append_child(root, child).unwrap();
        engine
            .set_measure_func(child, Some(Rc::new(|_, _, _, _, _| Size::new(1.0, 1.0))))
            .unwrap();
        engine
            .set_print_func(child, Some(Rc::new(|_| "id=\"leaf\" ".to_string())))
            .unwrap();
        let text = engine
            .node_to_string(root, PrintOptions::STYLE | PrintOptions::CHILDREN)
            .unwrap();
        assert_eq!(
            text,
            "<div style=\"\" >\n  <div id=\"leaf\" style=\"\" has-custom-measure=\"true\"></div>\n</div>"
        );
    }

    #[test]
    fn test_print_tree_after_layout_goes_to_logger() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let config = Config::new()
            .with_print_tree(true)
            .with_logger(Rc::new(move |_, level, message: &str| {
                sink.borrow_mut().push((level, message.to_string()));
            }));
        let mut engine = LayoutEngine::with_config(config);
        let root = engine.new_node();
        engine
            .calculate_layout(root, 10.0, 10.0, Direction::Ltr)
            .unwrap();
        let lines = lines.borrow();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, LogLevel::Debug);
        assert!(lines[0].1.starts_with("<div layout=\"width: 10; height: 10;"));
    }

    #[test]
    fn test_print_unknown_node() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        engine.free_node(root).unwrap();
        assert!(engine.node_to_string(root, PrintOptions::LAYOUT).is_err());
    }
}
