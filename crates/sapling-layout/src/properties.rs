//! Per-property style accessors and resolved layout getters.
//!
//! Every setter marks the node dirty only when the stored value changes.

use sapling_core::{
    Align, Dimension, Direction, Display, Edge, Edges, FlexDirection, Justify, Overflow,
    PositionType, Value, Wrap,
};

use crate::engine::LayoutEngine;
use crate::error::{LayoutError, Result};
use crate::node::{Layout, LayoutState, NodeId};
use crate::style::Style;

/// Whether storing `new` over `old` is a change.
fn value_changed(old: Value, new: Value) -> bool {
    match (old, new) {
        (Value::Point(a), Value::Point(b)) | (Value::Percent(a), Value::Percent(b)) => a != b,
        _ => old.unit() != new.unit(),
    }
}

/// A size whose payload is NaN means `auto`.
fn auto_if_nan(value: Value) -> Value {
    match value {
        Value::Point(v) | Value::Percent(v) if v.is_nan() => Value::Auto,
        other => other,
    }
}

/// An edge or bound whose payload is NaN means unset.
fn undefined_if_nan(value: Value) -> Value {
    match value {
        Value::Point(v) | Value::Percent(v) if v.is_nan() => Value::Undefined,
        other => other,
    }
}

macro_rules! enum_properties {
    ($($(#[$doc:meta])* $field:ident, $setter:ident: $ty:ty;)*) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// [`LayoutError::UnknownNode`] for a stale handle.
            pub fn $setter(&mut self, id: NodeId, value: $ty) -> Result<()> {
                self.update_style(id, |style| {
                    if style.$field == value {
                        return false;
                    }
                    style.$field = value;
                    true
                })
            }

            /// # Errors
            ///
            /// [`LayoutError::UnknownNode`] for a stale handle.
            pub fn $field(&self, id: NodeId) -> Result<$ty> {
                Ok(self.style(id)?.$field)
            }
        )*
    };
}

macro_rules! float_setters {
    ($($(#[$doc:meta])* $field:ident, $setter:ident;)*) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// [`LayoutError::UnknownNode`] for a stale handle.
            pub fn $setter(&mut self, id: NodeId, value: f32) -> Result<()> {
                self.update_style(id, |style| {
                    if style.$field == value {
                        return false;
                    }
                    style.$field = value;
                    true
                })
            }
        )*
    };
}

impl LayoutEngine {
    /// Apply `update` to the style, marking dirty if it reports a change.
    fn update_style(&mut self, id: NodeId, update: impl FnOnce(&mut Style) -> bool) -> Result<()> {
        if update(&mut self.node_mut(id)?.style) {
            self.mark_dirty_internal(id);
        }
        Ok(())
    }

    enum_properties! {
        /// Inline direction; `inherit` takes the parent's.
        direction, set_direction: Direction;
        /// Main axis.
        flex_direction, set_flex_direction: FlexDirection;
        justify_content, set_justify_content: Justify;
        align_content, set_align_content: Align;
        align_items, set_align_items: Align;
        /// Overrides the parent's `align_items` unless `auto`.
        align_self, set_align_self: Align;
        position_type, set_position_type: PositionType;
        flex_wrap, set_flex_wrap: Wrap;
        overflow, set_overflow: Overflow;
        /// `none` removes the node and its subtree from layout.
        display, set_display: Display;
    }

    float_setters! {
        /// `flex` shorthand: positive grows with a zero basis, negative
        /// shrinks.
        flex, set_flex;
        flex_grow, set_flex_grow;
        flex_shrink, set_flex_shrink;
        /// Width over height. NaN clears it.
        aspect_ratio, set_aspect_ratio;
    }

    /// Raw `flex` shorthand, NaN when unset.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn flex(&self, id: NodeId) -> Result<f32> {
        Ok(self.style(id)?.flex)
    }

    /// Grow factor, `0` when unset.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn flex_grow(&self, id: NodeId) -> Result<f32> {
        let grow = self.style(id)?.flex_grow;
        Ok(if grow.is_nan() { 0.0 } else { grow })
    }

    /// Shrink factor; when unset `1` under web defaults, `0` otherwise.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn flex_shrink(&self, id: NodeId) -> Result<f32> {
        let node = self.node(id)?;
        let shrink = node.style.flex_shrink;
        if !shrink.is_nan() {
            return Ok(shrink);
        }
        Ok(if self.config_of(node).use_web_defaults() {
            1.0
        } else {
            0.0
        })
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn aspect_ratio(&self, id: NodeId) -> Result<f32> {
        Ok(self.style(id)?.aspect_ratio)
    }

    /// Initial main size. A NaN payload means `auto`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_flex_basis(&mut self, id: NodeId, value: Value) -> Result<()> {
        let value = auto_if_nan(value);
        self.update_style(id, |style| {
            let changed = value_changed(style.flex_basis, value);
            if changed {
                style.flex_basis = value;
            }
            changed
        })
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn flex_basis(&self, id: NodeId) -> Result<Value> {
        Ok(self.style(id)?.flex_basis)
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    fn set_size(&mut self, id: NodeId, dimension: Dimension, value: Value) -> Result<()> {
        let value = auto_if_nan(value);
        self.update_style(id, |style| {
            let slot = style.dimension_mut(dimension);
            let changed = value_changed(*slot, value);
            if changed {
                *slot = value;
            }
            changed
        })
    }

    fn set_min_size(&mut self, id: NodeId, dimension: Dimension, value: Value) -> Result<()> {
        let value = undefined_if_nan(value);
        self.update_style(id, |style| {
            let slot = style.min_dimension_mut(dimension);
            let changed = value_changed(*slot, value);
            if changed {
                *slot = value;
            }
            changed
        })
    }

    fn set_max_size(&mut self, id: NodeId, dimension: Dimension, value: Value) -> Result<()> {
        let value = undefined_if_nan(value);
        self.update_style(id, |style| {
            let slot = style.max_dimension_mut(dimension);
            let changed = value_changed(*slot, value);
            if changed {
                *slot = value;
            }
            changed
        })
    }

    /// Preferred width. A NaN payload means `auto`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_width(&mut self, id: NodeId, value: Value) -> Result<()> {
        self.set_size(id, Dimension::Width, value)
    }

    /// Preferred height. A NaN payload means `auto`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_height(&mut self, id: NodeId, value: Value) -> Result<()> {
        self.set_size(id, Dimension::Height, value)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_min_width(&mut self, id: NodeId, value: Value) -> Result<()> {
        self.set_min_size(id, Dimension::Width, value)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_min_height(&mut self, id: NodeId, value: Value) -> Result<()> {
        self.set_min_size(id, Dimension::Height, value)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_max_width(&mut self, id: NodeId, value: Value) -> Result<()> {
        self.set_max_size(id, Dimension::Width, value)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_max_height(&mut self, id: NodeId, value: Value) -> Result<()> {
        self.set_max_size(id, Dimension::Height, value)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn width(&self, id: NodeId) -> Result<Value> {
        Ok(self.style(id)?.width)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn height(&self, id: NodeId) -> Result<Value> {
        Ok(self.style(id)?.height)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn min_width(&self, id: NodeId) -> Result<Value> {
        Ok(self.style(id)?.min_width)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn min_height(&self, id: NodeId) -> Result<Value> {
        Ok(self.style(id)?.min_height)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn max_width(&self, id: NodeId) -> Result<Value> {
        Ok(self.style(id)?.max_width)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn max_height(&self, id: NodeId) -> Result<Value> {
        Ok(self.style(id)?.max_height)
    }

    // =========================================================================
    // Edges
    // =========================================================================

    fn set_edge(
        &mut self,
        id: NodeId,
        select: fn(&mut Style) -> &mut Edges,
        edge: Edge,
        value: Value,
    ) -> Result<()> {
        self.update_style(id, |style| {
            let edges = select(style);
            if !value_changed(edges.get(edge), value) {
                return false;
            }
            edges.set(edge, value)
        })
    }

    /// Margin of `edge`. `auto` absorbs free space; a NaN payload unsets.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_margin(&mut self, id: NodeId, edge: Edge, value: Value) -> Result<()> {
        self.set_edge(id, |s| &mut s.margin, edge, undefined_if_nan(value))
    }

    /// Shorthand for `set_margin(id, edge, Value::Auto)`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_margin_auto(&mut self, id: NodeId, edge: Edge) -> Result<()> {
        self.set_margin(id, edge, Value::Auto)
    }

    /// Offset of `edge`. `auto` is not meaningful and unsets the edge.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_position(&mut self, id: NodeId, edge: Edge, value: Value) -> Result<()> {
        let value = match undefined_if_nan(value) {
            Value::Auto => Value::Undefined,
            other => other,
        };
        self.set_edge(id, |s| &mut s.position, edge, value)
    }

    /// Padding of `edge`. `auto` is not meaningful and unsets the edge.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_padding(&mut self, id: NodeId, edge: Edge, value: Value) -> Result<()> {
        let value = match undefined_if_nan(value) {
            Value::Auto => Value::Undefined,
            other => other,
        };
        self.set_edge(id, |s| &mut s.padding, edge, value)
    }

    /// Border width of `edge` in points. NaN unsets.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_border(&mut self, id: NodeId, edge: Edge, width: f32) -> Result<()> {
        let value = if width.is_nan() {
            Value::Undefined
        } else {
            Value::Point(width)
        };
        self.set_edge(id, |s| &mut s.border, edge, value)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn margin(&self, id: NodeId, edge: Edge) -> Result<Value> {
        Ok(self.style(id)?.margin.get(edge))
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn position(&self, id: NodeId, edge: Edge) -> Result<Value> {
        Ok(self.style(id)?.position.get(edge))
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn padding(&self, id: NodeId, edge: Edge) -> Result<Value> {
        Ok(self.style(id)?.padding.get(edge))
    }

    /// Border width stored for `edge`, NaN when unset.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn border(&self, id: NodeId, edge: Edge) -> Result<f32> {
        Ok(self.style(id)?.border.get(edge).value())
    }

    // =========================================================================
    // Layout results
    // =========================================================================

    /// Result of the last layout pass over this node.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn layout(&self, id: NodeId) -> Result<Layout> {
        let state = &self.node(id)?.layout;
        Ok(Layout {
            left: state.position(Edge::Left),
            top: state.position(Edge::Top),
            right: state.position(Edge::Right),
            bottom: state.position(Edge::Bottom),
            width: state.dimensions[Dimension::Width.index()],
            height: state.dimensions[Dimension::Height.index()],
            direction: state.direction,
            had_overflow: state.had_overflow,
        })
    }

    fn resolved_edge(
        &self,
        id: NodeId,
        edge: Edge,
        select: fn(&LayoutState) -> &[f32; 6],
    ) -> Result<f32> {
        let state = &self.node(id)?.layout;
        if edge.index() >= Edge::End.index() {
            return Err(self.fatal(Some(id), LayoutError::ShorthandEdge(edge)));
        }
        let rtl = state.direction == Direction::Rtl;
        let edge = match edge {
            Edge::Left if rtl => Edge::End,
            Edge::Left => Edge::Start,
            Edge::Right if rtl => Edge::Start,
            Edge::Right => Edge::End,
            other => other,
        };
        Ok(select(state)[edge.index()])
    }

    /// Resolved margin of a physical edge or `start`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ShorthandEdge`] for `end` and the shorthands.
    pub fn layout_margin(&self, id: NodeId, edge: Edge) -> Result<f32> {
        self.resolved_edge(id, edge, |state| &state.margin)
    }

    /// Resolved border of a physical edge or `start`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ShorthandEdge`] for `end` and the shorthands.
    pub fn layout_border(&self, id: NodeId, edge: Edge) -> Result<f32> {
        self.resolved_edge(id, edge, |state| &state.border)
    }

    /// Resolved padding of a physical edge or `start`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ShorthandEdge`] for `end` and the shorthands.
    pub fn layout_padding(&self, id: NodeId, edge: Edge) -> Result<f32> {
        self.resolved_edge(id, edge, |state| &state.padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn clean(engine: &mut LayoutEngine, id: NodeId) {
        engine.node_mut(id).unwrap().is_dirty = false;
    }

    #[test]
    fn test_properties_enum_round_trip() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        engine.set_flex_direction(node, FlexDirection::RowReverse).unwrap();
        engine.set_justify_content(node, Justify::SpaceAround).unwrap();
        engine.set_display(node, Display::None).unwrap();
        assert_eq!(engine.flex_direction(node).unwrap(), FlexDirection::RowReverse);
        assert_eq!(engine.justify_content(node).unwrap(), Justify::SpaceAround);
        assert_eq!(engine.display(node).unwrap(), Display::None);
        assert!(engine.is_dirty(node).unwrap());
    }

    #[test]
    fn test_properties_same_value_keeps_clean() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        engine.set_width(node, Value::Point(10.0)).unwrap();
        clean(&mut engine, node);

        engine.set_width(node, Value::Point(10.0)).unwrap();
        engine.set_align_items(node, Align::Stretch).unwrap();
        assert!(!engine.is_dirty(node).unwrap());

        engine.set_width(node, Value::Percent(10.0)).unwrap();
        assert!(engine.is_dirty(node).unwrap());
    }

    #[test]
    fn test_properties_nan_size_is_auto() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        engine.set_height(node, Value::Point(f32::NAN)).unwrap();
        assert_eq!(engine.height(node).unwrap(), Value::Auto);
        engine.set_flex_basis(node, Value::Percent(f32::NAN)).unwrap();
        assert_eq!(engine.flex_basis(node).unwrap(), Value::Auto);
        engine.set_max_width(node, Value::Point(f32::NAN)).unwrap();
        assert_eq!(engine.max_width(node).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_properties_flex_getter_defaults() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        assert_eq!(engine.flex_grow(node).unwrap(), 0.0);
        assert_eq!(engine.flex_shrink(node).unwrap(), 0.0);
        assert!(engine.flex(node).unwrap().is_nan());
        engine.set_flex_grow(node, 2.5).unwrap();
        assert_eq!(engine.flex_grow(node).unwrap(), 2.5);

        let web = engine.new_config(Config::new().with_web_defaults(true));
        let node = engine.new_node_with_config(web).unwrap();
        assert_eq!(engine.flex_shrink(node).unwrap(), 1.0);
    }

    #[test]
    fn test_properties_edges() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        engine.set_margin(node, Edge::Horizontal, Value::Point(4.0)).unwrap();
        engine.set_margin_auto(node, Edge::Top).unwrap();
        engine.set_padding(node, Edge::All, Value::Auto).unwrap();
        engine.set_border(node, Edge::Bottom, 2.0).unwrap();
        engine.set_position(node, Edge::Left, Value::Percent(50.0)).unwrap();

        assert_eq!(engine.margin(node, Edge::Horizontal).unwrap(), Value::Point(4.0));
        assert_eq!(engine.margin(node, Edge::Top).unwrap(), Value::Auto);
        assert_eq!(engine.padding(node, Edge::All).unwrap(), Value::Undefined);
        assert_eq!(engine.border(node, Edge::Bottom).unwrap(), 2.0);
        assert!(engine.border(node, Edge::Top).unwrap().is_nan());
        assert_eq!(engine.position(node, Edge::Left).unwrap(), Value::Percent(50.0));
    }

    #[test]
    fn test_properties_border_unchanged_stays_clean() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        engine.set_border(node, Edge::All, 1.0).unwrap();
        clean(&mut engine, node);
        engine.set_border(node, Edge::All, 1.0).unwrap();
        assert!(!engine.is_dirty(node).unwrap());
    }

    #[test]
    fn test_properties_resolved_edge_rejects_shorthands() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        for edge in [Edge::End, Edge::Horizontal, Edge::Vertical, Edge::All] {
            assert_eq!(
                engine.layout_margin(node, edge).unwrap_err(),
                LayoutError::ShorthandEdge(edge)
            );
        }
        assert_eq!(engine.layout_padding(node, Edge::Start).unwrap(), 0.0);
    }

    #[test]
    fn test_properties_resolved_left_follows_direction() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        {
            let state = &mut engine.node_mut(node).unwrap().layout;
            state.margin[Edge::Start.index()] = 3.0;
            state.margin[Edge::End.index()] = 7.0;
            state.direction = Direction::Ltr;
        }
        assert_eq!(engine.layout_margin(node, Edge::Left).unwrap(), 3.0);
        assert_eq!(engine.layout_margin(node, Edge::Right).unwrap(), 7.0);
        engine.node_mut(node).unwrap().layout.direction = Direction::Rtl;
        assert_eq!(engine.layout_margin(node, Edge::Left).unwrap(), 7.0);
        assert_eq!(engine.layout_margin(node, Edge::Right).unwrap(), 3.0);
    }

    #[test]
    fn test_properties_layout_before_any_pass() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        let layout = engine.layout(node).unwrap();
        assert_eq!(layout.left, 0.0);
        assert!(layout.width.is_nan());
        assert!(!layout.had_overflow);
    }
}
