//! Layout entry point, per-node memoization and pixel-grid rounding.

use sapling_core::{
    has_fractional_pixels, round_value_to_pixel_grid, Dimension, Direction, Edge, FlexDirection,
    MeasureMode, NodeType, PrintOptions,
};
use tracing::{debug, trace};

use crate::cache::{can_use_cached_measurement, CacheSlot, CachedMeasurement, MeasureRequest};
use crate::engine::LayoutEngine;
use crate::error::Result;
use crate::node::{Node, NodeId};

/// Arguments of one visit of the layout routine.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutInput {
    pub available_width: f32,
    pub available_height: f32,
    pub parent_direction: Direction,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub parent_width: f32,
    pub parent_height: f32,
    /// Position children as well as sizing the node.
    pub perform_layout: bool,
}

fn mode_name(mode: MeasureMode, perform_layout: bool) -> &'static str {
    match (mode, perform_layout) {
        (MeasureMode::Undefined, false) => "UNDEFINED",
        (MeasureMode::Exactly, false) => "EXACTLY",
        (MeasureMode::AtMost, false) => "AT_MOST",
        (MeasureMode::Undefined, true) => "LAY_UNDEFINED",
        (MeasureMode::Exactly, true) => "LAY_EXACTLY",
        (MeasureMode::AtMost, true) => "LAY_AT_MOST",
    }
}

/// Available size and mode for one axis of the root.
fn root_constraint(
    node: &Node,
    axis: FlexDirection,
    parent_size: f32,
    parent_width: f32,
) -> (f32, MeasureMode) {
    let dimension = axis.dimension();
    if node.is_style_dim_defined(axis, parent_size) {
        let size = node.resolved_dimension(dimension).resolve(parent_size)
            + node.margin_for_axis(axis, parent_width);
        return (size, MeasureMode::Exactly);
    }
    let max = node.style.max_dimension(dimension).resolve(parent_size);
    if max >= 0.0 {
        (max, MeasureMode::AtMost)
    } else if parent_size.is_nan() {
        (parent_size, MeasureMode::Undefined)
    } else {
        (parent_size, MeasureMode::Exactly)
    }
}

impl LayoutEngine {
    /// Compute the layout of the tree rooted at `root`.
    ///
    /// `parent_width` and `parent_height` may be NaN for an unconstrained
    /// axis. Results are read back with [`layout`](Self::layout).
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`](crate::LayoutError::UnknownNode) for a
    /// stale handle, or an
    /// [`InvalidCallbackResult`](crate::ErrorKind::InvalidCallbackResult)
    /// error when a measure or baseline function returns NaN. Nodes left
    /// unfinished by a failed pass stay dirty.
    pub fn calculate_layout(
        &mut self,
        root: NodeId,
        parent_width: f32,
        parent_height: f32,
        parent_direction: Direction,
    ) -> Result<()> {
        self.node_mut(root)?.resolve_dimensions();
        self.generation = self.generation.wrapping_add(1);
        self.depth = 0;

        let node = &self.nodes[root];
        let (width, width_mode) =
            root_constraint(node, FlexDirection::Row, parent_width, parent_width);
        let (height, height_mode) =
            root_constraint(node, FlexDirection::Column, parent_height, parent_width);
        let config = self.config_of(node);
        let scale = config.point_scale_factor();
        let print_tree = config.print_tree();
        self.point_scale_factor = scale;

        let input = LayoutInput {
            available_width: width,
            available_height: height,
            parent_direction,
            width_mode,
            height_mode,
            parent_width,
            parent_height,
            perform_layout: true,
        };
        if self.layout_node_internal(root, input, "initial")? {
            self.stats.layouts += 1;
            let direction = self.nodes[root].layout.direction;
            self.place_node(root, direction, parent_width, parent_height, parent_width);
            self.round_to_pixel_grid(root, scale, 0.0, 0.0);
            if print_tree {
                self.print_node(
                    root,
                    PrintOptions::LAYOUT | PrintOptions::CHILDREN | PrintOptions::STYLE,
                )?;
            }
        }
        Ok(())
    }

    /// Run the layout routine on `id` unless a cached result answers the
    /// request. Returns whether the node was visited.
    pub(crate) fn layout_node_internal(
        &mut self,
        id: NodeId,
        input: LayoutInput,
        reason: &'static str,
    ) -> Result<bool> {
        self.depth += 1;
        let visited = self.visit_node(id, input, reason);
        self.depth -= 1;
        visited
    }

    fn visit_node(&mut self, id: NodeId, input: LayoutInput, reason: &'static str) -> Result<bool> {
        let generation = self.generation;
        let node = &mut self.nodes[id];
        let need_to_visit = (node.is_dirty && node.layout.generation_count != generation)
            || node.layout.last_parent_direction != Some(input.parent_direction);
        if need_to_visit {
            node.layout.cache.invalidate();
        }

        let cached = self.find_cached(&self.nodes[id], &input);

        match cached {
            Some(slot) if !need_to_visit => {
                let layout = &mut self.nodes[id].layout;
                let entry = *layout.cache.get(slot);
                layout.measured_dimensions = [entry.computed_width, entry.computed_height];
                self.stats.cache_hits += 1;
                trace!(
                    depth = self.depth,
                    node = ?id,
                    reason,
                    width_mode = mode_name(input.width_mode, input.perform_layout),
                    height_mode = mode_name(input.height_mode, input.perform_layout),
                    available_width = input.available_width,
                    available_height = input.available_height,
                    width = entry.computed_width,
                    height = entry.computed_height,
                    "skipped"
                );
            }
            _ => {
                self.stats.cache_misses += 1;
                trace!(
                    depth = self.depth,
                    node = ?id,
                    reason,
                    width_mode = mode_name(input.width_mode, input.perform_layout),
                    height_mode = mode_name(input.height_mode, input.perform_layout),
                    available_width = input.available_width,
                    available_height = input.available_height,
                    "layout"
                );

                self.layout_impl(id, input)?;

                let layout = &mut self.nodes[id].layout;
                trace!(
                    depth = self.depth,
                    node = ?id,
                    reason,
                    width = layout.measured(Dimension::Width),
                    height = layout.measured(Dimension::Height),
                    "laid out"
                );
                layout.last_parent_direction = Some(input.parent_direction);

                if cached.is_none() {
                    let entry = CachedMeasurement::new(
                        input.available_width,
                        input.available_height,
                        input.width_mode,
                        input.height_mode,
                        layout.measured(Dimension::Width),
                        layout.measured(Dimension::Height),
                    );
                    if layout.cache.record(input.perform_layout, entry) {
                        debug!(node = ?id, "measurement cache wrapped");
                    }
                }
            }
        }

        let node = &mut self.nodes[id];
        if input.perform_layout {
            node.layout.dimensions = node.layout.measured_dimensions;
            node.has_new_layout = true;
            node.is_dirty = false;
        }
        node.layout.generation_count = generation;
        Ok(need_to_visit || cached.is_none())
    }

    fn find_cached(&self, node: &Node, input: &LayoutInput) -> Option<CacheSlot> {
        let cache = &node.layout.cache;
        if node.measure.is_some() {
            let request = MeasureRequest {
                width: input.available_width,
                width_mode: input.width_mode,
                height: input.available_height,
                height_mode: input.height_mode,
                margin_row: node.margin_for_axis(FlexDirection::Row, input.parent_width),
                margin_column: node.margin_for_axis(FlexDirection::Column, input.parent_width),
            };
            if can_use_cached_measurement(&request, cache.layout(), self.point_scale_factor) {
                return Some(CacheSlot::Layout);
            }
            return cache
                .measurements()
                .iter()
                .position(|entry| {
                    can_use_cached_measurement(&request, entry, self.point_scale_factor)
                })
                .map(CacheSlot::Measurement);
        }

        let matches = |entry: &CachedMeasurement| {
            entry.matches_exactly(
                input.available_width,
                input.available_height,
                input.width_mode,
                input.height_mode,
            )
        };
        if input.perform_layout {
            matches(cache.layout()).then_some(CacheSlot::Layout)
        } else {
            cache
                .measurements()
                .iter()
                .position(matches)
                .map(CacheSlot::Measurement)
        }
    }

    /// Write the margin and relative offsets of `id` into its position.
    pub(crate) fn place_node(
        &mut self,
        id: NodeId,
        direction: Direction,
        main_size: f32,
        cross_size: f32,
        parent_width: f32,
    ) {
        let node = &mut self.nodes[id];
        // Roots are always placed left to right.
        let direction = if node.parent.is_some() {
            direction
        } else {
            Direction::Ltr
        };
        let main_axis = node.style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);
        let relative_main = node.relative_position(main_axis, main_size);
        let relative_cross = node.relative_position(cross_axis, cross_size);

        let leading_main = node.leading_margin(main_axis, parent_width) + relative_main;
        let trailing_main = node.trailing_margin(main_axis, parent_width) + relative_main;
        let leading_cross = node.leading_margin(cross_axis, parent_width) + relative_cross;
        let trailing_cross = node.trailing_margin(cross_axis, parent_width) + relative_cross;

        let layout = &mut node.layout;
        layout.set_position(main_axis.leading_edge(), leading_main);
        layout.set_position(main_axis.trailing_edge(), trailing_main);
        layout.set_position(cross_axis.leading_edge(), leading_cross);
        layout.set_position(cross_axis.trailing_edge(), trailing_cross);
    }

    /// Mirror the leading offset of `child` onto its trailing edge.
    pub(crate) fn set_child_trailing_position(
        &mut self,
        parent: NodeId,
        child: NodeId,
        axis: FlexDirection,
    ) {
        let dimension = axis.dimension();
        let parent_size = self.nodes[parent].layout.measured(dimension);
        let layout = &mut self.nodes[child].layout;
        let size = layout.measured(dimension);
        let leading = layout.position(axis.leading_edge());
        layout.set_position(axis.trailing_edge(), parent_size - size - leading);
    }

    /// Snap positions and sizes to the pixel grid, using absolute edges so
    /// adjacent boxes stay adjacent.
    fn round_to_pixel_grid(
        &mut self,
        id: NodeId,
        scale: f32,
        absolute_left: f32,
        absolute_top: f32,
    ) {
        if scale == 0.0 {
            return;
        }

        let node = &mut self.nodes[id];
        let text = node.node_type == NodeType::Text;
        let layout = &mut node.layout;

        let node_left = layout.position(Edge::Left);
        let node_top = layout.position(Edge::Top);
        let node_width = layout.dimensions[Dimension::Width.index()];
        let node_height = layout.dimensions[Dimension::Height.index()];

        let absolute_node_left = absolute_left + node_left;
        let absolute_node_top = absolute_top + node_top;
        let absolute_node_right = absolute_node_left + node_width;
        let absolute_node_bottom = absolute_node_top + node_height;

        // Text must never shrink below its measured size.
        layout.set_position(
            Edge::Left,
            round_value_to_pixel_grid(node_left, scale, false, text),
        );
        layout.set_position(
            Edge::Top,
            round_value_to_pixel_grid(node_top, scale, false, text),
        );

        let fractional_width = has_fractional_pixels(node_width, scale);
        let fractional_height = has_fractional_pixels(node_height, scale);

        layout.dimensions[Dimension::Width.index()] = round_value_to_pixel_grid(
            absolute_node_right,
            scale,
            text && fractional_width,
            text && !fractional_width,
        ) - round_value_to_pixel_grid(absolute_node_left, scale, false, text);
        layout.dimensions[Dimension::Height.index()] = round_value_to_pixel_grid(
            absolute_node_bottom,
            scale,
            text && fractional_height,
            text && !fractional_height,
        ) - round_value_to_pixel_grid(absolute_node_top, scale, false, text);

        let children: Vec<NodeId> = node.children.iter().collect();
        for child in children {
            self.round_to_pixel_grid(child, scale, absolute_node_left, absolute_node_top);
        }
    }
}
