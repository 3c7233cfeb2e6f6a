//! Flexbox layout of a single container.
//!
//! One visit sizes a node and, when asked to, positions its children:
//!
//! 1. Leaves with a measure function, empty containers and fixed-size
//!    requests are answered without looking at children.
//! 2. Each child gets a flex basis, measuring it when the basis is not
//!    definite.
//! 3. Children are broken into lines and flexible lengths are resolved per
//!    line in two passes: clamped items are frozen first, then the rest of
//!    the free space is shared out.
//! 4. Items are placed along the main axis (`justify-content`, auto
//!    margins) and aligned on the cross axis (`align-items`, stretch).
//! 5. Multi-line and baseline containers distribute lines
//!    (`align-content`).
//! 6. The container's own size is settled, then `wrap-reverse`, absolute
//!    children and reversed axes are fixed up.

use sapling_core::{
    floats_equal, Align, Dimension, Direction, Display, Edge, ExperimentalFeature, FlexDirection,
    Justify, LogLevel, MeasureMode, Overflow, PositionType, Unit, Wrap, UNDEFINED,
};

use crate::calculate::LayoutInput;
use crate::engine::LayoutEngine;
use crate::error::{LayoutError, Result};
use crate::node::{LayoutState, Node, NodeId};

/// Inner box of a container that its children are sized against.
#[derive(Debug, Clone, Copy)]
struct InnerBox {
    width: f32,
    width_mode: MeasureMode,
    height: f32,
    height_mode: MeasureMode,
    direction: Direction,
}

/// Flex basis clamped to the child's min and max main size.
fn main_bounds(child: &Node, main_axis: FlexDirection, main_parent_size: f32) -> (f32, f32) {
    let dimension = main_axis.dimension();
    (
        child.style.min_dimension(dimension).resolve(main_parent_size),
        child.style.max_dimension(dimension).resolve(main_parent_size),
    )
}

/// Flex basis as used for line breaking: the min bound wins a conflict.
fn line_flex_basis(child: &Node, main_axis: FlexDirection, main_parent_size: f32) -> f32 {
    let (min, max) = main_bounds(child, main_axis, main_parent_size);
    min.max(max.min(child.layout.computed_flex_basis))
}

/// Flex basis as used when resolving flexible lengths: the max bound wins a
/// conflict.
fn flexing_flex_basis(child: &Node, main_axis: FlexDirection, main_parent_size: f32) -> f32 {
    let (min, max) = main_bounds(child, main_axis, main_parent_size);
    max.min(min.max(child.layout.computed_flex_basis))
}

fn defined_mode(size: f32) -> MeasureMode {
    if size.is_nan() {
        MeasureMode::Undefined
    } else {
        MeasureMode::Exactly
    }
}

/// Size a childless node from the available space, or from its padding and
/// border when the space is only an upper bound.
fn set_empty_container_dimensions(node: &mut Node, input: &LayoutInput) {
    let pw = input.parent_width;
    let padding_row = node.padding_and_border_for_axis(FlexDirection::Row, pw);
    let padding_column = node.padding_and_border_for_axis(FlexDirection::Column, pw);
    let margin_row = node.margin_for_axis(FlexDirection::Row, pw);
    let margin_column = node.margin_for_axis(FlexDirection::Column, pw);

    let width = match input.width_mode {
        MeasureMode::Undefined | MeasureMode::AtMost => padding_row,
        MeasureMode::Exactly => input.available_width - margin_row,
    };
    let height = match input.height_mode {
        MeasureMode::Undefined | MeasureMode::AtMost => padding_column,
        MeasureMode::Exactly => input.available_height - margin_column,
    };
    let width = node.bound_axis(FlexDirection::Row, width, pw, pw);
    let height = node.bound_axis(FlexDirection::Column, height, input.parent_height, pw);
    node.layout.measured_dimensions = [width, height];
}

/// Answer a measure-only request whose size does not depend on children.
fn set_fixed_size_dimensions(node: &mut Node, input: &LayoutInput) -> bool {
    let LayoutInput {
        available_width,
        available_height,
        width_mode,
        height_mode,
        parent_width,
        parent_height,
        ..
    } = *input;

    let fixed = (width_mode == MeasureMode::AtMost && available_width <= 0.0)
        || (height_mode == MeasureMode::AtMost && available_height <= 0.0)
        || (width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly);
    if !fixed {
        return false;
    }

    let margin_column = node.margin_for_axis(FlexDirection::Column, parent_width);
    let margin_row = node.margin_for_axis(FlexDirection::Row, parent_width);
    let width = if available_width.is_nan()
        || (width_mode == MeasureMode::AtMost && available_width < 0.0)
    {
        0.0
    } else {
        available_width - margin_row
    };
    let height = if available_height.is_nan()
        || (height_mode == MeasureMode::AtMost && available_height < 0.0)
    {
        0.0
    } else {
        available_height - margin_column
    };
    let width = node.bound_axis(FlexDirection::Row, width, parent_width, parent_width);
    let height = node.bound_axis(FlexDirection::Column, height, parent_height, parent_width);
    node.layout.measured_dimensions = [width, height];
    true
}

impl LayoutEngine {
    fn use_web_defaults(&self, id: NodeId) -> bool {
        self.config_of(&self.nodes[id]).use_web_defaults()
    }

    fn flex_shrink_of(&self, id: NodeId) -> f32 {
        self.nodes[id].resolve_flex_shrink(self.use_web_defaults(id))
    }

    fn is_flex_item(&self, id: NodeId) -> bool {
        self.nodes[id].is_flex(self.use_web_defaults(id))
    }

    /// Lay out `id` for the given constraints. Callers go through
    /// [`layout_node_internal`](Self::layout_node_internal) so results are
    /// cached.
    #[allow(clippy::too_many_lines, clippy::cognitive_complexity)]
    pub(crate) fn layout_impl(&mut self, id: NodeId, input: LayoutInput) -> Result<()> {
        let LayoutInput {
            available_width,
            available_height,
            parent_direction,
            width_mode,
            height_mode,
            parent_width,
            parent_height,
            perform_layout,
        } = input;

        let node = &mut self.nodes[id];
        let direction = node.resolve_direction(parent_direction);
        node.layout.direction = direction;

        let flex_row = FlexDirection::Row.resolve(direction);
        let flex_column = FlexDirection::Column.resolve(direction);
        let start = Edge::Start.index();
        let end = Edge::End.index();
        let top = Edge::Top.index();
        let bottom = Edge::Bottom.index();

        node.layout.margin[start] = node.leading_margin(flex_row, parent_width);
        node.layout.margin[end] = node.trailing_margin(flex_row, parent_width);
        node.layout.margin[top] = node.leading_margin(flex_column, parent_width);
        node.layout.margin[bottom] = node.trailing_margin(flex_column, parent_width);

        node.layout.border[start] = node.leading_border(flex_row);
        node.layout.border[end] = node.trailing_border(flex_row);
        node.layout.border[top] = node.leading_border(flex_column);
        node.layout.border[bottom] = node.trailing_border(flex_column);

        node.layout.padding[start] = node.leading_padding(flex_row, parent_width);
        node.layout.padding[end] = node.trailing_padding(flex_row, parent_width);
        node.layout.padding[top] = node.leading_padding(flex_column, parent_width);
        node.layout.padding[bottom] = node.trailing_padding(flex_column, parent_width);

        if node.measure.is_some() {
            return self.measure_leaf(id, &input);
        }
        if node.children.is_empty() {
            set_empty_container_dimensions(node, &input);
            return Ok(());
        }
        if !perform_layout && set_fixed_size_dimensions(node, &input) {
            return Ok(());
        }

        self.clone_children_if_needed(id)?;

        self.nodes[id].layout.had_overflow = false;
        let node = &self.nodes[id];
        let children: Vec<NodeId> = node.children.iter().collect();
        let child_count = children.len();

        let main_axis = node.style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);
        let main_dimension = main_axis.dimension();
        let cross_dimension = cross_axis.dimension();
        let is_main_axis_row = main_axis.is_row();
        let justify_content = node.style.justify_content;
        let is_node_flex_wrap = node.style.flex_wrap != Wrap::NoWrap;

        let main_axis_parent_size = if is_main_axis_row {
            parent_width
        } else {
            parent_height
        };
        let cross_axis_parent_size = if is_main_axis_row {
            parent_height
        } else {
            parent_width
        };

        let leading_padding_and_border_main =
            node.leading_padding_and_border(main_axis, parent_width);
        let trailing_padding_and_border_main =
            node.trailing_padding_and_border(main_axis, parent_width);
        let leading_padding_and_border_cross =
            node.leading_padding_and_border(cross_axis, parent_width);
        let padding_and_border_main = node.padding_and_border_for_axis(main_axis, parent_width);
        let padding_and_border_cross = node.padding_and_border_for_axis(cross_axis, parent_width);

        let mut measure_mode_main = if is_main_axis_row {
            width_mode
        } else {
            height_mode
        };
        let measure_mode_cross = if is_main_axis_row {
            height_mode
        } else {
            width_mode
        };

        let padding_and_border_row = if is_main_axis_row {
            padding_and_border_main
        } else {
            padding_and_border_cross
        };
        let padding_and_border_column = if is_main_axis_row {
            padding_and_border_cross
        } else {
            padding_and_border_main
        };

        let margin_row = node.margin_for_axis(FlexDirection::Row, parent_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, parent_width);

        let min_inner_width = node.style.min_width.resolve(parent_width)
            - margin_row
            - padding_and_border_row;
        let max_inner_width = node.style.max_width.resolve(parent_width)
            - margin_row
            - padding_and_border_row;
        let min_inner_height = node.style.min_height.resolve(parent_height)
            - margin_column
            - padding_and_border_column;
        let max_inner_height = node.style.max_height.resolve(parent_height)
            - margin_column
            - padding_and_border_column;
        let (min_inner_main, max_inner_main) = if is_main_axis_row {
            (min_inner_width, max_inner_width)
        } else {
            (min_inner_height, max_inner_height)
        };

        let mut available_inner_width = available_width - margin_row - padding_and_border_row;
        if !available_inner_width.is_nan() {
            available_inner_width = available_inner_width.min(max_inner_width).max(min_inner_width);
        }
        let mut available_inner_height =
            available_height - margin_column - padding_and_border_column;
        if !available_inner_height.is_nan() {
            available_inner_height = available_inner_height
                .min(max_inner_height)
                .max(min_inner_height);
        }

        let mut available_inner_main = if is_main_axis_row {
            available_inner_width
        } else {
            available_inner_height
        };
        let available_inner_cross = if is_main_axis_row {
            available_inner_height
        } else {
            available_inner_width
        };

        let use_legacy_stretch = self.config_of(node).use_legacy_stretch_behaviour();
        let node_flex_grow = node.resolve_flex_grow();

        // A lone flexible child of an exact container can skip measuring its
        // basis: it will take all free space anyway.
        let mut single_flex_child = None;
        if measure_mode_main == MeasureMode::Exactly {
            for &child in &children {
                if single_flex_child.is_some() {
                    if self.is_flex_item(child) {
                        single_flex_child = None;
                        break;
                    }
                } else if self.nodes[child].resolve_flex_grow() > 0.0
                    && self.flex_shrink_of(child) > 0.0
                {
                    single_flex_child = Some(child);
                }
            }
        }

        // Flex basis of every child.
        let inner = InnerBox {
            width: available_inner_width,
            width_mode,
            height: available_inner_height,
            height_mode,
            direction,
        };
        let mut total_outer_flex_basis = 0.0;
        let mut absolute_children = Vec::new();

        for &child in &children {
            if self.nodes[child].style.display == Display::None {
                self.zero_out_layout_recursively(child)?;
                let child_node = &mut self.nodes[child];
                child_node.has_new_layout = true;
                child_node.is_dirty = false;
                continue;
            }
            self.nodes[child].resolve_dimensions();
            if perform_layout {
                let child_direction = self.nodes[child].resolve_direction(direction);
                self.place_node(
                    child,
                    child_direction,
                    available_inner_main,
                    available_inner_cross,
                    available_inner_width,
                );
            }

            if self.nodes[child].style.position_type == PositionType::Absolute {
                absolute_children.push(child);
            } else if single_flex_child == Some(child) {
                let layout = &mut self.nodes[child].layout;
                layout.computed_flex_basis_generation = self.generation;
                layout.computed_flex_basis = 0.0;
            } else {
                self.compute_flex_basis_for_child(id, child, &inner)?;
            }

            let child_node = &self.nodes[child];
            total_outer_flex_basis += child_node.layout.computed_flex_basis
                + child_node.margin_for_axis(main_axis, available_inner_width);
        }

        let flex_basis_overflows = measure_mode_main != MeasureMode::Undefined
            && total_outer_flex_basis > available_inner_main;
        if is_node_flex_wrap && flex_basis_overflows && measure_mode_main == MeasureMode::AtMost {
            measure_mode_main = MeasureMode::Exactly;
        }

        let mut start_of_line = 0;
        let mut end_of_line = 0;
        let mut line_count = 0;
        let mut total_line_cross_dim = 0.0;
        let mut max_line_main_dim: f32 = 0.0;

        while end_of_line < child_count {
            // Collect the items of this line.
            let mut items_on_line = 0_usize;
            let mut size_consumed_on_current_line = 0.0;
            let mut size_consumed_including_min_constraint = 0.0;
            let mut total_flex_grow_factors = 0.0;
            let mut total_flex_shrink_scaled_factors = 0.0;
            let mut relative_children = Vec::new();

            for &child in &children[start_of_line..] {
                let child_node = &mut self.nodes[child];
                if child_node.style.display == Display::None {
                    end_of_line += 1;
                    continue;
                }
                child_node.line_index = line_count;

                if child_node.style.position_type != PositionType::Absolute {
                    let child_margin_main =
                        child_node.margin_for_axis(main_axis, available_inner_width);
                    let flex_basis = line_flex_basis(child_node, main_axis, main_axis_parent_size);

                    if size_consumed_including_min_constraint + flex_basis + child_margin_main
                        > available_inner_main
                        && is_node_flex_wrap
                        && items_on_line > 0
                    {
                        break;
                    }

                    size_consumed_including_min_constraint += flex_basis + child_margin_main;
                    size_consumed_on_current_line += flex_basis + child_margin_main;
                    items_on_line += 1;

                    if self.is_flex_item(child) {
                        let child_node = &self.nodes[child];
                        total_flex_grow_factors += child_node.resolve_flex_grow();
                        total_flex_shrink_scaled_factors +=
                            -self.flex_shrink_of(child) * child_node.layout.computed_flex_basis;
                    }
                    relative_children.push(child);
                }
                end_of_line += 1;
            }

            // Totals below one would otherwise leave free space unused.
            if total_flex_grow_factors > 0.0 && total_flex_grow_factors < 1.0 {
                total_flex_grow_factors = 1.0;
            }
            if total_flex_shrink_scaled_factors > 0.0 && total_flex_shrink_scaled_factors < 1.0 {
                total_flex_shrink_scaled_factors = 1.0;
            }

            // A measure pass with an exact cross size only needs the main size.
            let can_skip_flex = !perform_layout && measure_mode_cross == MeasureMode::Exactly;

            let mut leading_main_dim = 0.0;
            let mut between_main_dim = 0.0;

            if measure_mode_main != MeasureMode::Exactly {
                if !min_inner_main.is_nan() && size_consumed_on_current_line < min_inner_main {
                    available_inner_main = min_inner_main;
                } else if !max_inner_main.is_nan() && size_consumed_on_current_line > max_inner_main
                {
                    available_inner_main = max_inner_main;
                } else if !use_legacy_stretch
                    && (total_flex_grow_factors == 0.0 || node_flex_grow == 0.0)
                {
                    // Nothing can grow: size to content.
                    available_inner_main = size_consumed_on_current_line;
                }
            }

            let mut remaining_free_space = if !available_inner_main.is_nan() {
                available_inner_main - size_consumed_on_current_line
            } else if size_consumed_on_current_line < 0.0 {
                -size_consumed_on_current_line
            } else {
                0.0
            };

            let original_remaining_free_space = remaining_free_space;
            let mut delta_free_space = 0.0;

            if !can_skip_flex {
                // First pass: freeze items that hit their min or max.
                let mut delta_flex_shrink_scaled_factors = 0.0;
                let mut delta_flex_grow_factors = 0.0;
                for &child in &relative_children {
                    let child_node = &self.nodes[child];
                    let child_flex_basis =
                        flexing_flex_basis(child_node, main_axis, main_axis_parent_size);

                    if remaining_free_space < 0.0 {
                        let flex_shrink_scaled_factor =
                            -self.flex_shrink_of(child) * child_flex_basis;
                        if flex_shrink_scaled_factor != 0.0 {
                            let base_main_size = child_flex_basis
                                + remaining_free_space / total_flex_shrink_scaled_factors
                                    * flex_shrink_scaled_factor;
                            let bound_main_size = child_node.bound_axis(
                                main_axis,
                                base_main_size,
                                available_inner_main,
                                available_inner_width,
                            );
                            if base_main_size != bound_main_size {
                                delta_free_space -= bound_main_size - child_flex_basis;
                                delta_flex_shrink_scaled_factors -= flex_shrink_scaled_factor;
                            }
                        }
                    } else if remaining_free_space > 0.0 {
                        let flex_grow_factor = child_node.resolve_flex_grow();
                        if flex_grow_factor != 0.0 {
                            let base_main_size = child_flex_basis
                                + remaining_free_space / total_flex_grow_factors * flex_grow_factor;
                            let bound_main_size = child_node.bound_axis(
                                main_axis,
                                base_main_size,
                                available_inner_main,
                                available_inner_width,
                            );
                            if base_main_size != bound_main_size {
                                delta_free_space -= bound_main_size - child_flex_basis;
                                delta_flex_grow_factors -= flex_grow_factor;
                            }
                        }
                    }
                }

                total_flex_shrink_scaled_factors += delta_flex_shrink_scaled_factors;
                total_flex_grow_factors += delta_flex_grow_factors;
                remaining_free_space += delta_free_space;

                // Second pass: share out what is left and lay the items out.
                delta_free_space = 0.0;
                for &child in &relative_children {
                    let node = &self.nodes[id];
                    let child_node = &self.nodes[child];
                    let child_flex_basis =
                        flexing_flex_basis(child_node, main_axis, main_axis_parent_size);
                    let mut updated_main_size = child_flex_basis;

                    if remaining_free_space < 0.0 {
                        let flex_shrink_scaled_factor =
                            -self.flex_shrink_of(child) * child_flex_basis;
                        if flex_shrink_scaled_factor != 0.0 {
                            let child_size = if total_flex_shrink_scaled_factors == 0.0 {
                                child_flex_basis + flex_shrink_scaled_factor
                            } else {
                                child_flex_basis
                                    + (remaining_free_space / total_flex_shrink_scaled_factors)
                                        * flex_shrink_scaled_factor
                            };
                            updated_main_size = child_node.bound_axis(
                                main_axis,
                                child_size,
                                available_inner_main,
                                available_inner_width,
                            );
                        }
                    } else if remaining_free_space > 0.0 {
                        let flex_grow_factor = child_node.resolve_flex_grow();
                        if flex_grow_factor != 0.0 {
                            updated_main_size = child_node.bound_axis(
                                main_axis,
                                child_flex_basis
                                    + remaining_free_space / total_flex_grow_factors
                                        * flex_grow_factor,
                                available_inner_main,
                                available_inner_width,
                            );
                        }
                    }

                    delta_free_space -= updated_main_size - child_flex_basis;

                    let margin_main = child_node.margin_for_axis(main_axis, available_inner_width);
                    let margin_cross =
                        child_node.margin_for_axis(cross_axis, available_inner_width);

                    let mut child_main_size = updated_main_size + margin_main;
                    let mut child_main_mode = MeasureMode::Exactly;
                    let aspect_ratio = child_node.style.aspect_ratio;
                    let cross_defined =
                        child_node.is_style_dim_defined(cross_axis, available_inner_cross);
                    let align = node.align_item(child_node);

                    let (mut child_cross_size, mut child_cross_mode) = if !aspect_ratio.is_nan() {
                        let cross = if is_main_axis_row {
                            (child_main_size - margin_main) / aspect_ratio
                        } else {
                            (child_main_size - margin_main) * aspect_ratio
                        };
                        (cross + margin_cross, MeasureMode::Exactly)
                    } else if !available_inner_cross.is_nan()
                        && !cross_defined
                        && measure_mode_cross == MeasureMode::Exactly
                        && !(is_node_flex_wrap && flex_basis_overflows)
                        && align == Align::Stretch
                    {
                        (available_inner_cross, MeasureMode::Exactly)
                    } else if !cross_defined {
                        let mode = if available_inner_cross.is_nan() {
                            MeasureMode::Undefined
                        } else {
                            MeasureMode::AtMost
                        };
                        (available_inner_cross, mode)
                    } else {
                        let resolved = child_node.resolved_dimension(cross_dimension);
                        let size = resolved.resolve(available_inner_cross) + margin_cross;
                        let is_loose_percentage = resolved.unit() == Unit::Percent
                            && measure_mode_cross != MeasureMode::Exactly;
                        let mode = if size.is_nan() || is_loose_percentage {
                            MeasureMode::Undefined
                        } else {
                            MeasureMode::Exactly
                        };
                        (size, mode)
                    };

                    child_node.constrain_max_size_for_mode(
                        main_axis,
                        available_inner_main,
                        available_inner_width,
                        &mut child_main_mode,
                        &mut child_main_size,
                    );
                    child_node.constrain_max_size_for_mode(
                        cross_axis,
                        available_inner_cross,
                        available_inner_width,
                        &mut child_cross_mode,
                        &mut child_cross_size,
                    );

                    // Stretched items are laid out again once the line is sized.
                    let requires_stretch_layout = !cross_defined && align == Align::Stretch;

                    let (child_width, child_height, child_width_mode, child_height_mode) =
                        if is_main_axis_row {
                            (child_main_size, child_cross_size, child_main_mode, child_cross_mode)
                        } else {
                            (child_cross_size, child_main_size, child_cross_mode, child_main_mode)
                        };

                    self.layout_node_internal(
                        child,
                        LayoutInput {
                            available_width: child_width,
                            available_height: child_height,
                            parent_direction: direction,
                            width_mode: child_width_mode,
                            height_mode: child_height_mode,
                            parent_width: available_inner_width,
                            parent_height: available_inner_height,
                            perform_layout: perform_layout && !requires_stretch_layout,
                        },
                        "flex",
                    )?;
                    let child_overflow = self.nodes[child].layout.had_overflow;
                    self.nodes[id].layout.had_overflow |= child_overflow;
                }
            }

            remaining_free_space = original_remaining_free_space + delta_free_space;
            self.nodes[id].layout.had_overflow |=
                remaining_free_space < 0.0 || original_remaining_free_space < 0.0;

            // Main-axis justification.
            let node = &self.nodes[id];
            if measure_mode_main == MeasureMode::AtMost && remaining_free_space > 0.0 {
                let min_main = node.style.min_dimension(main_dimension);
                let min_main_size = min_main.resolve(main_axis_parent_size);
                remaining_free_space = if !min_main.is_undefined() && min_main_size >= 0.0 {
                    (min_main_size - (available_inner_main - remaining_free_space)).max(0.0)
                } else {
                    0.0
                };
            }

            let mut auto_margins_on_line = 0_usize;
            for &child in &children[start_of_line..end_of_line] {
                let child_node = &self.nodes[child];
                if child_node.style.position_type == PositionType::Relative {
                    if child_node.margin_leading_value(main_axis).is_auto() {
                        auto_margins_on_line += 1;
                    }
                    if child_node.margin_trailing_value(main_axis).is_auto() {
                        auto_margins_on_line += 1;
                    }
                }
            }

            if auto_margins_on_line == 0 {
                match justify_content {
                    Justify::Center => leading_main_dim = remaining_free_space / 2.0,
                    Justify::FlexEnd => leading_main_dim = remaining_free_space,
                    Justify::SpaceBetween => {
                        if items_on_line > 1 {
                            between_main_dim =
                                remaining_free_space.max(0.0) / (items_on_line - 1) as f32;
                        }
                    }
                    Justify::SpaceAround => {
                        if items_on_line > 0 {
                            between_main_dim = remaining_free_space / items_on_line as f32;
                            leading_main_dim = between_main_dim / 2.0;
                        }
                    }
                    Justify::FlexStart => {}
                }
            }
            let auto_margin_share = if auto_margins_on_line > 0 {
                remaining_free_space / auto_margins_on_line as f32
            } else {
                0.0
            };

            let leading_border_main = node.leading_border(main_axis);
            let main_leading_edge = main_axis.leading_edge();
            let mut main_dim = leading_padding_and_border_main + leading_main_dim;
            let mut cross_dim: f32 = 0.0;

            for &child in &children[start_of_line..end_of_line] {
                let child_node = &self.nodes[child];
                if child_node.style.display == Display::None {
                    continue;
                }
                let position_type = child_node.style.position_type;
                if position_type == PositionType::Absolute
                    && child_node.is_leading_pos_defined(main_axis)
                {
                    if perform_layout {
                        // Absolute items with a leading offset ignore
                        // justification.
                        let position = child_node.leading_position(main_axis, available_inner_main)
                            + leading_border_main
                            + child_node.leading_margin(main_axis, available_inner_width);
                        self.nodes[child]
                            .layout
                            .set_position(main_leading_edge, position);
                    }
                } else if position_type == PositionType::Relative {
                    let leading_auto = child_node.margin_leading_value(main_axis).is_auto();
                    let trailing_auto = child_node.margin_trailing_value(main_axis).is_auto();
                    let main_extent = if can_skip_flex {
                        child_node.margin_for_axis(main_axis, available_inner_width)
                            + child_node.layout.computed_flex_basis
                    } else {
                        child_node.dim_with_margin(main_axis, available_inner_width)
                    };
                    let cross_extent = child_node.dim_with_margin(cross_axis, available_inner_width);

                    if leading_auto {
                        main_dim += auto_margin_share;
                    }
                    if perform_layout {
                        let layout = &mut self.nodes[child].layout;
                        let position = layout.position(main_leading_edge) + main_dim;
                        layout.set_position(main_leading_edge, position);
                    }
                    if trailing_auto {
                        main_dim += auto_margin_share;
                    }

                    main_dim += between_main_dim + main_extent;
                    cross_dim = if can_skip_flex {
                        available_inner_cross
                    } else {
                        cross_dim.max(cross_extent)
                    };
                } else if perform_layout {
                    let layout = &mut self.nodes[child].layout;
                    let position =
                        layout.position(main_leading_edge) + leading_border_main + leading_main_dim;
                    layout.set_position(main_leading_edge, position);
                }
            }
            main_dim += trailing_padding_and_border_main;

            let node = &self.nodes[id];
            let mut container_cross_axis = available_inner_cross;
            if measure_mode_cross != MeasureMode::Exactly {
                container_cross_axis = node.bound_axis(
                    cross_axis,
                    cross_dim + padding_and_border_cross,
                    cross_axis_parent_size,
                    parent_width,
                ) - padding_and_border_cross;
            }
            if !is_node_flex_wrap && measure_mode_cross == MeasureMode::Exactly {
                cross_dim = available_inner_cross;
            }
            cross_dim = node.bound_axis(
                cross_axis,
                cross_dim + padding_and_border_cross,
                cross_axis_parent_size,
                parent_width,
            ) - padding_and_border_cross;

            // Cross-axis alignment within the line.
            if perform_layout {
                let cross_leading_edge = cross_axis.leading_edge();
                for &child in &children[start_of_line..end_of_line] {
                    let node = &self.nodes[id];
                    let child_node = &self.nodes[child];
                    if child_node.style.display == Display::None {
                        continue;
                    }

                    if child_node.style.position_type == PositionType::Absolute {
                        let offset = if child_node.is_leading_pos_defined(cross_axis) {
                            child_node.leading_position(cross_axis, available_inner_cross)
                        } else {
                            0.0
                        };
                        let position = offset
                            + node.leading_border(cross_axis)
                            + child_node.leading_margin(cross_axis, available_inner_width);
                        self.nodes[child]
                            .layout
                            .set_position(cross_leading_edge, position);
                        continue;
                    }

                    let mut leading_cross_dim = leading_padding_and_border_cross;
                    let align = node.align_item(child_node);
                    let leading_auto = child_node.margin_leading_value(cross_axis).is_auto();
                    let trailing_auto = child_node.margin_trailing_value(cross_axis).is_auto();

                    if align == Align::Stretch && !leading_auto && !trailing_auto {
                        // Items without a definite cross size fill the line.
                        if !child_node.is_style_dim_defined(cross_axis, available_inner_cross) {
                            let mut child_main_size = child_node.layout.measured(main_dimension);
                            let aspect_ratio = child_node.style.aspect_ratio;
                            let mut child_cross_size = if aspect_ratio.is_nan() {
                                cross_dim
                            } else {
                                child_node.margin_for_axis(cross_axis, available_inner_width)
                                    + if is_main_axis_row {
                                        child_main_size / aspect_ratio
                                    } else {
                                        child_main_size * aspect_ratio
                                    }
                            };
                            child_main_size +=
                                child_node.margin_for_axis(main_axis, available_inner_width);

                            let mut child_main_mode = MeasureMode::Exactly;
                            let mut child_cross_mode = MeasureMode::Exactly;
                            child_node.constrain_max_size_for_mode(
                                main_axis,
                                available_inner_main,
                                available_inner_width,
                                &mut child_main_mode,
                                &mut child_main_size,
                            );
                            child_node.constrain_max_size_for_mode(
                                cross_axis,
                                available_inner_cross,
                                available_inner_width,
                                &mut child_cross_mode,
                                &mut child_cross_size,
                            );

                            let (child_width, child_height) = if is_main_axis_row {
                                (child_main_size, child_cross_size)
                            } else {
                                (child_cross_size, child_main_size)
                            };
                            self.layout_node_internal(
                                child,
                                LayoutInput {
                                    available_width: child_width,
                                    available_height: child_height,
                                    parent_direction: direction,
                                    width_mode: defined_mode(child_width),
                                    height_mode: defined_mode(child_height),
                                    parent_width: available_inner_width,
                                    parent_height: available_inner_height,
                                    perform_layout: true,
                                },
                                "stretch",
                            )?;
                        }
                    } else {
                        let remaining_cross_dim = container_cross_axis
                            - child_node.dim_with_margin(cross_axis, available_inner_width);

                        if leading_auto && trailing_auto {
                            leading_cross_dim += (remaining_cross_dim / 2.0).max(0.0);
                        } else if leading_auto {
                            leading_cross_dim += remaining_cross_dim.max(0.0);
                        } else if !trailing_auto {
                            match align {
                                Align::FlexStart => {}
                                Align::Center => leading_cross_dim += remaining_cross_dim / 2.0,
                                _ => leading_cross_dim += remaining_cross_dim,
                            }
                        }
                    }

                    let layout = &mut self.nodes[child].layout;
                    let position = layout.position(cross_leading_edge)
                        + total_line_cross_dim
                        + leading_cross_dim;
                    layout.set_position(cross_leading_edge, position);
                }
            }

            total_line_cross_dim += cross_dim;
            max_line_main_dim = max_line_main_dim.max(main_dim);

            line_count += 1;
            start_of_line = end_of_line;
        }

        // Distribute lines along the cross axis.
        if perform_layout
            && (line_count > 1 || self.is_baseline_layout(id))
            && !available_inner_cross.is_nan()
        {
            let remaining_align_content_dim = available_inner_cross - total_line_cross_dim;
            let lines = line_count as f32;
            let mut cross_dim_lead = 0.0;
            let mut current_lead = leading_padding_and_border_cross;

            match self.nodes[id].style.align_content {
                Align::FlexEnd => current_lead += remaining_align_content_dim,
                Align::Center => current_lead += remaining_align_content_dim / 2.0,
                Align::Stretch => {
                    if available_inner_cross > total_line_cross_dim {
                        cross_dim_lead = remaining_align_content_dim / lines;
                    }
                }
                Align::SpaceAround => {
                    if available_inner_cross > total_line_cross_dim {
                        current_lead += remaining_align_content_dim / (2.0 * lines);
                        if line_count > 1 {
                            cross_dim_lead = remaining_align_content_dim / lines;
                        }
                    } else {
                        current_lead += remaining_align_content_dim / 2.0;
                    }
                }
                Align::SpaceBetween => {
                    if available_inner_cross > total_line_cross_dim && line_count > 1 {
                        cross_dim_lead = remaining_align_content_dim / (lines - 1.0);
                    }
                }
                Align::Auto | Align::FlexStart | Align::Baseline => {}
            }

            let cross_leading_edge = cross_axis.leading_edge();
            let mut end_index = 0;
            for line in 0..line_count {
                let start_index = end_index;

                // Line height and baseline extents.
                let mut line_height: f32 = 0.0;
                let mut max_ascent: f32 = 0.0;
                let mut max_descent: f32 = 0.0;
                let mut index = start_index;
                while index < child_count {
                    let child = children[index];
                    let node = &self.nodes[id];
                    let child_node = &self.nodes[child];
                    if child_node.style.display == Display::None
                        || child_node.style.position_type != PositionType::Relative
                    {
                        index += 1;
                        continue;
                    }
                    if child_node.line_index != line {
                        break;
                    }
                    if child_node.is_layout_dim_defined(cross_axis) {
                        line_height = line_height.max(
                            child_node.layout.measured(cross_dimension)
                                + child_node.margin_for_axis(cross_axis, available_inner_width),
                        );
                    }
                    if node.align_item(child_node) == Align::Baseline {
                        let ascent = self.baseline(child)?
                            + child_node.leading_margin(FlexDirection::Column, available_inner_width);
                        let descent = child_node.layout.measured(Dimension::Height)
                            + child_node.margin_for_axis(FlexDirection::Column, available_inner_width)
                            - ascent;
                        max_ascent = max_ascent.max(ascent);
                        max_descent = max_descent.max(descent);
                        line_height = line_height.max(max_ascent + max_descent);
                    }
                    index += 1;
                }
                end_index = index;
                line_height += cross_dim_lead;

                for &child in &children[start_index..end_index] {
                    let node = &self.nodes[id];
                    let child_node = &self.nodes[child];
                    if child_node.style.display == Display::None
                        || child_node.style.position_type != PositionType::Relative
                    {
                        continue;
                    }
                    match node.align_item(child_node) {
                        Align::FlexStart => {
                            let position = current_lead
                                + child_node.leading_margin(cross_axis, available_inner_width);
                            self.nodes[child]
                                .layout
                                .set_position(cross_leading_edge, position);
                        }
                        Align::FlexEnd => {
                            let position = current_lead + line_height
                                - child_node.trailing_margin(cross_axis, available_inner_width)
                                - child_node.layout.measured(cross_dimension);
                            self.nodes[child]
                                .layout
                                .set_position(cross_leading_edge, position);
                        }
                        Align::Center => {
                            let child_size = child_node.layout.measured(cross_dimension);
                            let position = current_lead + (line_height - child_size) / 2.0;
                            self.nodes[child]
                                .layout
                                .set_position(cross_leading_edge, position);
                        }
                        Align::Stretch => {
                            let position = current_lead
                                + child_node.leading_margin(cross_axis, available_inner_width);
                            let cross_defined =
                                child_node.is_style_dim_defined(cross_axis, available_inner_cross);
                            let measured_width = child_node.layout.measured(Dimension::Width);
                            let measured_height = child_node.layout.measured(Dimension::Height);
                            let child_width = if is_main_axis_row {
                                measured_width
                                    + child_node.margin_for_axis(main_axis, available_inner_width)
                            } else {
                                line_height
                            };
                            let child_height = if is_main_axis_row {
                                line_height
                            } else {
                                measured_height
                                    + child_node.margin_for_axis(cross_axis, available_inner_width)
                            };
                            self.nodes[child]
                                .layout
                                .set_position(cross_leading_edge, position);

                            if !cross_defined
                                && !(floats_equal(child_width, measured_width)
                                    && floats_equal(child_height, measured_height))
                            {
                                self.layout_node_internal(
                                    child,
                                    LayoutInput {
                                        available_width: child_width,
                                        available_height: child_height,
                                        parent_direction: direction,
                                        width_mode: MeasureMode::Exactly,
                                        height_mode: MeasureMode::Exactly,
                                        parent_width: available_inner_width,
                                        parent_height: available_inner_height,
                                        perform_layout: true,
                                    },
                                    "multiline-stretch",
                                )?;
                            }
                        }
                        Align::Baseline => {
                            let offset = child_node
                                .leading_position(FlexDirection::Column, available_inner_cross);
                            let position = current_lead + max_ascent - self.baseline(child)? + offset;
                            self.nodes[child].layout.set_position(Edge::Top, position);
                        }
                        Align::Auto | Align::SpaceBetween | Align::SpaceAround => {}
                    }
                }

                current_lead += line_height;
            }
        }

        // Settle the container's own size.
        let node = &mut self.nodes[id];
        let width = node.bound_axis(
            FlexDirection::Row,
            available_width - margin_row,
            parent_width,
            parent_width,
        );
        let height = node.bound_axis(
            FlexDirection::Column,
            available_height - margin_column,
            parent_height,
            parent_width,
        );
        node.layout.measured_dimensions = [width, height];

        let scrolls = node.style.overflow == Overflow::Scroll;
        if measure_mode_main == MeasureMode::Undefined
            || (!scrolls && measure_mode_main == MeasureMode::AtMost)
        {
            let size = node.bound_axis(
                main_axis,
                max_line_main_dim,
                main_axis_parent_size,
                parent_width,
            );
            node.layout.set_measured(main_dimension, size);
        } else if measure_mode_main == MeasureMode::AtMost && scrolls {
            let size = (available_inner_main + padding_and_border_main)
                .min(node.bound_axis_within_min_and_max(
                    main_axis,
                    max_line_main_dim,
                    main_axis_parent_size,
                ))
                .max(padding_and_border_main);
            node.layout.set_measured(main_dimension, size);
        }

        if measure_mode_cross == MeasureMode::Undefined
            || (!scrolls && measure_mode_cross == MeasureMode::AtMost)
        {
            let size = node.bound_axis(
                cross_axis,
                total_line_cross_dim + padding_and_border_cross,
                cross_axis_parent_size,
                parent_width,
            );
            node.layout.set_measured(cross_dimension, size);
        } else if measure_mode_cross == MeasureMode::AtMost && scrolls {
            let size = (available_inner_cross + padding_and_border_cross)
                .min(node.bound_axis_within_min_and_max(
                    cross_axis,
                    total_line_cross_dim + padding_and_border_cross,
                    cross_axis_parent_size,
                ))
                .max(padding_and_border_cross);
            node.layout.set_measured(cross_dimension, size);
        }

        if !perform_layout {
            return Ok(());
        }

        // Lines stack from the cross end under wrap-reverse.
        if node.style.flex_wrap == Wrap::WrapReverse {
            let container_cross = node.layout.measured(cross_dimension);
            let cross_leading_edge = cross_axis.leading_edge();
            for &child in &children {
                let layout_child = &mut self.nodes[child];
                if layout_child.style.position_type == PositionType::Relative {
                    let layout = &mut layout_child.layout;
                    let position = container_cross
                        - layout.position(cross_leading_edge)
                        - layout.measured(cross_dimension);
                    layout.set_position(cross_leading_edge, position);
                }
            }
        }

        let absolute_width_mode = if is_main_axis_row {
            measure_mode_main
        } else {
            measure_mode_cross
        };
        for &child in &absolute_children {
            self.absolute_layout_child(
                id,
                child,
                available_inner_width,
                absolute_width_mode,
                available_inner_height,
                direction,
            )?;
        }

        let is_reversed =
            |axis: FlexDirection| matches!(axis, FlexDirection::RowReverse | FlexDirection::ColumnReverse);
        let needs_main_trailing_pos = is_reversed(main_axis);
        let needs_cross_trailing_pos = is_reversed(cross_axis);
        if needs_main_trailing_pos || needs_cross_trailing_pos {
            for &child in &children {
                if self.nodes[child].style.display == Display::None {
                    continue;
                }
                if needs_main_trailing_pos {
                    self.set_child_trailing_position(id, child, main_axis);
                }
                if needs_cross_trailing_pos {
                    self.set_child_trailing_position(id, child, cross_axis);
                }
            }
        }

        Ok(())
    }

    /// Flex basis of `child`, measuring it when no definite basis exists.
    fn compute_flex_basis_for_child(
        &mut self,
        id: NodeId,
        child: NodeId,
        inner: &InnerBox,
    ) -> Result<()> {
        let node = &self.nodes[id];
        let child_node = &self.nodes[child];
        let child_config = self.config_of(child_node);
        let generation = self.generation;

        let main_axis = node.style.flex_direction.resolve(inner.direction);
        let is_main_axis_row = main_axis.is_row();
        let parent_width = inner.width;
        let parent_height = inner.height;
        let main_axis_size = if is_main_axis_row {
            inner.width
        } else {
            inner.height
        };

        let resolved_flex_basis = child_node
            .resolve_flex_basis(child_config.use_web_defaults())
            .resolve(main_axis_size);
        let is_row_style_dim_defined =
            child_node.is_style_dim_defined(FlexDirection::Row, parent_width);
        let is_column_style_dim_defined =
            child_node.is_style_dim_defined(FlexDirection::Column, parent_height);

        let flex_basis = if !resolved_flex_basis.is_nan() && !main_axis_size.is_nan() {
            let stale = child_node.layout.computed_flex_basis.is_nan()
                || (child_config.is_experimental_feature_enabled(ExperimentalFeature::WebFlexBasis)
                    && child_node.layout.computed_flex_basis_generation != generation);
            stale.then(|| {
                resolved_flex_basis
                    .max(child_node.padding_and_border_for_axis(main_axis, parent_width))
            })
        } else if is_main_axis_row && is_row_style_dim_defined {
            // The width is definite: use it as the basis.
            Some(
                child_node
                    .resolved_dimension(Dimension::Width)
                    .resolve(parent_width)
                    .max(child_node.padding_and_border_for_axis(FlexDirection::Row, parent_width)),
            )
        } else if !is_main_axis_row && is_column_style_dim_defined {
            Some(
                child_node
                    .resolved_dimension(Dimension::Height)
                    .resolve(parent_height)
                    .max(
                        child_node.padding_and_border_for_axis(FlexDirection::Column, parent_width),
                    ),
            )
        } else {
            let mut child_width = UNDEFINED;
            let mut child_height = UNDEFINED;
            let mut child_width_mode = MeasureMode::Undefined;
            let mut child_height_mode = MeasureMode::Undefined;

            let margin_row = child_node.margin_for_axis(FlexDirection::Row, parent_width);
            let margin_column = child_node.margin_for_axis(FlexDirection::Column, parent_width);

            if is_row_style_dim_defined {
                child_width = child_node
                    .resolved_dimension(Dimension::Width)
                    .resolve(parent_width)
                    + margin_row;
                child_width_mode = MeasureMode::Exactly;
            }
            if is_column_style_dim_defined {
                child_height = child_node
                    .resolved_dimension(Dimension::Height)
                    .resolve(parent_height)
                    + margin_column;
                child_height_mode = MeasureMode::Exactly;
            }

            // A scrolling container only bounds its children on the cross axis.
            let overflow = node.style.overflow;
            let scrolls = overflow == Overflow::Scroll;
            if (!scrolls || !is_main_axis_row) && child_width.is_nan() && !inner.width.is_nan() {
                child_width = inner.width;
                child_width_mode = MeasureMode::AtMost;
            }
            if (!scrolls || is_main_axis_row) && child_height.is_nan() && !inner.height.is_nan() {
                child_height = inner.height;
                child_height_mode = MeasureMode::AtMost;
            }

            let aspect_ratio = child_node.style.aspect_ratio;
            if !aspect_ratio.is_nan() {
                if !is_main_axis_row && child_width_mode == MeasureMode::Exactly {
                    child_height = (child_width - margin_row) / aspect_ratio;
                    child_height_mode = MeasureMode::Exactly;
                } else if is_main_axis_row && child_height_mode == MeasureMode::Exactly {
                    child_width = (child_height - margin_column) * aspect_ratio;
                    child_width_mode = MeasureMode::Exactly;
                }
            }

            // Stretched items are measured at the container's exact cross size.
            let stretches = node.align_item(child_node) == Align::Stretch;
            let has_exact_width =
                !inner.width.is_nan() && inner.width_mode == MeasureMode::Exactly;
            if !is_main_axis_row
                && !is_row_style_dim_defined
                && has_exact_width
                && stretches
                && child_width_mode != MeasureMode::Exactly
            {
                child_width = inner.width;
                child_width_mode = MeasureMode::Exactly;
                if !aspect_ratio.is_nan() {
                    child_height = (child_width - margin_row) / aspect_ratio;
                    child_height_mode = MeasureMode::Exactly;
                }
            }

            let has_exact_height =
                !inner.height.is_nan() && inner.height_mode == MeasureMode::Exactly;
            if is_main_axis_row
                && !is_column_style_dim_defined
                && has_exact_height
                && stretches
                && child_height_mode != MeasureMode::Exactly
            {
                child_height = inner.height;
                child_height_mode = MeasureMode::Exactly;
                if !aspect_ratio.is_nan() {
                    child_width = (child_height - margin_column) * aspect_ratio;
                    child_width_mode = MeasureMode::Exactly;
                }
            }

            child_node.constrain_max_size_for_mode(
                FlexDirection::Row,
                parent_width,
                parent_width,
                &mut child_width_mode,
                &mut child_width,
            );
            child_node.constrain_max_size_for_mode(
                FlexDirection::Column,
                parent_height,
                parent_width,
                &mut child_height_mode,
                &mut child_height,
            );

            self.layout_node_internal(
                child,
                LayoutInput {
                    available_width: child_width,
                    available_height: child_height,
                    parent_direction: inner.direction,
                    width_mode: child_width_mode,
                    height_mode: child_height_mode,
                    parent_width,
                    parent_height,
                    perform_layout: false,
                },
                "measure",
            )?;

            let child_node = &self.nodes[child];
            Some(
                child_node
                    .layout
                    .measured(main_axis.dimension())
                    .max(child_node.padding_and_border_for_axis(main_axis, parent_width)),
            )
        };

        let layout = &mut self.nodes[child].layout;
        if let Some(flex_basis) = flex_basis {
            layout.computed_flex_basis = flex_basis;
        }
        layout.computed_flex_basis_generation = generation;
        Ok(())
    }

    /// Size a leaf through its measure function.
    fn measure_leaf(&mut self, id: NodeId, input: &LayoutInput) -> Result<()> {
        let node = &self.nodes[id];
        let available_width = input.available_width;
        let available_height = input.available_height;

        let padding_and_border_row =
            node.padding_and_border_for_axis(FlexDirection::Row, available_width);
        let padding_and_border_column =
            node.padding_and_border_for_axis(FlexDirection::Column, available_width);
        let margin_row = node.margin_for_axis(FlexDirection::Row, available_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, available_width);

        if input.width_mode == MeasureMode::Exactly && input.height_mode == MeasureMode::Exactly {
            // Both sizes are fixed; no need to ask.
            let width = node.bound_axis(
                FlexDirection::Row,
                available_width - margin_row,
                input.parent_width,
                input.parent_width,
            );
            let height = node.bound_axis(
                FlexDirection::Column,
                available_height - margin_column,
                input.parent_height,
                input.parent_width,
            );
            self.nodes[id].layout.measured_dimensions = [width, height];
            return Ok(());
        }

        let Some(measure) = node.measure.clone() else {
            return Ok(());
        };

        // Never ask for a negative size.
        let inner_width = if available_width.is_nan() {
            available_width
        } else {
            (available_width - margin_row - padding_and_border_row).max(0.0)
        };
        let inner_height = if available_height.is_nan() {
            available_height
        } else {
            (available_height - margin_column - padding_and_border_column).max(0.0)
        };

        self.stats.measure_calls += 1;
        let measured = measure(id, inner_width, input.width_mode, inner_height, input.height_mode);
        if measured.width.is_nan() || measured.height.is_nan() {
            let err = LayoutError::UndefinedMeasurement {
                width: measured.width,
                height: measured.height,
            };
            self.log(Some(id), LogLevel::Error, &err.to_string());
            return Err(err);
        }

        let node = &mut self.nodes[id];
        let width = match input.width_mode {
            MeasureMode::Undefined | MeasureMode::AtMost => {
                measured.width + padding_and_border_row
            }
            MeasureMode::Exactly => available_width - margin_row,
        };
        let height = match input.height_mode {
            MeasureMode::Undefined | MeasureMode::AtMost => {
                measured.height + padding_and_border_column
            }
            MeasureMode::Exactly => available_height - margin_column,
        };
        let width = node.bound_axis(FlexDirection::Row, width, available_width, available_width);
        let height =
            node.bound_axis(FlexDirection::Column, height, available_height, available_width);
        node.layout.measured_dimensions = [width, height];
        Ok(())
    }

    /// Zero the layout of a `display: none` subtree.
    fn zero_out_layout_recursively(&mut self, id: NodeId) -> Result<()> {
        let node = &mut self.nodes[id];
        node.layout = LayoutState::zeroed();
        node.has_new_layout = true;
        self.clone_children_if_needed(id)?;
        let children: Vec<NodeId> = self.nodes[id].children.iter().collect();
        for child in children {
            self.zero_out_layout_recursively(child)?;
        }
        Ok(())
    }

    /// Distance from the top of `id` to its first baseline.
    pub(crate) fn baseline(&self, id: NodeId) -> Result<f32> {
        let node = &self.nodes[id];
        if let Some(baseline) = &node.baseline {
            let value = baseline(
                id,
                node.layout.measured(Dimension::Width),
                node.layout.measured(Dimension::Height),
            );
            if value.is_nan() {
                let err = LayoutError::UndefinedBaseline;
                self.log(Some(id), LogLevel::Error, &err.to_string());
                return Err(err);
            }
            return Ok(value);
        }

        let mut baseline_child = None;
        for child in node.children.iter() {
            let child_node = &self.nodes[child];
            if child_node.line_index > 0 {
                break;
            }
            if child_node.style.position_type == PositionType::Absolute {
                continue;
            }
            if node.align_item(child_node) == Align::Baseline {
                baseline_child = Some(child);
                break;
            }
            if baseline_child.is_none() {
                baseline_child = Some(child);
            }
        }

        let Some(child) = baseline_child else {
            return Ok(node.layout.measured(Dimension::Height));
        };
        Ok(self.baseline(child)? + self.nodes[child].layout.position(Edge::Top))
    }

    /// Whether children of `id` are aligned on their baselines.
    pub(crate) fn is_baseline_layout(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        if node.style.flex_direction.is_column() {
            return false;
        }
        if node.style.align_items == Align::Baseline {
            return true;
        }
        node.children.iter().any(|child| {
            let child_node = &self.nodes[child];
            child_node.style.position_type == PositionType::Relative
                && child_node.style.align_self == Align::Baseline
        })
    }
}
