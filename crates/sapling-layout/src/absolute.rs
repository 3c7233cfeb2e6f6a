//! Sizing and placement of `position: absolute` children.

use sapling_core::{Align, Dimension, Direction, FlexDirection, Justify, MeasureMode, Wrap, UNDEFINED};

use crate::calculate::LayoutInput;
use crate::engine::LayoutEngine;
use crate::error::Result;
use crate::node::NodeId;

impl LayoutEngine {
    /// Lay out an absolute `child` of `parent` against the parent's
    /// measured box. `width` and `height` are the parent's inner sizes.
    pub(crate) fn absolute_layout_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        width: f32,
        width_mode: MeasureMode,
        height: f32,
        direction: Direction,
    ) -> Result<()> {
        let parent_node = &self.nodes[parent];
        let child_node = &self.nodes[child];
        let main_axis = parent_node.style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);
        let is_main_axis_row = main_axis.is_row();

        let mut child_width = UNDEFINED;
        let mut child_height = UNDEFINED;

        let margin_row = child_node.margin_for_axis(FlexDirection::Row, width);
        let margin_column = child_node.margin_for_axis(FlexDirection::Column, width);

        if child_node.is_style_dim_defined(FlexDirection::Row, width) {
            child_width = child_node.resolved_dimension(Dimension::Width).resolve(width) + margin_row;
        } else if child_node.is_leading_pos_defined(FlexDirection::Row)
            && child_node.is_trailing_pos_defined(FlexDirection::Row)
        {
            // Stretch between the left and right offsets.
            child_width = parent_node.layout.measured(Dimension::Width)
                - (parent_node.leading_border(FlexDirection::Row)
                    + parent_node.trailing_border(FlexDirection::Row))
                - (child_node.leading_position(FlexDirection::Row, width)
                    + child_node.trailing_position(FlexDirection::Row, width));
            child_width = child_node.bound_axis(FlexDirection::Row, child_width, width, width);
        }

        if child_node.is_style_dim_defined(FlexDirection::Column, height) {
            child_height =
                child_node.resolved_dimension(Dimension::Height).resolve(height) + margin_column;
        } else if child_node.is_leading_pos_defined(FlexDirection::Column)
            && child_node.is_trailing_pos_defined(FlexDirection::Column)
        {
            child_height = parent_node.layout.measured(Dimension::Height)
                - (parent_node.leading_border(FlexDirection::Column)
                    + parent_node.trailing_border(FlexDirection::Column))
                - (child_node.leading_position(FlexDirection::Column, height)
                    + child_node.trailing_position(FlexDirection::Column, height));
            child_height = child_node.bound_axis(FlexDirection::Column, child_height, height, width);
        }

        // With exactly one side known, the aspect ratio supplies the other.
        let aspect_ratio = child_node.style.aspect_ratio;
        if child_width.is_nan() != child_height.is_nan() && !aspect_ratio.is_nan() {
            if child_width.is_nan() {
                child_width = margin_row + (child_height - margin_column) * aspect_ratio;
            } else {
                child_height = margin_column + (child_width - margin_row) / aspect_ratio;
            }
        }

        if child_width.is_nan() || child_height.is_nan() {
            let mut child_width_mode = if child_width.is_nan() {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };
            let child_height_mode = if child_height.is_nan() {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };

            // Let content wrap to the parent's width.
            if !is_main_axis_row
                && child_width.is_nan()
                && width_mode != MeasureMode::Undefined
                && width > 0.0
            {
                child_width = width;
                child_width_mode = MeasureMode::AtMost;
            }

            self.layout_node_internal(
                child,
                LayoutInput {
                    available_width: child_width,
                    available_height: child_height,
                    parent_direction: direction,
                    width_mode: child_width_mode,
                    height_mode: child_height_mode,
                    parent_width: child_width,
                    parent_height: child_height,
                    perform_layout: false,
                },
                "abs-measure",
            )?;
            let child_node = &self.nodes[child];
            child_width = child_node.layout.measured(Dimension::Width)
                + child_node.margin_for_axis(FlexDirection::Row, width);
            child_height = child_node.layout.measured(Dimension::Height)
                + child_node.margin_for_axis(FlexDirection::Column, width);
        }

        self.layout_node_internal(
            child,
            LayoutInput {
                available_width: child_width,
                available_height: child_height,
                parent_direction: direction,
                width_mode: MeasureMode::Exactly,
                height_mode: MeasureMode::Exactly,
                parent_width: child_width,
                parent_height: child_height,
                perform_layout: true,
            },
            "abs-layout",
        )?;

        let (main_size, cross_size) = if is_main_axis_row {
            (width, height)
        } else {
            (height, width)
        };
        let parent_node = &self.nodes[parent];
        let child_node = &self.nodes[child];
        let align = parent_node.align_item(child_node);
        let main_free = parent_node.layout.measured(main_axis.dimension())
            - child_node.layout.measured(main_axis.dimension());
        let cross_free = parent_node.layout.measured(cross_axis.dimension())
            - child_node.layout.measured(cross_axis.dimension());

        let main_position = if child_node.is_trailing_pos_defined(main_axis)
            && !child_node.is_leading_pos_defined(main_axis)
        {
            Some(
                main_free
                    - parent_node.trailing_border(main_axis)
                    - child_node.trailing_margin(main_axis, width)
                    - child_node.trailing_position(main_axis, main_size),
            )
        } else if child_node.is_leading_pos_defined(main_axis) {
            None
        } else {
            match parent_node.style.justify_content {
                Justify::Center => Some(main_free / 2.0),
                Justify::FlexEnd => Some(main_free),
                _ => None,
            }
        };

        let cross_position = if child_node.is_trailing_pos_defined(cross_axis)
            && !child_node.is_leading_pos_defined(cross_axis)
        {
            Some(
                cross_free
                    - parent_node.trailing_border(cross_axis)
                    - child_node.trailing_margin(cross_axis, width)
                    - child_node.trailing_position(cross_axis, cross_size),
            )
        } else if child_node.is_leading_pos_defined(cross_axis) {
            None
        } else if align == Align::Center {
            Some(cross_free / 2.0)
        } else if (align == Align::FlexEnd) != (parent_node.style.flex_wrap == Wrap::WrapReverse) {
            Some(cross_free)
        } else {
            None
        };

        let layout = &mut self.nodes[child].layout;
        if let Some(position) = main_position {
            layout.set_position(main_axis.leading_edge(), position);
        }
        if let Some(position) = cross_position {
            layout.set_position(cross_axis.leading_edge(), position);
        }
        Ok(())
    }
}
