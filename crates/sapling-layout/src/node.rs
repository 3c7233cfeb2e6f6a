//! Node records and the box-model queries the algorithm runs on them.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use sapling_core::{
    Align, Dimension, Direction, Edge, FlexDirection, MeasureMode, NodeType, PositionType, Size,
    Value, UNDEFINED,
};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::cache::MeasureCache;
use crate::config::ConfigId;
use crate::node_list::NodeList;
use crate::style::Style;

new_key_type! {
    /// Handle to a node owned by a [`LayoutEngine`](crate::LayoutEngine).
    pub struct NodeId;
}

/// Measures a leaf: `(node, width, width_mode, height, height_mode) -> size`.
///
/// Sizes passed in exclude margin, padding and border.
pub type MeasureFunc = Rc<dyn Fn(NodeId, f32, MeasureMode, f32, MeasureMode) -> Size>;

/// Reports the baseline of a node given its measured width and height.
pub type BaselineFunc = Rc<dyn Fn(NodeId, f32, f32) -> f32>;

/// Text inserted into the printed element of a node.
pub type PrintFunc = Rc<dyn Fn(NodeId) -> String>;

/// Resolved layout of a node, relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Offset of the left edge.
    pub left: f32,
    /// Offset of the top edge.
    pub top: f32,
    /// Offset from the parent's right edge.
    pub right: f32,
    /// Offset from the parent's bottom edge.
    pub bottom: f32,
    /// Border-box width.
    pub width: f32,
    /// Border-box height.
    pub height: f32,
    /// Resolved inline direction.
    pub direction: Direction,
    /// Content needed more main-axis space than was available.
    pub had_overflow: bool,
}

/// Mutable per-node output of the algorithm.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LayoutState {
    /// Indexed by `Left`, `Top`, `Right`, `Bottom`.
    pub position: [f32; 4],
    pub dimensions: [f32; 2],
    /// Indexed by `Left` through `End`.
    pub margin: [f32; 6],
    pub border: [f32; 6],
    pub padding: [f32; 6],
    pub direction: Direction,
    pub computed_flex_basis_generation: u32,
    pub computed_flex_basis: f32,
    pub had_overflow: bool,
    pub generation_count: u32,
    /// `None` until the node has been laid out once.
    pub last_parent_direction: Option<Direction>,
    pub cache: MeasureCache,
    pub measured_dimensions: [f32; 2],
}

impl LayoutState {
    /// Every field zero, as left behind for `display: none` subtrees.
    pub(crate) fn zeroed() -> Self {
        Self {
            position: [0.0; 4],
            dimensions: [0.0; 2],
            margin: [0.0; 6],
            border: [0.0; 6],
            padding: [0.0; 6],
            direction: Direction::Inherit,
            computed_flex_basis_generation: 0,
            computed_flex_basis: 0.0,
            had_overflow: false,
            generation_count: 0,
            last_parent_direction: Some(Direction::Inherit),
            cache: MeasureCache::zeroed(),
            measured_dimensions: [0.0; 2],
        }
    }

    pub(crate) fn measured(&self, dimension: Dimension) -> f32 {
        self.measured_dimensions[dimension.index()]
    }

    pub(crate) fn set_measured(&mut self, dimension: Dimension, value: f32) {
        self.measured_dimensions[dimension.index()] = value;
    }

    pub(crate) fn position(&self, edge: Edge) -> f32 {
        self.position[edge.index()]
    }

    pub(crate) fn set_position(&mut self, edge: Edge, value: f32) {
        self.position[edge.index()] = value;
    }
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            position: [0.0; 4],
            dimensions: [UNDEFINED; 2],
            margin: [0.0; 6],
            border: [0.0; 6],
            padding: [0.0; 6],
            direction: Direction::Inherit,
            computed_flex_basis_generation: 0,
            computed_flex_basis: UNDEFINED,
            had_overflow: false,
            generation_count: 0,
            last_parent_direction: None,
            cache: MeasureCache::new(),
            measured_dimensions: [UNDEFINED; 2],
        }
    }
}

/// A node of the layout tree.
#[derive(Clone)]
pub(crate) struct Node {
    pub style: Style,
    pub layout: LayoutState,
    pub line_index: usize,
    pub parent: Option<NodeId>,
    pub children: NodeList,
    pub measure: Option<MeasureFunc>,
    pub baseline: Option<BaselineFunc>,
    pub print: Option<PrintFunc>,
    pub config: ConfigId,
    pub context: Option<Rc<dyn Any>>,
    pub is_dirty: bool,
    pub has_new_layout: bool,
    pub node_type: NodeType,
    /// Per dimension, whether the max size stands in for the preferred size.
    pub resolved_from_max: [bool; 2],
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("style", &self.style)
            .field("layout", &self.layout)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("has_measure", &self.measure.is_some())
            .field("has_baseline", &self.baseline.is_some())
            .field("is_dirty", &self.is_dirty)
            .field("node_type", &self.node_type)
            .finish_non_exhaustive()
    }
}

impl Node {
    pub(crate) fn new(config: ConfigId, use_web_defaults: bool) -> Self {
        Self {
            style: if use_web_defaults {
                Style::web_defaults()
            } else {
                Style::default()
            },
            layout: LayoutState::default(),
            line_index: 0,
            parent: None,
            children: NodeList::new(),
            measure: None,
            baseline: None,
            print: None,
            config,
            context: None,
            is_dirty: false,
            has_new_layout: true,
            node_type: NodeType::Default,
            resolved_from_max: [false; 2],
        }
    }

    // --- flex factors ---

    pub(crate) fn resolve_flex_grow(&self) -> f32 {
        if self.parent.is_none() {
            return 0.0;
        }
        if !self.style.flex_grow.is_nan() {
            return self.style.flex_grow;
        }
        if !self.style.flex.is_nan() && self.style.flex > 0.0 {
            return self.style.flex;
        }
        0.0
    }

    pub(crate) fn resolve_flex_shrink(&self, use_web_defaults: bool) -> f32 {
        if self.parent.is_none() {
            return 0.0;
        }
        if !self.style.flex_shrink.is_nan() {
            return self.style.flex_shrink;
        }
        if !use_web_defaults && !self.style.flex.is_nan() && self.style.flex < 0.0 {
            return -self.style.flex;
        }
        if use_web_defaults {
            1.0
        } else {
            0.0
        }
    }

    pub(crate) fn resolve_flex_basis(&self, use_web_defaults: bool) -> Value {
        if !matches!(self.style.flex_basis, Value::Auto | Value::Undefined) {
            return self.style.flex_basis;
        }
        if !self.style.flex.is_nan() && self.style.flex > 0.0 {
            return if use_web_defaults {
                Value::Auto
            } else {
                Value::ZERO
            };
        }
        Value::Auto
    }

    pub(crate) fn is_flex(&self, use_web_defaults: bool) -> bool {
        self.style.position_type == PositionType::Relative
            && (self.resolve_flex_grow() != 0.0 || self.resolve_flex_shrink(use_web_defaults) != 0.0)
    }

    // --- direction and alignment ---

    pub(crate) fn resolve_direction(&self, parent_direction: Direction) -> Direction {
        match self.style.direction {
            Direction::Inherit => match parent_direction {
                Direction::Inherit => Direction::Ltr,
                resolved => resolved,
            },
            own => own,
        }
    }

    /// Cross-axis alignment this node applies to `child`.
    pub(crate) fn align_item(&self, child: &Self) -> Align {
        let align = if child.style.align_self == Align::Auto {
            self.style.align_items
        } else {
            child.style.align_self
        };
        if align == Align::Baseline && self.style.flex_direction.is_column() {
            return Align::FlexStart;
        }
        align
    }

    // --- margin, padding, border ---

    pub(crate) fn leading_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let start = self.style.margin.get(Edge::Start);
        if axis.is_row() && !start.is_undefined() {
            return start.resolve_margin(width_size);
        }
        self.style
            .margin
            .computed(axis.leading_edge(), Value::ZERO)
            .resolve_margin(width_size)
    }

    pub(crate) fn trailing_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let end = self.style.margin.get(Edge::End);
        if axis.is_row() && !end.is_undefined() {
            return end.resolve_margin(width_size);
        }
        self.style
            .margin
            .computed(axis.trailing_edge(), Value::ZERO)
            .resolve_margin(width_size)
    }

    pub(crate) fn leading_padding(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let start = self.style.padding.get(Edge::Start);
        if axis.is_row() && !start.is_undefined() && start.resolve(width_size) >= 0.0 {
            return start.resolve(width_size);
        }
        self.style
            .padding
            .computed(axis.leading_edge(), Value::ZERO)
            .resolve(width_size)
            .max(0.0)
    }

    pub(crate) fn trailing_padding(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let end = self.style.padding.get(Edge::End);
        if axis.is_row() && !end.is_undefined() && end.resolve(width_size) >= 0.0 {
            return end.resolve(width_size);
        }
        self.style
            .padding
            .computed(axis.trailing_edge(), Value::ZERO)
            .resolve(width_size)
            .max(0.0)
    }

    pub(crate) fn leading_border(&self, axis: FlexDirection) -> f32 {
        let start = self.style.border.get(Edge::Start);
        if axis.is_row() && !start.is_undefined() && start.value() >= 0.0 {
            return start.value();
        }
        self.style
            .border
            .computed(axis.leading_edge(), Value::ZERO)
            .value()
            .max(0.0)
    }

    pub(crate) fn trailing_border(&self, axis: FlexDirection) -> f32 {
        let end = self.style.border.get(Edge::End);
        if axis.is_row() && !end.is_undefined() && end.value() >= 0.0 {
            return end.value();
        }
        self.style
            .border
            .computed(axis.trailing_edge(), Value::ZERO)
            .value()
            .max(0.0)
    }

    pub(crate) fn leading_padding_and_border(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_padding(axis, width_size) + self.leading_border(axis)
    }

    pub(crate) fn trailing_padding_and_border(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.trailing_padding(axis, width_size) + self.trailing_border(axis)
    }

    pub(crate) fn margin_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_margin(axis, width_size) + self.trailing_margin(axis, width_size)
    }

    pub(crate) fn padding_and_border_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_padding_and_border(axis, width_size)
            + self.trailing_padding_and_border(axis, width_size)
    }

    /// Raw leading margin, used to detect `auto` margins.
    pub(crate) fn margin_leading_value(&self, axis: FlexDirection) -> Value {
        let start = self.style.margin.get(Edge::Start);
        if axis.is_row() && !start.is_undefined() {
            start
        } else {
            self.style.margin.get(axis.leading_edge())
        }
    }

    /// Raw trailing margin, used to detect `auto` margins.
    pub(crate) fn margin_trailing_value(&self, axis: FlexDirection) -> Value {
        let end = self.style.margin.get(Edge::End);
        if axis.is_row() && !end.is_undefined() {
            end
        } else {
            self.style.margin.get(axis.trailing_edge())
        }
    }

    pub(crate) fn dim_with_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.layout.measured(axis.dimension())
            + self.leading_margin(axis, width_size)
            + self.trailing_margin(axis, width_size)
    }

    // --- position offsets ---

    pub(crate) fn is_leading_pos_defined(&self, axis: FlexDirection) -> bool {
        (axis.is_row()
            && !self
                .style
                .position
                .computed(Edge::Start, Value::Undefined)
                .is_undefined())
            || !self
                .style
                .position
                .computed(axis.leading_edge(), Value::Undefined)
                .is_undefined()
    }

    pub(crate) fn is_trailing_pos_defined(&self, axis: FlexDirection) -> bool {
        (axis.is_row()
            && !self
                .style
                .position
                .computed(Edge::End, Value::Undefined)
                .is_undefined())
            || !self
                .style
                .position
                .computed(axis.trailing_edge(), Value::Undefined)
                .is_undefined()
    }

    pub(crate) fn leading_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if axis.is_row() {
            let start = self.style.position.computed(Edge::Start, Value::Undefined);
            if !start.is_undefined() {
                return start.resolve(axis_size);
            }
        }
        let leading = self
            .style
            .position
            .computed(axis.leading_edge(), Value::Undefined);
        if leading.is_undefined() {
            0.0
        } else {
            leading.resolve(axis_size)
        }
    }

    pub(crate) fn trailing_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if axis.is_row() {
            let end = self.style.position.computed(Edge::End, Value::Undefined);
            if !end.is_undefined() {
                return end.resolve(axis_size);
            }
        }
        let trailing = self
            .style
            .position
            .computed(axis.trailing_edge(), Value::Undefined);
        if trailing.is_undefined() {
            0.0
        } else {
            trailing.resolve(axis_size)
        }
    }

    /// Leading offset if set, otherwise the negated trailing offset.
    pub(crate) fn relative_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if self.is_leading_pos_defined(axis) {
            self.leading_position(axis, axis_size)
        } else {
            -self.trailing_position(axis, axis_size)
        }
    }

    // --- dimensions ---

    /// Select the preferred size per axis: the max size when it equals the
    /// min size, the declared size otherwise.
    pub(crate) fn resolve_dimensions(&mut self) {
        for dimension in [Dimension::Width, Dimension::Height] {
            let max = self.style.max_dimension(dimension);
            self.resolved_from_max[dimension.index()] =
                !max.is_undefined() && max.approx_eq(self.style.min_dimension(dimension));
        }
    }

    pub(crate) fn resolved_dimension(&self, dimension: Dimension) -> Value {
        if self.resolved_from_max[dimension.index()] {
            self.style.max_dimension(dimension)
        } else {
            self.style.dimension(dimension)
        }
    }

    pub(crate) fn is_style_dim_defined(&self, axis: FlexDirection, parent_size: f32) -> bool {
        match self.resolved_dimension(axis.dimension()) {
            Value::Auto | Value::Undefined => false,
            Value::Point(v) => v >= 0.0,
            Value::Percent(v) => v >= 0.0 && !parent_size.is_nan(),
        }
    }

    pub(crate) fn is_layout_dim_defined(&self, axis: FlexDirection) -> bool {
        let value = self.layout.measured(axis.dimension());
        !value.is_nan() && value >= 0.0
    }

    pub(crate) fn bound_axis_within_min_and_max(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
    ) -> f32 {
        let dimension = axis.dimension();
        let min = self.style.min_dimension(dimension).resolve(axis_size);
        let max = self.style.max_dimension(dimension).resolve(axis_size);

        let mut bound = value;
        if !max.is_nan() && max >= 0.0 && bound > max {
            bound = max;
        }
        if !min.is_nan() && min >= 0.0 && bound < min {
            bound = min;
        }
        bound
    }

    /// Clamp to min/max, never below padding plus border.
    pub(crate) fn bound_axis(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
        width_size: f32,
    ) -> f32 {
        self.bound_axis_within_min_and_max(axis, value, axis_size)
            .max(self.padding_and_border_for_axis(axis, width_size))
    }

    /// Tighten a child's proposed size and mode by its max size.
    pub(crate) fn constrain_max_size_for_mode(
        &self,
        axis: FlexDirection,
        parent_axis_size: f32,
        parent_width: f32,
        mode: &mut MeasureMode,
        size: &mut f32,
    ) {
        let max_size = self
            .style
            .max_dimension(axis.dimension())
            .resolve(parent_axis_size)
            + self.margin_for_axis(axis, parent_width);
        match *mode {
            MeasureMode::Exactly | MeasureMode::AtMost => {
                if !(max_size.is_nan() || *size < max_size) {
                    *size = max_size;
                }
            }
            MeasureMode::Undefined => {
                if !max_size.is_nan() {
                    *mode = MeasureMode::AtMost;
                    *size = max_size;
                }
            }
        }
    }
}
