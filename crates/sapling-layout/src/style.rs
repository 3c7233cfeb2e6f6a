//! Style properties of a node.

use sapling_core::{
    Align, Dimension, Direction, Display, Edges, FlexDirection, Justify, Overflow, PositionType,
    Value, Wrap, UNDEFINED,
};
use serde::{Deserialize, Serialize};

fn is_nan(value: &f32) -> bool {
    value.is_nan()
}

/// Every input the layout algorithm reads from a node.
///
/// Float factors use [`UNDEFINED`] for "not set" and are omitted from the
/// serialized form in that case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Style {
    /// Inline direction.
    pub direction: Direction,
    /// Main axis.
    pub flex_direction: FlexDirection,
    /// Main-axis distribution.
    pub justify_content: Justify,
    /// Line distribution on the cross axis.
    pub align_content: Align,
    /// Default cross-axis alignment of children.
    pub align_items: Align,
    /// Cross-axis alignment override.
    pub align_self: Align,
    /// Relative or absolute.
    pub position_type: PositionType,
    /// Line wrapping.
    pub flex_wrap: Wrap,
    /// Overflow behavior.
    pub overflow: Overflow,
    /// `none` removes the node from layout.
    pub display: Display,
    /// `flex` shorthand.
    #[serde(skip_serializing_if = "is_nan")]
    pub flex: f32,
    /// Grow factor.
    #[serde(skip_serializing_if = "is_nan")]
    pub flex_grow: f32,
    /// Shrink factor.
    #[serde(skip_serializing_if = "is_nan")]
    pub flex_shrink: f32,
    /// Initial main size.
    pub flex_basis: Value,
    /// Outer spacing.
    pub margin: Edges,
    /// Offsets.
    pub position: Edges,
    /// Inner spacing.
    pub padding: Edges,
    /// Border widths.
    pub border: Edges,
    /// Preferred width.
    pub width: Value,
    /// Preferred height.
    pub height: Value,
    /// Lower width bound.
    pub min_width: Value,
    /// Lower height bound.
    pub min_height: Value,
    /// Upper width bound.
    pub max_width: Value,
    /// Upper height bound.
    pub max_height: Value,
    /// Width divided by height.
    #[serde(skip_serializing_if = "is_nan")]
    pub aspect_ratio: f32,
}

impl Style {
    /// Defaults with the web overrides applied.
    #[must_use]
    pub fn web_defaults() -> Self {
        Self {
            flex_direction: FlexDirection::Row,
            align_content: Align::Stretch,
            ..Self::default()
        }
    }

    /// Preferred size along `dimension`.
    #[must_use]
    pub const fn dimension(&self, dimension: Dimension) -> Value {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
        }
    }

    /// Lower bound along `dimension`.
    #[must_use]
    pub const fn min_dimension(&self, dimension: Dimension) -> Value {
        match dimension {
            Dimension::Width => self.min_width,
            Dimension::Height => self.min_height,
        }
    }

    /// Upper bound along `dimension`.
    #[must_use]
    pub const fn max_dimension(&self, dimension: Dimension) -> Value {
        match dimension {
            Dimension::Width => self.max_width,
            Dimension::Height => self.max_height,
        }
    }

    pub(crate) fn dimension_mut(&mut self, dimension: Dimension) -> &mut Value {
        match dimension {
            Dimension::Width => &mut self.width,
            Dimension::Height => &mut self.height,
        }
    }

    pub(crate) fn min_dimension_mut(&mut self, dimension: Dimension) -> &mut Value {
        match dimension {
            Dimension::Width => &mut self.min_width,
            Dimension::Height => &mut self.min_height,
        }
    }

    pub(crate) fn max_dimension_mut(&mut self, dimension: Dimension) -> &mut Value {
        match dimension {
            Dimension::Width => &mut self.max_width,
            Dimension::Height => &mut self.max_height,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: UNDEFINED,
            flex_grow: UNDEFINED,
            flex_shrink: UNDEFINED,
            flex_basis: Value::Auto,
            margin: Edges::UNDEFINED,
            position: Edges::UNDEFINED,
            padding: Edges::UNDEFINED,
            border: Edges::UNDEFINED,
            width: Value::Auto,
            height: Value::Auto,
            min_width: Value::Undefined,
            min_height: Value::Undefined,
            max_width: Value::Undefined,
            max_height: Value::Undefined,
            aspect_ratio: UNDEFINED,
        }
    }
}

fn same_bits(a: f32, b: f32) -> bool {
    a.to_bits() == b.to_bits()
}

fn same_value(a: Value, b: Value) -> bool {
    a.unit() == b.unit() && same_bits(a.value(), b.value())
}

fn same_edges(a: &Edges, b: &Edges) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|((_, x), (_, y))| same_value(x, y))
}

// Bitwise comparison so that two unset factors compare equal.
impl PartialEq for Style {
    fn eq(&self, other: &Self) -> bool {
        self.direction == other.direction
            && self.flex_direction == other.flex_direction
            && self.justify_content == other.justify_content
            && self.align_content == other.align_content
            && self.align_items == other.align_items
            && self.align_self == other.align_self
            && self.position_type == other.position_type
            && self.flex_wrap == other.flex_wrap
            && self.overflow == other.overflow
            && self.display == other.display
            && same_bits(self.flex, other.flex)
            && same_bits(self.flex_grow, other.flex_grow)
            && same_bits(self.flex_shrink, other.flex_shrink)
            && same_bits(self.aspect_ratio, other.aspect_ratio)
            && same_value(self.flex_basis, other.flex_basis)
            && same_edges(&self.margin, &other.margin)
            && same_edges(&self.position, &other.position)
            && same_edges(&self.padding, &other.padding)
            && same_edges(&self.border, &other.border)
            && same_value(self.width, other.width)
            && same_value(self.height, other.height)
            && same_value(self.min_width, other.min_width)
            && same_value(self.min_height, other.min_height)
            && same_value(self.max_width, other.max_width)
            && same_value(self.max_height, other.max_height)
    }
}
