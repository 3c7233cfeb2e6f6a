//! Style and layout enumerations.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! named_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Kebab-case name as used by the debug printer.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Writing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Take the parent's direction
    #[default]
    Inherit,
    /// Left to right
    Ltr,
    /// Right to left
    Rtl,
}

named_enum!(Direction { Inherit => "inherit", Ltr => "ltr", Rtl => "rtl" });

/// Main axis of a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    /// Top to bottom
    #[default]
    Column,
    /// Bottom to top
    ColumnReverse,
    /// Start to end
    Row,
    /// End to start
    RowReverse,
}

named_enum!(FlexDirection {
    Column => "column",
    ColumnReverse => "column-reverse",
    Row => "row",
    RowReverse => "row-reverse",
});

impl FlexDirection {
    /// Whether the axis is horizontal.
    #[must_use]
    pub const fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// Whether the axis is vertical.
    #[must_use]
    pub const fn is_column(self) -> bool {
        matches!(self, Self::Column | Self::ColumnReverse)
    }

    /// Physical edge where items start.
    #[must_use]
    pub const fn leading_edge(self) -> Edge {
        match self {
            Self::Column => Edge::Top,
            Self::ColumnReverse => Edge::Bottom,
            Self::Row => Edge::Left,
            Self::RowReverse => Edge::Right,
        }
    }

    /// Physical edge where items end.
    #[must_use]
    pub const fn trailing_edge(self) -> Edge {
        match self {
            Self::Column => Edge::Bottom,
            Self::ColumnReverse => Edge::Top,
            Self::Row => Edge::Right,
            Self::RowReverse => Edge::Left,
        }
    }

    /// Dimension measured along the axis.
    #[must_use]
    pub const fn dimension(self) -> Dimension {
        if self.is_row() {
            Dimension::Width
        } else {
            Dimension::Height
        }
    }

    /// Swap the row axes under right-to-left.
    #[must_use]
    pub const fn resolve(self, direction: Direction) -> Self {
        match (direction, self) {
            (Direction::Rtl, Self::Row) => Self::RowReverse,
            (Direction::Rtl, Self::RowReverse) => Self::Row,
            _ => self,
        }
    }

    /// Axis perpendicular to this one.
    #[must_use]
    pub const fn cross(self, direction: Direction) -> Self {
        if self.is_column() {
            Self::Row.resolve(direction)
        } else {
            Self::Column
        }
    }
}

/// Main-axis distribution (`justify-content`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    /// Pack at the start
    #[default]
    FlexStart,
    /// Center on the line
    Center,
    /// Pack at the end
    FlexEnd,
    /// Even gaps, none at the edges
    SpaceBetween,
    /// Even gaps, half-size at the edges
    SpaceAround,
}

named_enum!(Justify {
    FlexStart => "flex-start",
    Center => "center",
    FlexEnd => "flex-end",
    SpaceBetween => "space-between",
    SpaceAround => "space-around",
});

/// Cross-axis alignment for `align-items`, `align-self` and `align-content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    /// Defer to the parent's `align-items`
    #[default]
    Auto,
    /// Align to the cross start
    FlexStart,
    /// Center on the cross axis
    Center,
    /// Align to the cross end
    FlexEnd,
    /// Fill the cross axis
    Stretch,
    /// Align first baselines
    Baseline,
    /// Lines only: even gaps, none at the edges
    SpaceBetween,
    /// Lines only: even gaps, half-size at the edges
    SpaceAround,
}

named_enum!(Align {
    Auto => "auto",
    FlexStart => "flex-start",
    Center => "center",
    FlexEnd => "flex-end",
    Stretch => "stretch",
    Baseline => "baseline",
    SpaceBetween => "space-between",
    SpaceAround => "space-around",
});

/// Positioning scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionType {
    /// Participates in flex layout
    #[default]
    Relative,
    /// Placed by offsets against the parent
    Absolute,
}

named_enum!(PositionType { Relative => "relative", Absolute => "absolute" });

/// Line wrapping (`flex-wrap`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Wrap {
    /// Single line
    #[default]
    NoWrap,
    /// Break into lines
    Wrap,
    /// Break into lines, stacked in reverse cross order
    WrapReverse,
}

named_enum!(Wrap { NoWrap => "no-wrap", Wrap => "wrap", WrapReverse => "wrap-reverse" });

/// Content overflow handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    /// Content may overflow
    #[default]
    Visible,
    /// Content is clipped
    Hidden,
    /// Content scrolls; children are measured unconstrained on the scroll axis
    Scroll,
}

named_enum!(Overflow { Visible => "visible", Hidden => "hidden", Scroll => "scroll" });

/// Display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    /// Laid out normally
    #[default]
    Flex,
    /// Removed from layout, sized to zero
    None,
}

named_enum!(Display { Flex => "flex", None => "none" });

/// Logical and physical box edges, including shorthands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Edge {
    /// Physical left
    Left,
    /// Physical top
    Top,
    /// Physical right
    Right,
    /// Physical bottom
    Bottom,
    /// Left in LTR, right in RTL
    Start,
    /// Right in LTR, left in RTL
    End,
    /// Shorthand for left, right, start and end
    Horizontal,
    /// Shorthand for top and bottom
    Vertical,
    /// Shorthand for every edge
    All,
}

named_enum!(Edge {
    Left => "left",
    Top => "top",
    Right => "right",
    Bottom => "bottom",
    Start => "start",
    End => "end",
    Horizontal => "horizontal",
    Vertical => "vertical",
    All => "all",
});

impl Edge {
    /// Number of edges, shorthands included.
    pub const COUNT: usize = 9;

    /// Slot in per-edge arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Box dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    /// Horizontal extent
    Width,
    /// Vertical extent
    Height,
}

named_enum!(Dimension { Width => "width", Height => "height" });

impl Dimension {
    /// Slot in per-dimension arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How an available size constrains a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasureMode {
    /// Unconstrained; report the natural size
    #[default]
    Undefined,
    /// The size is fixed
    Exactly,
    /// The size is an upper bound
    AtMost,
}

named_enum!(MeasureMode { Undefined => "undefined", Exactly => "exactly", AtMost => "at-most" });

/// Whether a node measures its own content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    /// Plain container
    #[default]
    Default,
    /// Leaf with a measure function
    Text,
}

named_enum!(NodeType { Default => "default", Text => "text" });

/// Severity passed to a logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    /// Recoverable failure
    Error,
    /// Suspicious input
    Warn,
    /// Informational
    Info,
    /// Debug output such as printed trees
    Debug,
    /// Very chatty tracing
    Verbose,
    /// Contract violation
    Fatal,
}

named_enum!(LogLevel {
    Error => "error",
    Warn => "warn",
    Info => "info",
    Debug => "debug",
    Verbose => "verbose",
    Fatal => "fatal",
});

/// Opt-in behaviour changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentalFeature {
    /// Recompute a cached flex basis once per layout generation
    WebFlexBasis,
}

named_enum!(ExperimentalFeature { WebFlexBasis => "web-flex-basis" });

impl ExperimentalFeature {
    /// Number of experimental features.
    pub const COUNT: usize = 1;

    /// Slot in feature arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Sections included when printing a node tree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PrintOptions: u8 {
        /// Computed position and size
        const LAYOUT = 1 << 0;
        /// Non-default style properties
        const STYLE = 1 << 1;
        /// Recurse into children
        const CHILDREN = 1 << 2;
    }
}
