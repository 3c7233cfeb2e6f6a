//! Core types for the Sapling flexbox layout engine.
//!
//! This crate holds everything that does not need a node tree:
//! - Length values: [`Value`], [`Unit`] and the [`UNDEFINED`] sentinel
//! - Per-edge storage with shorthand fallback: [`Edges`]
//! - Style enumerations and axis tables: [`FlexDirection`], [`Align`], ...
//! - Geometry: [`Size`], [`Rect`]
//! - Pixel-grid rounding: [`round_value_to_pixel_grid`]

mod edges;
mod enums;
mod geometry;
mod pixel;
mod value;

pub use edges::Edges;
pub use enums::{
    Align, Dimension, Direction, Display, Edge, ExperimentalFeature, FlexDirection, Justify,
    LogLevel, MeasureMode, NodeType, Overflow, PositionType, PrintOptions, Wrap,
};
pub use geometry::{Rect, Size};
pub use pixel::{has_fractional_pixels, round_value_to_pixel_grid};
pub use value::{floats_equal, is_undefined, max_defined, Unit, Value, EPSILON, UNDEFINED};
