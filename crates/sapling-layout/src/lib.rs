#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]
//! Flexbox layout engine for Sapling node trees.
//!
//! A [`LayoutEngine`] owns every node and config. Nodes are addressed by
//! [`NodeId`] handles; styles are set through per-property setters that mark
//! the node dirty, and [`LayoutEngine::calculate_layout`] resolves positions
//! and sizes for a whole tree:
//!
//! ```
//! use sapling_layout::{Direction, FlexDirection, LayoutEngine, Value};
//!
//! let mut engine = LayoutEngine::new();
//! let root = engine.new_node();
//! engine.set_flex_direction(root, FlexDirection::Row).unwrap();
//! engine.set_width(root, Value::Point(300.0)).unwrap();
//! engine.set_height(root, Value::Point(100.0)).unwrap();
//!
//! let child = engine.new_node();
//! engine.set_flex_grow(child, 1.0).unwrap();
//! engine.append_child(root, child).unwrap();
//!
//! engine.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr).unwrap();
//! assert_eq!(engine.layout(child).unwrap().width, 300.0);
//! ```
//!
//! Results are memoized per node: a clean subtree asked for the same
//! constraints again is answered from its cache.

mod absolute;
mod cache;
mod calculate;
mod config;
mod engine;
mod error;
mod flex;
mod node;
mod node_list;
mod print;
mod properties;
mod style;

pub use cache::MAX_CACHED_MEASUREMENTS;
pub use config::{CloneNodeFunc, Config, ConfigId, Logger};
pub use engine::{LayoutEngine, LayoutStats};
pub use error::{ErrorKind, LayoutError, Result};
pub use node::{BaselineFunc, Layout, MeasureFunc, NodeId, PrintFunc};
pub use style::Style;

pub use sapling_core::{
    Align, Dimension, Direction, Display, Edge, Edges, ExperimentalFeature, FlexDirection, Justify,
    LogLevel, MeasureMode, NodeType, Overflow, PositionType, PrintOptions, Rect, Size, Unit, Value,
    Wrap, UNDEFINED,
};
