//! Sapling: a flexbox layout engine.
//!
//! Re-exports the value types of `sapling-core` and the node engine of
//! `sapling-layout`. Most users only need the [`prelude`].
//!
//! ```
//! use sapling::prelude::*;
//!
//! let mut engine = LayoutEngine::new();
//! let root = engine.new_node();
//! engine.set_width(root, Value::Point(200.0)).unwrap();
//! engine.set_height(root, Value::Point(100.0)).unwrap();
//! engine.calculate_layout(root, f32::NAN, f32::NAN, Direction::Ltr).unwrap();
//! assert_eq!(engine.layout(root).unwrap().width, 200.0);
//! ```

#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub use sapling_core::*;
pub use sapling_layout as layout;
pub use sapling_layout::{
    BaselineFunc, CloneNodeFunc, Config, ConfigId, ErrorKind, Layout, LayoutEngine, LayoutError,
    LayoutStats, Logger, MeasureFunc, NodeId, PrintFunc, Result, Style, MAX_CACHED_MEASUREMENTS,
};

/// The types needed to build and lay out a tree.
pub mod prelude {
    pub use sapling_core::{
        Align, Direction, Display, Edge, FlexDirection, Justify, MeasureMode, Overflow,
        PositionType, PrintOptions, Size, Value, Wrap,
    };
    pub use sapling_layout::{Config, Layout, LayoutEngine, LayoutError, NodeId, Style};
}
