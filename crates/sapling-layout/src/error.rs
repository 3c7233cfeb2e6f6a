//! Error types for sapling-layout.

use sapling_core::Edge;
use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Broad classification of a [`LayoutError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller broke a documented contract of the tree API.
    PreconditionViolated,
    /// A measure or baseline callback returned an undefined value.
    InvalidCallbackResult,
    /// A node or config handle does not refer to a live entry.
    InvalidHandle,
}

/// Errors reported by the layout engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Inserting a node that is still attached elsewhere.
    #[error("Child already has a parent, it must be removed first")]
    ChildAlreadyHasParent,

    /// Adding children to a node that measures itself.
    #[error("Cannot add child: nodes with measure functions cannot have children")]
    MeasuredNodeCannotHaveChildren,

    /// Setting a measure function on a node with children.
    #[error("Cannot set measure function: nodes with measure functions cannot have children")]
    ChildrenPreventMeasureFunc,

    /// Resetting a node that still has children.
    #[error("Cannot reset a node which still has children attached")]
    ResetWithChildren,

    /// Resetting a node that is still attached to a parent.
    #[error("Cannot reset a node still attached to a parent")]
    ResetWithParent,

    /// Manual dirty marking without a measure function.
    #[error("Only leaf nodes with custom measure functions should manually mark themselves as dirty")]
    MarkDirtyWithoutMeasureFunc,

    /// Reading a resolved layout edge through a shorthand.
    #[error("Cannot get layout properties of multi-edge shorthands ({0})")]
    ShorthandEdge(Edge),

    /// Negative point scale factor.
    #[error("Scale factor should not be less than zero, got {0}")]
    NegativeScaleFactor(f32),

    /// Freeing a config that nodes still reference.
    #[error("Cannot free config: {nodes} node(s) still use it")]
    ConfigInUse {
        /// Number of nodes bound to the config.
        nodes: usize,
    },

    /// Freeing the engine's default config.
    #[error("Cannot free the default config")]
    DefaultConfig,

    /// Measure callback produced NaN.
    #[error("Measure function returned an undefined size ({width}, {height})")]
    UndefinedMeasurement {
        /// Reported width.
        width: f32,
        /// Reported height.
        height: f32,
    },

    /// Baseline callback produced NaN.
    #[error("Expected custom baseline function to not return NaN")]
    UndefinedBaseline,

    /// Child index past the end of the child list.
    #[error("Child index {index} out of bounds for {count} children")]
    ChildIndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of children.
        count: usize,
    },

    /// Stale or foreign node handle.
    #[error("Unknown node handle")]
    UnknownNode,

    /// Stale or foreign config handle.
    #[error("Unknown config handle")]
    UnknownConfig,
}

impl LayoutError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ChildAlreadyHasParent
            | Self::MeasuredNodeCannotHaveChildren
            | Self::ChildrenPreventMeasureFunc
            | Self::ResetWithChildren
            | Self::ResetWithParent
            | Self::MarkDirtyWithoutMeasureFunc
            | Self::ShorthandEdge(_)
            | Self::NegativeScaleFactor(_)
            | Self::ConfigInUse { .. }
            | Self::DefaultConfig
            | Self::ChildIndexOutOfBounds { .. } => ErrorKind::PreconditionViolated,
            Self::UndefinedMeasurement { .. } | Self::UndefinedBaseline => {
                ErrorKind::InvalidCallbackResult
            }
            Self::UnknownNode | Self::UnknownConfig => ErrorKind::InvalidHandle,
        }
    }

    /// Shorthand for `kind() == ErrorKind::PreconditionViolated`.
    #[must_use]
    pub fn is_precondition_violation(&self) -> bool {
        self.kind() == ErrorKind::PreconditionViolated
    }
}
