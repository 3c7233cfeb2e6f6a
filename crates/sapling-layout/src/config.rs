//! Engine configuration shared by nodes.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use sapling_core::{ExperimentalFeature, LogLevel};
use slotmap::new_key_type;
use tracing::{debug, error, info, trace, warn};

use crate::error::{LayoutError, Result};
use crate::node::NodeId;

new_key_type! {
    /// Handle to a [`Config`] owned by a [`LayoutEngine`](crate::LayoutEngine).
    pub struct ConfigId;
}

/// Receives engine log lines: `(node, level, message)`.
pub type Logger = Rc<dyn Fn(Option<NodeId>, LogLevel, &str)>;

/// Called after a shared child is copied: `(old, new, parent, child_index)`.
pub type CloneNodeFunc = Rc<dyn Fn(NodeId, NodeId, NodeId, usize)>;

/// Options that change how nodes bound to this config are laid out.
#[derive(Clone)]
pub struct Config {
    experimental_features: [bool; ExperimentalFeature::COUNT],
    use_web_defaults: bool,
    use_legacy_stretch_behaviour: bool,
    point_scale_factor: f32,
    print_tree: bool,
    logger: Option<Logger>,
    clone_node_callback: Option<CloneNodeFunc>,
    context: Option<Rc<dyn Any>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            experimental_features: [false; ExperimentalFeature::COUNT],
            use_web_defaults: false,
            use_legacy_stretch_behaviour: false,
            point_scale_factor: 1.0,
            print_tree: false,
            logger: None,
            clone_node_callback: None,
            context: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("experimental_features", &self.experimental_features)
            .field("use_web_defaults", &self.use_web_defaults)
            .field("use_legacy_stretch_behaviour", &self.use_legacy_stretch_behaviour)
            .field("point_scale_factor", &self.point_scale_factor)
            .field("print_tree", &self.print_tree)
            .field("has_logger", &self.logger.is_some())
            .field("has_clone_node_callback", &self.clone_node_callback.is_some())
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Config with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pixel density used for rounding.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NegativeScaleFactor`] for negative input.
    pub fn with_point_scale_factor(mut self, pixels_in_point: f32) -> Result<Self> {
        self.set_point_scale_factor(pixels_in_point)?;
        Ok(self)
    }

    /// Enable or disable an experimental feature.
    #[must_use]
    pub fn with_experimental_feature(mut self, feature: ExperimentalFeature, enabled: bool) -> Self {
        self.set_experimental_feature(feature, enabled);
        self
    }

    /// Use CSS defaults for new nodes.
    #[must_use]
    pub fn with_web_defaults(mut self, enabled: bool) -> Self {
        self.use_web_defaults = enabled;
        self
    }

    /// Keep the pre-fix stretch sizing of containers.
    #[must_use]
    pub fn with_legacy_stretch_behaviour(mut self, enabled: bool) -> Self {
        self.use_legacy_stretch_behaviour = enabled;
        self
    }

    /// Print the tree after every top-level layout.
    #[must_use]
    pub fn with_print_tree(mut self, enabled: bool) -> Self {
        self.print_tree = enabled;
        self
    }

    /// Route log lines through `logger`.
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Observe copy-on-write clones of shared children.
    #[must_use]
    pub fn with_clone_node_callback(mut self, callback: CloneNodeFunc) -> Self {
        self.clone_node_callback = Some(callback);
        self
    }

    /// Attach opaque user data.
    #[must_use]
    pub fn with_context(mut self, context: Rc<dyn Any>) -> Self {
        self.context = Some(context);
        self
    }

    /// Set the pixel density. Zero disables rounding.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NegativeScaleFactor`] for negative input.
    pub fn set_point_scale_factor(&mut self, pixels_in_point: f32) -> Result<()> {
        if pixels_in_point < 0.0 {
            let err = LayoutError::NegativeScaleFactor(pixels_in_point);
            self.log(None, LogLevel::Fatal, &err.to_string());
            return Err(err);
        }
        self.point_scale_factor = if pixels_in_point == 0.0 {
            0.0
        } else {
            pixels_in_point
        };
        Ok(())
    }

    pub fn point_scale_factor(&self) -> f32 {
        self.point_scale_factor
    }

    pub fn set_experimental_feature(&mut self, feature: ExperimentalFeature, enabled: bool) {
        self.experimental_features[feature.index()] = enabled;
    }

    pub fn is_experimental_feature_enabled(&self, feature: ExperimentalFeature) -> bool {
        self.experimental_features[feature.index()]
    }

    pub fn set_use_web_defaults(&mut self, enabled: bool) {
        self.use_web_defaults = enabled;
    }

    pub fn use_web_defaults(&self) -> bool {
        self.use_web_defaults
    }

    pub fn set_use_legacy_stretch_behaviour(&mut self, enabled: bool) {
        self.use_legacy_stretch_behaviour = enabled;
    }

    pub fn use_legacy_stretch_behaviour(&self) -> bool {
        self.use_legacy_stretch_behaviour
    }

    pub fn set_print_tree(&mut self, enabled: bool) {
        self.print_tree = enabled;
    }

    pub fn print_tree(&self) -> bool {
        self.print_tree
    }

    /// Replace the logger. `None` restores the tracing logger.
    pub fn set_logger(&mut self, logger: Option<Logger>) {
        self.logger = logger;
    }

    pub fn set_clone_node_callback(&mut self, callback: Option<CloneNodeFunc>) {
        self.clone_node_callback = callback;
    }

    pub fn clone_node_callback(&self) -> Option<&CloneNodeFunc> {
        self.clone_node_callback.as_ref()
    }

    pub fn set_context(&mut self, context: Option<Rc<dyn Any>>) {
        self.context = context;
    }

    pub fn context(&self) -> Option<&Rc<dyn Any>> {
        self.context.as_ref()
    }

    /// Emit a log line through the configured logger.
    pub fn log(&self, node: Option<NodeId>, level: LogLevel, message: &str) {
        match &self.logger {
            Some(logger) => logger(node, level, message),
            None => default_log(node, level, message),
        }
    }
}

fn default_log(node: Option<NodeId>, level: LogLevel, message: &str) {
    match level {
        LogLevel::Fatal | LogLevel::Error => error!(?node, "{message}"),
        LogLevel::Warn => warn!(?node, "{message}"),
        LogLevel::Info => info!(?node, "{message}"),
        LogLevel::Debug => debug!(?node, "{message}"),
        LogLevel::Verbose => trace!(?node, "{message}"),
    }
}
