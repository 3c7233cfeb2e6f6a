//! Node arena, configs and tree mutation.

use std::any::Any;
use std::rc::Rc;

use sapling_core::{LogLevel, NodeType};
use slotmap::SlotMap;

use crate::config::{Config, ConfigId};
use crate::error::{LayoutError, Result};
use crate::node::{BaselineFunc, LayoutState, MeasureFunc, Node, NodeId, PrintFunc};
use crate::node_list::NodeList;
use crate::style::Style;

/// Counters collected while computing layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Top-level `calculate_layout` calls that ran the algorithm.
    pub layouts: usize,
    /// Layout requests answered from a node cache.
    pub cache_hits: usize,
    /// Layout requests that ran the algorithm on a node.
    pub cache_misses: usize,
    /// Calls into user measure functions.
    pub measure_calls: usize,
}

impl LayoutStats {
    /// Fraction of node requests served from cache.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

/// Owns every node and config, and runs layouts over them.
///
/// Nodes are addressed by [`NodeId`] handles. A handle stays valid until
/// the node is freed; using it afterwards yields
/// [`LayoutError::UnknownNode`].
#[derive(Debug)]
pub struct LayoutEngine {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) configs: SlotMap<ConfigId, Config>,
    default_config: ConfigId,
    /// Bumped once per top-level layout pass.
    pub(crate) generation: u32,
    /// Recursion depth of the current pass, for tracing.
    pub(crate) depth: usize,
    /// Scale factor of the root config for the current pass.
    pub(crate) point_scale_factor: f32,
    pub(crate) stats: LayoutStats,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    /// Create an engine with a default config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an engine whose default config is `config`.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let mut configs = SlotMap::with_key();
        let default_config = configs.insert(config);
        Self {
            nodes: SlotMap::with_key(),
            configs,
            default_config,
            generation: 0,
            depth: 0,
            point_scale_factor: 1.0,
            stats: LayoutStats::default(),
        }
    }

    /// Counters since creation or the last [`reset_stats`](Self::reset_stats).
    #[must_use]
    pub const fn stats(&self) -> &LayoutStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = LayoutStats::default();
    }

    // =========================================================================
    // Configs
    // =========================================================================

    /// Config used by [`new_node`](Self::new_node).
    #[must_use]
    pub const fn default_config(&self) -> ConfigId {
        self.default_config
    }

    /// Register a config.
    pub fn new_config(&mut self, config: Config) -> ConfigId {
        self.configs.insert(config)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownConfig`] for a stale handle.
    pub fn config(&self, id: ConfigId) -> Result<&Config> {
        self.configs.get(id).ok_or(LayoutError::UnknownConfig)
    }

    /// Changes apply to the next layout of nodes bound to `id`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownConfig`] for a stale handle.
    pub fn config_mut(&mut self, id: ConfigId) -> Result<&mut Config> {
        self.configs.get_mut(id).ok_or(LayoutError::UnknownConfig)
    }

    /// Overwrite every option of `dest` with those of `src`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownConfig`] if either handle is stale.
    pub fn copy_config(&mut self, dest: ConfigId, src: ConfigId) -> Result<()> {
        let copy = self.config(src)?.clone();
        *self.config_mut(dest)? = copy;
        Ok(())
    }

    /// Remove a config no node uses.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DefaultConfig`] for the default config and
    /// [`LayoutError::ConfigInUse`] while nodes reference it.
    pub fn free_config(&mut self, id: ConfigId) -> Result<Config> {
        if id == self.default_config {
            return Err(self.fatal(None, LayoutError::DefaultConfig));
        }
        self.config(id)?;
        let nodes = self.nodes.values().filter(|node| node.config == id).count();
        if nodes > 0 {
            return Err(self.fatal(None, LayoutError::ConfigInUse { nodes }));
        }
        self.configs.remove(id).ok_or(LayoutError::UnknownConfig)
    }

    #[must_use]
    pub fn config_count(&self) -> usize {
        self.configs.len()
    }

    /// Config a node is bound to.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn node_config(&self, id: NodeId) -> Result<ConfigId> {
        Ok(self.node(id)?.config)
    }

    pub(crate) fn config_of(&self, node: &Node) -> &Config {
        self.configs
            .get(node.config)
            .unwrap_or(&self.configs[self.default_config])
    }

    /// Log `err` as fatal through the node's config and hand it back.
    pub(crate) fn fatal(&self, node: Option<NodeId>, err: LayoutError) -> LayoutError {
        self.log(node, LogLevel::Fatal, &err.to_string());
        err
    }

    /// Log through the node's config, or the default config.
    pub(crate) fn log(&self, node: Option<NodeId>, level: LogLevel, message: &str) {
        let config = match node.and_then(|id| self.nodes.get(id)) {
            Some(n) => self.config_of(n),
            None => &self.configs[self.default_config],
        };
        config.log(node, level, message);
    }

    // =========================================================================
    // Node lifecycle
    // =========================================================================

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(LayoutError::UnknownNode)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(LayoutError::UnknownNode)
    }

    /// Create a node bound to the default config.
    pub fn new_node(&mut self) -> NodeId {
        let config = self.default_config;
        let web = self.configs[config].use_web_defaults();
        self.nodes.insert(Node::new(config, web))
    }

    /// Create a node bound to `config`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownConfig`] for a stale handle.
    pub fn new_node_with_config(&mut self, config: ConfigId) -> Result<NodeId> {
        let web = self.config(config)?.use_web_defaults();
        Ok(self.nodes.insert(Node::new(config, web)))
    }

    /// Shallow copy: the clone shares children with `id` and has no parent.
    ///
    /// The children keep `id` as their parent, so the first mutation of
    /// either node's child list copies them.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn clone_node(&mut self, id: NodeId) -> Result<NodeId> {
        let mut copy = self.node(id)?.clone();
        copy.children = copy.children.shallow_clone().unwrap_or_default();
        copy.parent = None;
        Ok(self.nodes.insert(copy))
    }

    /// Free a single node, detaching it from its parent.
    ///
    /// Children it owns lose their parent but stay alive. The parent is
    /// not marked dirty.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn free_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.nodes.remove(id).ok_or(LayoutError::UnknownNode)?;
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.delete(id);
        }
        for child in node.children.iter() {
            if let Some(child) = self.nodes.get_mut(child) {
                if child.parent == Some(id) {
                    child.parent = None;
                }
            }
        }
        Ok(())
    }

    /// Free `root` and every descendant it owns.
    ///
    /// Stops descending at the first shared child of a node.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn free_recursive(&mut self, root: NodeId) -> Result<()> {
        self.node(root)?;
        let mut pending = vec![root];
        let mut order = Vec::new();
        while let Some(id) = pending.pop() {
            loop {
                let Some(child) = self.nodes.get(id).and_then(|n| n.children.first()) else {
                    break;
                };
                if self.nodes.get(child).and_then(|c| c.parent) != Some(id) {
                    break;
                }
                self.remove_child(id, child)?;
                pending.push(child);
            }
            order.push(id);
        }
        for id in order {
            self.free_node(id)?;
        }
        Ok(())
    }

    /// Restore the default style and layout, keeping the config.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ResetWithChildren`] or [`LayoutError::ResetWithParent`]
    /// if the node is still part of a tree.
    pub fn reset_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if !node.children.is_empty() {
            return Err(self.fatal(Some(id), LayoutError::ResetWithChildren));
        }
        if node.parent.is_some() {
            return Err(self.fatal(Some(id), LayoutError::ResetWithParent));
        }
        let config = node.config;
        let web = self.config_of(node).use_web_defaults();
        *self.node_mut(id)? = Node::new(config, web);
        Ok(())
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// Insert `child` at `index` in `parent`'s child list.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::ChildAlreadyHasParent`] if `child` is attached
    /// - [`LayoutError::MeasuredNodeCannotHaveChildren`] if `parent` has a
    ///   measure function
    /// - [`LayoutError::ChildIndexOutOfBounds`] if `index` exceeds the count
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        if self.node(child)?.parent.is_some() {
            return Err(self.fatal(Some(child), LayoutError::ChildAlreadyHasParent));
        }
        let parent_node = self.node(parent)?;
        if parent_node.measure.is_some() {
            return Err(self.fatal(Some(parent), LayoutError::MeasuredNodeCannotHaveChildren));
        }
        let count = parent_node.children.len();
        if index > count {
            return Err(self.fatal(
                Some(parent),
                LayoutError::ChildIndexOutOfBounds { index, count },
            ));
        }

        self.clone_children_if_needed(parent)?;
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.mark_dirty_internal(parent);
        Ok(())
    }

    /// Append `child` to `parent`'s child list.
    ///
    /// # Errors
    ///
    /// Same as [`insert_child`](Self::insert_child).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.child_count(parent)?;
        self.insert_child(parent, child, index)
    }

    /// Detach `excluded` from `parent`.
    ///
    /// When the children are shared with another node, the remaining ones
    /// are cloned so that the other node's tree is untouched.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn remove_child(&mut self, parent: NodeId, excluded: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        let Some(first) = parent_node.children.first() else {
            return Ok(());
        };

        if self.node(first)?.parent == Some(parent) {
            if self.node_mut(parent)?.children.delete(excluded).is_some() {
                let child = self.node_mut(excluded)?;
                child.layout = LayoutState::default();
                child.parent = None;
                self.mark_dirty_internal(parent);
            }
            return Ok(());
        }

        // Children are shared: clone all but the excluded one in place.
        let callback = self.config_of(parent_node).clone_node_callback().cloned();
        let old_children: Vec<NodeId> = parent_node.children.iter().collect();
        let mut next_insert_index = 0;
        for old_child in old_children {
            if old_child == excluded {
                self.mark_dirty_internal(parent);
                continue;
            }
            let new_child = self.clone_node(old_child)?;
            self.node_mut(parent)?
                .children
                .replace(next_insert_index, new_child);
            self.node_mut(new_child)?.parent = Some(parent);
            if let Some(callback) = &callback {
                callback(old_child, new_child, parent, next_insert_index);
            }
            next_insert_index += 1;
        }
        self.node_mut(parent)?.children.truncate(next_insert_index);
        Ok(())
    }

    /// Detach every child of `parent`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        let Some(first) = parent_node.children.first() else {
            return Ok(());
        };

        if self.node(first)?.parent == Some(parent) {
            let children: Vec<NodeId> = parent_node.children.iter().collect();
            for child in children {
                if let Some(child) = self.nodes.get_mut(child) {
                    child.layout = LayoutState::default();
                    child.parent = None;
                }
            }
            self.node_mut(parent)?.children.clear();
        } else {
            // Shared children belong to another node; just let go of them.
            self.node_mut(parent)?.children = NodeList::new();
        }
        self.mark_dirty_internal(parent);
        Ok(())
    }

    /// Child at `index`, or `None` past the end.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn child(&self, parent: NodeId, index: usize) -> Result<Option<NodeId>> {
        Ok(self.node(parent)?.children.get(index))
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn children(&self, parent: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(parent)?.children.as_slice())
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn child_count(&self, parent: NodeId) -> Result<usize> {
        Ok(self.node(parent)?.children.len())
    }

    /// Owning parent. A shared child reports its original owner.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Replace shared children of `parent` with private copies.
    pub(crate) fn clone_children_if_needed(&mut self, parent: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        let Some(first) = parent_node.children.first() else {
            return Ok(());
        };
        if self.node(first)?.parent == Some(parent) {
            return Ok(());
        }

        let callback = self.config_of(parent_node).clone_node_callback().cloned();
        let old_children: Vec<NodeId> = parent_node.children.iter().collect();
        for (index, old_child) in old_children.into_iter().enumerate() {
            let new_child = self.clone_node(old_child)?;
            self.node_mut(parent)?.children.replace(index, new_child);
            self.node_mut(new_child)?.parent = Some(parent);
            if let Some(callback) = &callback {
                callback(old_child, new_child, parent, index);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Callbacks and user data
    // =========================================================================

    /// Install or clear the measure function.
    ///
    /// A node with a measure function is a text node and may not have
    /// children.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ChildrenPreventMeasureFunc`] when installing on a
    /// node with children.
    pub fn set_measure_func(&mut self, id: NodeId, measure: Option<MeasureFunc>) -> Result<()> {
        let node = self.node(id)?;
        let node_type = if measure.is_some() {
            if !node.children.is_empty() {
                return Err(self.fatal(Some(id), LayoutError::ChildrenPreventMeasureFunc));
            }
            NodeType::Text
        } else {
            NodeType::Default
        };
        let node = self.node_mut(id)?;
        node.measure = measure;
        node.node_type = node_type;
        Ok(())
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn has_measure_func(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.measure.is_some())
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_baseline_func(&mut self, id: NodeId, baseline: Option<BaselineFunc>) -> Result<()> {
        self.node_mut(id)?.baseline = baseline;
        Ok(())
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn has_baseline_func(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.baseline.is_some())
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_print_func(&mut self, id: NodeId, print: Option<PrintFunc>) -> Result<()> {
        self.node_mut(id)?.print = print;
        Ok(())
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_context(&mut self, id: NodeId, context: Option<Rc<dyn Any>>) -> Result<()> {
        self.node_mut(id)?.context = context;
        Ok(())
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn context(&self, id: NodeId) -> Result<Option<Rc<dyn Any>>> {
        Ok(self.node(id)?.context.clone())
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Force a measured leaf to be measured again.
    ///
    /// # Errors
    ///
    /// [`LayoutError::MarkDirtyWithoutMeasureFunc`] for nodes without a
    /// measure function.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<()> {
        if self.node(id)?.measure.is_none() {
            return Err(self.fatal(Some(id), LayoutError::MarkDirtyWithoutMeasureFunc));
        }
        self.mark_dirty_internal(id);
        Ok(())
    }

    /// Mark `id` and its ancestors dirty, stopping at the first node that
    /// already is.
    pub(crate) fn mark_dirty_internal(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.nodes.get_mut(id)) {
            if node.is_dirty {
                break;
            }
            node.is_dirty = true;
            node.layout.computed_flex_basis = f32::NAN;
            current = node.parent;
        }
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn is_dirty(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.is_dirty)
    }

    /// Whether the layout changed since the flag was last cleared.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn has_new_layout(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.has_new_layout)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_has_new_layout(&mut self, id: NodeId, value: bool) -> Result<()> {
        self.node_mut(id)?.has_new_layout = value;
        Ok(())
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn node_type(&self, id: NodeId) -> Result<NodeType> {
        Ok(self.node(id)?.node_type)
    }

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_node_type(&mut self, id: NodeId, node_type: NodeType) -> Result<()> {
        self.node_mut(id)?.node_type = node_type;
        Ok(())
    }

    // =========================================================================
    // Whole-style access
    // =========================================================================

    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn style(&self, id: NodeId) -> Result<&Style> {
        Ok(&self.node(id)?.style)
    }

    /// Replace the style, marking the node dirty if anything changed.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] for a stale handle.
    pub fn set_style(&mut self, id: NodeId, style: Style) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.style != style {
            node.style = style;
            self.mark_dirty_internal(id);
        }
        Ok(())
    }

    /// Copy the style of `src` onto `dest`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownNode`] if either handle is stale.
    pub fn copy_style(&mut self, dest: NodeId, src: NodeId) -> Result<()> {
        let style = self.node(src)?.style;
        self.set_style(dest, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sapling_core::{MeasureMode, Size};
    use std::cell::RefCell;

    fn measure_fixed() -> MeasureFunc {
        Rc::new(|_: NodeId, _: f32, _: MeasureMode, _: f32, _: MeasureMode| Size::new(10.0, 10.0))
    }

    fn clean(engine: &mut LayoutEngine, ids: &[NodeId]) {
        for &id in ids {
            engine.node_mut(id).unwrap().is_dirty = false;
        }
    }

    #[test]
    fn test_engine_new_node_defaults() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        assert_eq!(engine.node_count(), 1);
        assert_eq!(engine.parent(node).unwrap(), None);
        assert_eq!(engine.child_count(node).unwrap(), 0);
        assert!(!engine.is_dirty(node).unwrap());
        assert!(engine.has_new_layout(node).unwrap());
        assert_eq!(engine.node_type(node).unwrap(), NodeType::Default);
    }

    #[test]
    fn test_engine_web_defaults_config() {
        let mut engine = LayoutEngine::new();
        let config = engine.new_config(Config::new().with_web_defaults(true));
        let node = engine.new_node_with_config(config).unwrap();
        assert_eq!(*engine.style(node).unwrap(), Style::web_defaults());
    }

    #[test]
    fn test_engine_insert_and_query_children() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let a = engine.new_node();
        let b = engine.new_node();
        engine.insert_child(root, a, 0).unwrap();
        engine.insert_child(root, b, 0).unwrap();
        assert_eq!(engine.children(root).unwrap(), &[b, a]);
        assert_eq!(engine.child(root, 1).unwrap(), Some(a));
        assert_eq!(engine.child(root, 2).unwrap(), None);
        assert_eq!(engine.parent(a).unwrap(), Some(root));
        assert!(engine.is_dirty(root).unwrap());
    }

    #[test]
    fn test_engine_insert_rejects_attached_child() {
        let mut engine = LayoutEngine::new();
        let a = engine.new_node();
        let b = engine.new_node();
        let child = engine.new_node();
        engine.insert_child(a, child, 0).unwrap();
        let err = engine.insert_child(b, child, 0).unwrap_err();
        assert_eq!(err, LayoutError::ChildAlreadyHasParent);
        assert_eq!(engine.child_count(b).unwrap(), 0);
    }

    #[test]
    fn test_engine_insert_rejects_measured_parent() {
        let mut engine = LayoutEngine::new();
        let leaf = engine.new_node();
        let child = engine.new_node();
        engine.set_measure_func(leaf, Some(measure_fixed())).unwrap();
        assert_eq!(
            engine.insert_child(leaf, child, 0).unwrap_err(),
            LayoutError::MeasuredNodeCannotHaveChildren
        );
    }

    #[test]
    fn test_engine_insert_index_out_of_bounds() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let child = engine.new_node();
        let err = engine.insert_child(root, child, 1).unwrap_err();
        assert_eq!(err, LayoutError::ChildIndexOutOfBounds { index: 1, count: 0 });
        assert!(err.is_precondition_violation());
    }

    #[test]
    fn test_engine_measure_func_sets_node_type() {
        let mut engine = LayoutEngine::new();
        let leaf = engine.new_node();
        engine.set_measure_func(leaf, Some(measure_fixed())).unwrap();
        assert_eq!(engine.node_type(leaf).unwrap(), NodeType::Text);
        engine.set_measure_func(leaf, None).unwrap();
        assert_eq!(engine.node_type(leaf).unwrap(), NodeType::Default);

        let root = engine.new_node();
        engine.append_child(root, leaf).unwrap();
        assert_eq!(
            engine.set_measure_func(root, Some(measure_fixed())).unwrap_err(),
            LayoutError::ChildrenPreventMeasureFunc
        );
    }

    #[test]
    fn test_engine_remove_child_resets_layout() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let child = engine.new_node();
        engine.append_child(root, child).unwrap();
        engine.node_mut(child).unwrap().layout.dimensions = [5.0, 5.0];
        clean(&mut engine, &[root, child]);

        engine.remove_child(root, child).unwrap();
        assert_eq!(engine.child_count(root).unwrap(), 0);
        assert_eq!(engine.parent(child).unwrap(), None);
        assert!(engine.node(child).unwrap().layout.dimensions[0].is_nan());
        assert!(engine.is_dirty(root).unwrap());
    }

    #[test]
    fn test_engine_remove_missing_child_is_noop() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let child = engine.new_node();
        let stranger = engine.new_node();
        engine.append_child(root, child).unwrap();
        clean(&mut engine, &[root, child]);
        engine.remove_child(root, stranger).unwrap();
        assert_eq!(engine.child_count(root).unwrap(), 1);
        assert!(!engine.is_dirty(root).unwrap());
    }

    #[test]
    fn test_engine_remove_all_children() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let a = engine.new_node();
        let b = engine.new_node();
        engine.append_child(root, a).unwrap();
        engine.append_child(root, b).unwrap();
        engine.remove_all_children(root).unwrap();
        assert_eq!(engine.child_count(root).unwrap(), 0);
        assert_eq!(engine.parent(a).unwrap(), None);
        assert_eq!(engine.parent(b).unwrap(), None);
    }

    #[test]
    fn test_engine_dirty_propagates_to_root() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let mid = engine.new_node();
        let leaf = engine.new_node();
        engine.append_child(root, mid).unwrap();
        engine.append_child(mid, leaf).unwrap();
        engine.set_measure_func(leaf, Some(measure_fixed())).unwrap();
        clean(&mut engine, &[root, mid, leaf]);

        engine.mark_dirty(leaf).unwrap();
        assert!(engine.is_dirty(leaf).unwrap());
        assert!(engine.is_dirty(mid).unwrap());
        assert!(engine.is_dirty(root).unwrap());
        assert!(engine.node(mid).unwrap().layout.computed_flex_basis.is_nan());
    }

    #[test]
    fn test_engine_mark_dirty_requires_measure() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        assert_eq!(
            engine.mark_dirty(node).unwrap_err(),
            LayoutError::MarkDirtyWithoutMeasureFunc
        );
    }

    #[test]
    fn test_engine_fatal_goes_to_node_logger() {
        let lines: Rc<RefCell<Vec<LogLevel>>> = Rc::default();
        let sink = Rc::clone(&lines);
        let mut engine = LayoutEngine::new();
        let config = engine.new_config(Config::new().with_logger(Rc::new(
            move |_node: Option<NodeId>, level: LogLevel, _message: &str| {
                sink.borrow_mut().push(level);
            },
        )));
        let node = engine.new_node_with_config(config).unwrap();
        let _ = engine.mark_dirty(node);
        assert_eq!(*lines.borrow(), vec![LogLevel::Fatal]);
    }

    #[test]
    fn test_engine_free_node_detaches() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let mid = engine.new_node();
        let leaf = engine.new_node();
        engine.append_child(root, mid).unwrap();
        engine.append_child(mid, leaf).unwrap();

        engine.free_node(mid).unwrap();
        assert_eq!(engine.node_count(), 2);
        assert_eq!(engine.child_count(root).unwrap(), 0);
        assert_eq!(engine.parent(leaf).unwrap(), None);
        assert_eq!(engine.parent(mid).unwrap_err(), LayoutError::UnknownNode);
    }

    #[test]
    fn test_engine_free_recursive() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let a = engine.new_node();
        let b = engine.new_node();
        let c = engine.new_node();
        engine.append_child(root, a).unwrap();
        engine.append_child(root, b).unwrap();
        engine.append_child(a, c).unwrap();
        let keep = engine.new_node();

        engine.free_recursive(root).unwrap();
        assert_eq!(engine.node_count(), 1);
        assert!(engine.contains(keep));
    }

    #[test]
    fn test_engine_free_recursive_keeps_shared_children() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let child = engine.new_node();
        engine.append_child(root, child).unwrap();
        let copy = engine.clone_node(root).unwrap();

        engine.free_recursive(copy).unwrap();
        assert!(engine.contains(root));
        assert!(engine.contains(child));
        assert_eq!(engine.parent(child).unwrap(), Some(root));
    }

    #[test]
    fn test_engine_reset_node() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let child = engine.new_node();
        engine.append_child(root, child).unwrap();
        assert_eq!(engine.reset_node(root).unwrap_err(), LayoutError::ResetWithChildren);
        assert_eq!(engine.reset_node(child).unwrap_err(), LayoutError::ResetWithParent);

        engine.remove_child(root, child).unwrap();
        let mut style = Style::default();
        style.flex_grow = 3.0;
        engine.set_style(child, style).unwrap();
        engine.reset_node(child).unwrap();
        assert_eq!(*engine.style(child).unwrap(), Style::default());
        assert!(!engine.is_dirty(child).unwrap());
    }

    #[test]
    fn test_engine_clone_shares_children() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let child = engine.new_node();
        engine.append_child(root, child).unwrap();

        let copy = engine.clone_node(root).unwrap();
        assert_eq!(engine.children(copy).unwrap(), &[child]);
        assert_eq!(engine.parent(copy).unwrap(), None);
        assert_eq!(engine.parent(child).unwrap(), Some(root));
    }

    #[test]
    fn test_engine_insert_into_clone_copies_shared_children() {
        let calls: Rc<RefCell<Vec<(NodeId, NodeId, usize)>>> = Rc::default();
        let sink = Rc::clone(&calls);
        let mut engine = LayoutEngine::with_config(Config::new().with_clone_node_callback(Rc::new(
            move |old: NodeId, new: NodeId, _parent: NodeId, index: usize| {
                sink.borrow_mut().push((old, new, index));
            },
        )));
        let root = engine.new_node();
        let a = engine.new_node();
        let b = engine.new_node();
        engine.append_child(root, a).unwrap();
        engine.append_child(root, b).unwrap();

        let copy = engine.clone_node(root).unwrap();
        let extra = engine.new_node();
        engine.append_child(copy, extra).unwrap();

        assert_eq!(engine.children(root).unwrap(), &[a, b]);
        let copied = engine.children(copy).unwrap().to_vec();
        assert_eq!(copied.len(), 3);
        assert_ne!(copied[0], a);
        assert_ne!(copied[1], b);
        assert_eq!(copied[2], extra);
        assert_eq!(engine.parent(copied[0]).unwrap(), Some(copy));
        assert_eq!(engine.parent(a).unwrap(), Some(root));

        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (a, copied[0], 0));
        assert_eq!(calls[1], (b, copied[1], 1));
    }

    #[test]
    fn test_engine_remove_from_clone_keeps_original() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let a = engine.new_node();
        let b = engine.new_node();
        engine.append_child(root, a).unwrap();
        engine.append_child(root, b).unwrap();

        let copy = engine.clone_node(root).unwrap();
        engine.remove_child(copy, a).unwrap();

        assert_eq!(engine.children(root).unwrap(), &[a, b]);
        let remaining = engine.children(copy).unwrap().to_vec();
        assert_eq!(remaining.len(), 1);
        assert_ne!(remaining[0], b);
        assert_eq!(engine.parent(remaining[0]).unwrap(), Some(copy));
        assert_eq!(engine.parent(a).unwrap(), Some(root));
    }

    #[test]
    fn test_engine_remove_all_from_clone() {
        let mut engine = LayoutEngine::new();
        let root = engine.new_node();
        let a = engine.new_node();
        engine.append_child(root, a).unwrap();
        let copy = engine.clone_node(root).unwrap();
        engine.remove_all_children(copy).unwrap();
        assert_eq!(engine.child_count(copy).unwrap(), 0);
        assert_eq!(engine.parent(a).unwrap(), Some(root));
    }

    #[test]
    fn test_engine_copy_style_marks_dirty_on_change() {
        let mut engine = LayoutEngine::new();
        let a = engine.new_node();
        let b = engine.new_node();
        engine.copy_style(a, b).unwrap();
        assert!(!engine.is_dirty(a).unwrap());

        let mut style = Style::default();
        style.width = sapling_core::Value::Point(10.0);
        engine.set_style(b, style).unwrap();
        engine.copy_style(a, b).unwrap();
        assert!(engine.is_dirty(a).unwrap());
        assert_eq!(engine.style(a).unwrap().width, sapling_core::Value::Point(10.0));
    }

    #[test]
    fn test_engine_configs() {
        let mut engine = LayoutEngine::new();
        assert_eq!(engine.config_count(), 1);
        let config = engine.new_config(Config::new().with_print_tree(true));
        engine.copy_config(engine.default_config(), config).unwrap();
        assert!(engine.config(engine.default_config()).unwrap().print_tree());

        let node = engine.new_node_with_config(config).unwrap();
        assert_eq!(engine.node_config(node).unwrap(), config);
        assert_eq!(
            engine.free_config(config).unwrap_err(),
            LayoutError::ConfigInUse { nodes: 1 }
        );
        engine.free_node(node).unwrap();
        engine.free_config(config).unwrap();
        assert_eq!(engine.config(config).unwrap_err(), LayoutError::UnknownConfig);
        assert_eq!(
            engine.free_config(engine.default_config()).unwrap_err(),
            LayoutError::DefaultConfig
        );
    }

    #[test]
    fn test_engine_context() {
        let mut engine = LayoutEngine::new();
        let node = engine.new_node();
        assert!(engine.context(node).unwrap().is_none());
        engine.set_context(node, Some(Rc::new("label"))).unwrap();
        let context = engine.context(node).unwrap().unwrap();
        assert_eq!(context.downcast_ref::<&str>(), Some(&"label"));
    }

    #[test]
    fn test_engine_stats_hit_rate() {
        let stats = LayoutStats {
            layouts: 1,
            cache_hits: 3,
            cache_misses: 1,
            measure_calls: 0,
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(LayoutStats::default().hit_rate(), 0.0);
    }
}
