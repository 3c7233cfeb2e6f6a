//! Ordered child list with explicit growth.

use crate::node::NodeId;

/// Capacity of the first allocation.
const INITIAL_CAPACITY: usize = 4;

/// Ordered list of child handles.
///
/// Grows by doubling, starting at four slots. A list can be shared between
/// a node and its clone until one of them needs to mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NodeList {
    items: Vec<NodeId>,
}

impl NodeList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn grow_for_one(&mut self) {
        if self.items.len() < self.items.capacity() {
            return;
        }
        let additional = if self.items.capacity() == 0 {
            INITIAL_CAPACITY
        } else {
            self.items.capacity()
        };
        self.items.reserve_exact(additional);
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, node: NodeId) {
        self.grow_for_one();
        self.items.push(node);
    }

    /// Insert at `index`, clamped to the end of the list.
    pub(crate) fn insert(&mut self, index: usize, node: NodeId) {
        self.grow_for_one();
        let index = index.min(self.items.len());
        self.items.insert(index, node);
    }

    pub(crate) fn replace(&mut self, index: usize, node: NodeId) {
        if let Some(slot) = self.items.get_mut(index) {
            *slot = node;
        }
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<NodeId> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Remove the first occurrence of `node`.
    pub(crate) fn delete(&mut self, node: NodeId) -> Option<NodeId> {
        let index = self.items.iter().position(|&item| item == node)?;
        self.remove(index)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn get(&self, index: usize) -> Option<NodeId> {
        self.items.get(index).copied()
    }

    pub(crate) fn first(&self) -> Option<NodeId> {
        self.items.first().copied()
    }

    /// Copy of the handles, or `None` when there is nothing to share.
    pub(crate) fn shallow_clone(&self) -> Option<Self> {
        if self.items.is_empty() {
            return None;
        }
        let mut copy = Self::with_capacity(self.items.capacity());
        copy.items.extend_from_slice(&self.items);
        Some(copy)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items.iter().copied()
    }

    pub(crate) fn as_slice(&self) -> &[NodeId] {
        &self.items
    }
}
