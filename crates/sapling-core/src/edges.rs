//! Per-edge style values with shorthand fallback.

use crate::enums::Edge;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Index;

/// One [`Value`] per [`Edge`], shorthands included.
///
/// Serializes as a map holding only the edges that are set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Edge, Value>", into = "BTreeMap<Edge, Value>")]
pub struct Edges([Value; Edge::COUNT]);

impl Edges {
    /// Every edge undefined.
    pub const UNDEFINED: Self = Self([Value::Undefined; Edge::COUNT]);

    /// Value stored for exactly this edge.
    #[must_use]
    pub const fn get(&self, edge: Edge) -> Value {
        self.0[edge.index()]
    }

    /// Store a value, reporting whether it changed.
    pub fn set(&mut self, edge: Edge, value: Value) -> bool {
        let slot = &mut self.0[edge.index()];
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    /// Value in effect for `edge` after applying shorthands.
    ///
    /// Falls back from the exact edge to `vertical`/`horizontal`, then
    /// `all`. Unset `start`/`end` stay undefined so callers can fall back
    /// to the physical edge; any other edge yields `default`.
    #[must_use]
    pub fn computed(&self, edge: Edge, default: Value) -> Value {
        let exact = self.get(edge);
        if !exact.is_undefined() {
            return exact;
        }

        let vertical = self.get(Edge::Vertical);
        if matches!(edge, Edge::Top | Edge::Bottom) && !vertical.is_undefined() {
            return vertical;
        }

        let horizontal = self.get(Edge::Horizontal);
        if matches!(edge, Edge::Left | Edge::Right | Edge::Start | Edge::End)
            && !horizontal.is_undefined()
        {
            return horizontal;
        }

        let all = self.get(Edge::All);
        if !all.is_undefined() {
            return all;
        }

        if matches!(edge, Edge::Start | Edge::End) {
            return Value::Undefined;
        }

        default
    }

    /// Iterate `(edge, value)` pairs in edge order.
    pub fn iter(&self) -> impl Iterator<Item = (Edge, Value)> + '_ {
        Edge::ALL.iter().map(move |&edge| (edge, self.get(edge)))
    }
}

impl Default for Edges {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl Index<Edge> for Edges {
    type Output = Value;

    fn index(&self, edge: Edge) -> &Self::Output {
        &self.0[edge.index()]
    }
}

impl From<BTreeMap<Edge, Value>> for Edges {
    fn from(map: BTreeMap<Edge, Value>) -> Self {
        let mut edges = Self::UNDEFINED;
        for (edge, value) in map {
            edges.0[edge.index()] = value;
        }
        edges
    }
}

impl From<Edges> for BTreeMap<Edge, Value> {
    fn from(edges: Edges) -> Self {
        edges.iter().filter(|(_, v)| !v.is_undefined()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_default_undefined() {
        let edges = Edges::default();
        assert!(edges.iter().all(|(_, v)| v.is_undefined()));
    }

    #[test]
    fn test_edges_set_reports_change() {
        let mut edges = Edges::default();
        assert!(edges.set(Edge::Left, Value::Point(4.0)));
        assert!(!edges.set(Edge::Left, Value::Point(4.0)));
        assert!(edges.set(Edge::Left, Value::Percent(4.0)));
    }

    #[test]
    fn test_edges_exact_wins() {
        let mut edges = Edges::default();
        edges.set(Edge::All, Value::Point(1.0));
        edges.set(Edge::Top, Value::Point(7.0));
        assert_eq!(edges.computed(Edge::Top, Value::ZERO), Value::Point(7.0));
        assert_eq!(edges.computed(Edge::Bottom, Value::ZERO), Value::Point(1.0));
    }

    #[test]
    fn test_edges_vertical_before_all() {
        let mut edges = Edges::default();
        edges.set(Edge::All, Value::Point(1.0));
        edges.set(Edge::Vertical, Value::Point(2.0));
        assert_eq!(edges.computed(Edge::Bottom, Value::ZERO), Value::Point(2.0));
        assert_eq!(edges.computed(Edge::Left, Value::ZERO), Value::Point(1.0));
    }

    #[test]
    fn test_edges_horizontal_covers_start_end() {
        let mut edges = Edges::default();
        edges.set(Edge::Horizontal, Value::Percent(5.0));
        assert_eq!(edges.computed(Edge::Start, Value::ZERO), Value::Percent(5.0));
        assert_eq!(edges.computed(Edge::Right, Value::ZERO), Value::Percent(5.0));
        assert_eq!(edges.computed(Edge::Top, Value::ZERO), Value::ZERO);
    }

    #[test]
    fn test_edges_start_end_stay_undefined() {
        let edges = Edges::default();
        assert_eq!(edges.computed(Edge::Start, Value::ZERO), Value::Undefined);
        assert_eq!(edges.computed(Edge::End, Value::ZERO), Value::Undefined);
        assert_eq!(edges.computed(Edge::Left, Value::ZERO), Value::ZERO);
    }

    #[test]
    fn test_edges_serialize_only_set_edges() {
        let mut edges = Edges::default();
        edges.set(Edge::Top, Value::Point(3.0));
        let json = serde_json::to_string(&edges).unwrap();
        assert_eq!(json, r#"{"top":{"point":3.0}}"#);
        let back: Edges = serde_json::from_str(&json).unwrap();
        assert_eq!(back, edges);
    }
}
