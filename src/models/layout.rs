//! UI node positions.
//!
//! Presentation state persisted next to a plan. The scheduler never reads it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a course node on the plan canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodePosition {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl NodePosition {
    /// Creates a position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node positions keyed by course id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeLayout {
    positions: BTreeMap<String, NodePosition>,
}

impl NodeLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the position of a course node.
    pub fn with_position(mut self, course_id: impl Into<String>, position: NodePosition) -> Self {
        self.positions.insert(course_id.into(), position);
        self
    }

    /// Sets the position of a course node in place.
    pub fn set(&mut self, course_id: impl Into<String>, position: NodePosition) {
        self.positions.insert(course_id.into(), position);
    }

    /// Position of a course node.
    pub fn get(&self, course_id: &str) -> Option<NodePosition> {
        self.positions.get(course_id).copied()
    }

    /// Drops positions of courses not in `keep`.
    pub fn retain_courses(&mut self, keep: impl Fn(&str) -> bool) {
        self.positions.retain(|id, _| keep(id));
    }

    /// Iterates positions in course id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodePosition)> {
        self.positions.iter().map(|(id, pos)| (id.as_str(), *pos))
    }

    /// Number of positioned nodes.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no node is positioned.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_set_and_get() {
        let mut layout = NodeLayout::new().with_position("A", NodePosition::new(10.0, 20.0));
        layout.set("B", NodePosition::new(-5.0, 0.5));

        assert_eq!(layout.get("A"), Some(NodePosition::new(10.0, 20.0)));
        assert_eq!(layout.len(), 2);
        assert!(layout.get("C").is_none());
    }

    #[test]
    fn test_layout_serializes_as_map() {
        let layout = NodeLayout::new().with_position("A", NodePosition::new(1.0, 2.0));
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json, serde_json::json!({"A": {"x": 1.0, "y": 2.0}}));
    }

    #[test]
    fn test_retain_courses() {
        let mut layout = NodeLayout::new()
            .with_position("A", NodePosition::default())
            .with_position("B", NodePosition::default());
        layout.retain_courses(|id| id == "B");
        let ids: Vec<&str> = layout.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["B"]);
    }
}
