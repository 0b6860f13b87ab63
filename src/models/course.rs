//! Course model.
//!
//! A course is a catalog unit linked to other courses through prerequisite
//! edges. Links are stored as id sets and resolved through the owning
//! [`CourseGraph`](crate::graph::CourseGraph), never as direct references.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Raw catalog record as supplied by the catalog provider.
///
/// Dependents are not known at this point; the graph builder derives them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Stable catalog key.
    pub id: String,
    /// Human-readable title.
    #[serde(default)]
    pub name: String,
    /// Ids of courses that must be completed first.
    #[serde(default)]
    pub prerequisite_ids: Vec<String>,
}

impl CourseRecord {
    /// Creates a record with no prerequisites.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            prerequisite_ids: Vec::new(),
        }
    }

    /// Sets the course name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a prerequisite id.
    pub fn with_prerequisite(mut self, id: impl Into<String>) -> Self {
        self.prerequisite_ids.push(id.into());
        self
    }
}

/// A linked catalog course.
///
/// `dependents` is exactly the one-hop inverse of `prerequisites` across the
/// whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Stable catalog key.
    pub id: String,
    /// Human-readable title.
    pub name: String,
    /// Direct prerequisites.
    pub prerequisites: BTreeSet<String>,
    /// Courses that list this one as a direct prerequisite.
    pub dependents: BTreeSet<String>,
}

impl Course {
    /// Creates an unlinked course.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            prerequisites: BTreeSet::new(),
            dependents: BTreeSet::new(),
        }
    }

    /// Sets the course name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a direct prerequisite.
    pub fn with_prerequisite(mut self, id: impl Into<String>) -> Self {
        self.prerequisites.insert(id.into());
        self
    }

    /// Adds a direct dependent.
    pub fn with_dependent(mut self, id: impl Into<String>) -> Self {
        self.dependents.insert(id.into());
        self
    }

    /// Number of direct dependents.
    pub fn fan_out(&self) -> usize {
        self.dependents.len()
    }

    /// Whether the course has no prerequisites.
    pub fn is_entry_level(&self) -> bool {
        self.prerequisites.is_empty()
    }
}

impl From<&Course> for CourseRecord {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            name: course.name.clone(),
            prerequisite_ids: course.prerequisites.iter().cloned().collect(),
        }
    }
}
