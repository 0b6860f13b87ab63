//! Course dependency graph.
//!
//! Builds a linked, acyclic graph from raw catalog records. Courses live in
//! an arena sorted by id; prerequisite and dependent links are id sets
//! resolved through an id → slot index.
//!
//! Detects:
//! - Duplicate catalog ids
//! - Prerequisites that reference unknown courses
//! - Prerequisite cycles (three-color DFS)
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)
//! Kahn (1962), "Topological sorting of large networks"

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, instrument, warn};

use crate::error::{PlanError, Result};
use crate::models::{Course, CourseRecord};

/// DFS marking used by cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// A fully linked course catalog.
///
/// Immutable once built. Safe to share read-only between concurrent
/// planning requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseGraph {
    courses: Vec<Course>,
    index: HashMap<String, usize>,
}

/// Builds the course graph from catalog records.
///
/// Same catalog (in any record order) → same graph, same error.
///
/// # Errors
/// - [`PlanError::DuplicateCourse`] if two records share an id
/// - [`PlanError::UnknownCourse`] if a prerequisite id is not in the catalog
/// - [`PlanError::Cycle`] if the prerequisite relation is cyclic
#[instrument(skip_all, fields(courses = catalog.len()))]
pub fn build_graph(catalog: &[CourseRecord]) -> Result<CourseGraph> {
    let mut records: Vec<&CourseRecord> = catalog.iter().collect();
    records.sort_by(|a, b| a.id.cmp(&b.id));

    for pair in records.windows(2) {
        if pair[0].id == pair[1].id {
            return Err(PlanError::DuplicateCourse(pair[0].id.clone()));
        }
    }

    let index: HashMap<String, usize> = records
        .iter()
        .enumerate()
        .map(|(slot, rec)| (rec.id.clone(), slot))
        .collect();

    let mut courses: Vec<Course> = records
        .iter()
        .map(|rec| Course {
            id: rec.id.clone(),
            name: rec.name.clone(),
            prerequisites: rec.prerequisite_ids.iter().cloned().collect(),
            dependents: BTreeSet::new(),
        })
        .collect();

    // Invert prerequisite edges: prerequisite slot → dependent id
    let mut inverse: Vec<(usize, String)> = Vec::new();
    for course in &courses {
        for prereq in &course.prerequisites {
            let slot = index.get(prereq).copied().ok_or_else(|| {
                PlanError::unknown_course(prereq, format!("prerequisites of '{}'", course.id))
            })?;
            inverse.push((slot, course.id.clone()));
        }
    }
    for (slot, dependent) in inverse {
        courses[slot].dependents.insert(dependent);
    }

    let graph = CourseGraph { courses, index };

    if let Some(course_ids) = graph.find_cycle() {
        warn!(cycle = ?course_ids, "prerequisite cycle in catalog");
        return Err(PlanError::Cycle { course_ids });
    }

    debug!(edges = graph.edge_count(), "course graph built");
    Ok(graph)
}

impl CourseGraph {
    /// Looks up a course by id.
    pub fn get(&self, id: &str) -> Option<&Course> {
        self.index_of(id).map(|slot| &self.courses[slot])
    }

    /// Whether the catalog contains the id.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Arena slot of a course.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Course at an arena slot.
    ///
    /// # Panics
    /// If `slot >= self.len()`.
    pub fn course_at(&self, slot: usize) -> &Course {
        &self.courses[slot]
    }

    /// All courses, sorted by id.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// All course ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.courses.iter().map(|c| c.id.as_str())
    }

    /// Number of courses.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Number of prerequisite edges.
    pub fn edge_count(&self) -> usize {
        self.courses.iter().map(|c| c.prerequisites.len()).sum()
    }

    /// Direct prerequisites of a course.
    pub fn prerequisites_of(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.get(id).map(|c| &c.prerequisites)
    }

    /// Direct dependents of a course.
    pub fn dependents_of(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.get(id).map(|c| &c.dependents)
    }

    /// The given courses plus every transitive prerequisite.
    ///
    /// # Errors
    /// [`PlanError::UnknownCourse`] if a seed id is not in the catalog.
    pub fn prerequisite_closure<'i, I>(&self, ids: I) -> Result<BTreeSet<&str>>
    where
        I: IntoIterator<Item = &'i str>,
    {
        let mut closure = BTreeSet::new();
        let mut stack = Vec::new();
        for id in ids {
            let course = self
                .get(id)
                .ok_or_else(|| PlanError::unknown_course(id, "prerequisite closure request"))?;
            stack.push(course);
        }

        while let Some(course) = stack.pop() {
            if !closure.insert(course.id.as_str()) {
                continue;
            }
            stack.extend(course.prerequisites.iter().filter_map(|p| self.get(p)));
        }

        Ok(closure)
    }

    /// Topological order (prerequisites first) of the given courses.
    ///
    /// Only edges between members of `subset` are considered. Ready courses
    /// are released in id order, so the result is deterministic.
    ///
    /// # Errors
    /// - [`PlanError::UnknownCourse`] if a subset id is not in the catalog
    /// - [`PlanError::Cycle`] naming the courses never released
    pub fn topological_order<'a, I>(&self, subset: I) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut member = vec![false; self.courses.len()];
        for id in subset {
            let slot = self
                .index_of(id)
                .ok_or_else(|| PlanError::unknown_course(id, "topological order request"))?;
            member[slot] = true;
        }

        let mut indegree = vec![0usize; self.courses.len()];
        for (slot, course) in self.courses.iter().enumerate() {
            if !member[slot] {
                continue;
            }
            indegree[slot] = course
                .prerequisites
                .iter()
                .filter_map(|p| self.index_of(p))
                .filter(|&p| member[p])
                .count();
        }

        // Slots are in id order, so a BTreeSet doubles as a min-id queue.
        let mut ready: BTreeSet<usize> = (0..self.courses.len())
            .filter(|&slot| member[slot] && indegree[slot] == 0)
            .collect();
        let expected = member.iter().filter(|&&m| m).count();
        let mut order = Vec::with_capacity(expected);

        while let Some(slot) = ready.pop_first() {
            order.push(slot);
            for dependent in &self.courses[slot].dependents {
                let Some(d) = self.index_of(dependent) else {
                    continue;
                };
                if !member[d] {
                    continue;
                }
                indegree[d] -= 1;
                if indegree[d] == 0 {
                    ready.insert(d);
                }
            }
        }

        if order.len() < expected {
            let course_ids: Vec<String> = (0..self.courses.len())
                .filter(|&slot| member[slot] && indegree[slot] > 0)
                .map(|slot| self.courses[slot].id.clone())
                .collect();
            return Err(PlanError::Cycle { course_ids });
        }

        Ok(order)
    }

    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.courses.len()];
        let mut path = Vec::new();

        for start in 0..self.courses.len() {
            if marks[start] == Mark::Unvisited {
                if let Some(cycle) = self.visit(start, &mut marks, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    fn visit(&self, node: usize, marks: &mut [Mark], path: &mut Vec<usize>) -> Option<Vec<String>> {
        marks[node] = Mark::InProgress;
        path.push(node);

        for prereq in &self.courses[node].prerequisites {
            let Some(next) = self.index_of(prereq) else {
                continue;
            };
            match marks[next] {
                Mark::InProgress => {
                    // Back edge: the cycle is the path suffix starting at `next`.
                    let start = path.iter().position(|&n| n == next).unwrap_or(0);
                    let mut ids: Vec<String> = path[start..]
                        .iter()
                        .map(|&n| self.courses[n].id.clone())
                        .collect();
                    ids.sort();
                    return Some(ids);
                }
                Mark::Unvisited => {
                    if let Some(cycle) = self.visit(next, marks, path) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }

        path.pop();
        marks[node] = Mark::Done;
        None
    }
}
