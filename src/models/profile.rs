//! Student profile model.
//!
//! Holds the scheduling request (required courses, transfer credits, timing
//! knobs) and, once planned, the semester-by-semester assignment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Course;

/// Longest planning window, in semesters from `current_semester` through
/// `time_to_graduate`, accepted by profile validation, blob decoding, and
/// plan edits.
pub const MAX_PLAN_SEMESTERS: u32 = 100;

/// A student's scheduling request and its computed plan.
///
/// # Semester Indexing
/// Semesters are numbered from 1. `semesters[k]` holds the courses of
/// absolute semester `current_semester + k`. `time_to_graduate` is the last
/// semester a course may occupy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Courses the student must complete.
    pub required_courses: BTreeSet<String>,
    /// Courses already completed elsewhere.
    pub transfer_credits: BTreeSet<String>,
    /// Last semester index allowed in the plan.
    pub time_to_graduate: u32,
    /// Maximum courses per semester.
    pub course_per_semester: u32,
    /// First semester to plan (>= 1).
    pub current_semester: u32,
    /// Computed plan. Empty until the assigner runs.
    pub semesters: Vec<Vec<Course>>,
}

impl StudentProfile {
    /// Creates an empty profile with the given timing knobs, starting at semester 1.
    pub fn new(time_to_graduate: u32, course_per_semester: u32) -> Self {
        Self {
            required_courses: BTreeSet::new(),
            transfer_credits: BTreeSet::new(),
            time_to_graduate,
            course_per_semester,
            current_semester: 1,
            semesters: Vec::new(),
        }
    }

    /// Adds a required course.
    pub fn with_required(mut self, id: impl Into<String>) -> Self {
        self.required_courses.insert(id.into());
        self
    }

    /// Adds several required courses.
    pub fn with_required_all<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_courses.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Adds a transfer credit.
    pub fn with_transfer_credit(mut self, id: impl Into<String>) -> Self {
        self.transfer_credits.insert(id.into());
        self
    }

    /// Sets the first semester to plan.
    pub fn with_current_semester(mut self, semester: u32) -> Self {
        self.current_semester = semester;
        self
    }

    /// Replaces the plan.
    pub fn with_semesters(mut self, semesters: Vec<Vec<Course>>) -> Self {
        self.semesters = semesters;
        self
    }

    /// Required courses that still need a semester slot.
    pub fn pending_courses(&self) -> BTreeSet<&str> {
        self.required_courses
            .iter()
            .filter(|id| !self.transfer_credits.contains(*id))
            .map(String::as_str)
            .collect()
    }

    /// Absolute semester number of plan slot `index`, saturating at `u32::MAX`.
    #[inline]
    pub fn semester_number(&self, index: usize) -> u32 {
        let offset = u32::try_from(index).unwrap_or(u32::MAX);
        self.current_semester.saturating_add(offset)
    }

    /// Absolute semester holding the given course, if placed.
    pub fn semester_of(&self, course_id: &str) -> Option<u32> {
        self.semesters
            .iter()
            .position(|sem| sem.iter().any(|c| c.id == course_id))
            .map(|idx| self.semester_number(idx))
    }

    /// Number of placed course slots.
    pub fn placed_course_count(&self) -> usize {
        self.semesters.iter().map(Vec::len).sum()
    }

    /// Absolute number of the last planned semester, `None` if the plan is empty.
    pub fn last_semester(&self) -> Option<u32> {
        if self.semesters.is_empty() {
            None
        } else {
            Some(self.semester_number(self.semesters.len() - 1))
        }
    }

    /// Plan reduced to course ids.
    pub fn semester_ids(&self) -> Vec<Vec<String>> {
        self.semesters
            .iter()
            .map(|sem| sem.iter().map(|c| c.id.clone()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planned() -> StudentProfile {
        StudentProfile::new(4, 2)
            .with_required_all(["A", "B", "C"])
            .with_transfer_credit("A")
            .with_current_semester(3)
            .with_semesters(vec![vec![Course::new("B")], vec![Course::new("C")]])
    }

    #[test]
    fn test_profile_builder() {
        let p = planned();
        assert_eq!(p.required_courses.len(), 3);
        assert!(p.transfer_credits.contains("A"));
        assert_eq!(p.time_to_graduate, 4);
        assert_eq!(p.course_per_semester, 2);
        assert_eq!(p.current_semester, 3);
    }

    #[test]
    fn test_pending_courses_exclude_transfers() {
        let p = planned();
        let pending: Vec<&str> = p.pending_courses().into_iter().collect();
        assert_eq!(pending, vec!["B", "C"]);
    }

    #[test]
    fn test_semester_lookup_is_absolute() {
        let p = planned();
        assert_eq!(p.semester_of("B"), Some(3));
        assert_eq!(p.semester_of("C"), Some(4));
        assert_eq!(p.semester_of("A"), None);
        assert_eq!(p.last_semester(), Some(4));
        assert_eq!(p.placed_course_count(), 2);
    }

    #[test]
    fn test_empty_plan() {
        let p = StudentProfile::new(8, 4);
        assert_eq!(p.current_semester, 1);
        assert_eq!(p.last_semester(), None);
        assert!(p.semester_ids().is_empty());
    }

    #[test]
    fn test_semester_number_saturates() {
        let p = StudentProfile::new(u32::MAX, 1).with_current_semester(u32::MAX - 1);
        assert_eq!(p.semester_number(0), u32::MAX - 1);
        assert_eq!(p.semester_number(1), u32::MAX);
        assert_eq!(p.semester_number(5), u32::MAX);
    }
}
