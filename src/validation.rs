//! Profile and plan validation.
//!
//! Checks a student profile against the catalog before any graph work,
//! and re-checks plan invariants after planning or editing. Detects:
//! - Required courses or transfer credits missing from the catalog
//! - Non-positive timing knobs
//! - Pending courses whose prerequisites are neither required nor transferred
//! - Precedence, capacity, and horizon violations in a plan
//!
//! Validators collect every problem instead of stopping at the first one.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::graph::CourseGraph;
use crate::models::{CourseRecord, StudentProfile, MAX_PLAN_SEMESTERS};

/// Whether every element of `candidate` is in `reference`.
///
/// The empty set is a subset of every set.
pub fn is_subset_of<T: Ord>(candidate: &BTreeSet<T>, reference: &BTreeSet<T>) -> bool {
    candidate.iter().all(|item| reference.contains(item))
}

/// Elements of `candidate` that are absent from `reference`, in order.
pub fn missing_from<'a, T: Ord>(
    candidate: &'a BTreeSet<T>,
    reference: &BTreeSet<T>,
) -> Vec<&'a T> {
    candidate
        .iter()
        .filter(|item| !reference.contains(*item))
        .collect()
}

/// A problem found in a student profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileViolation {
    /// Violation category.
    pub kind: ProfileViolationKind,
    /// Offending course ids (empty for knob violations).
    pub course_ids: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of profile violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileViolationKind {
    /// A required course is not in the catalog.
    UnknownRequiredCourse,
    /// A transfer credit is not in the catalog.
    UnknownTransferCredit,
    /// `time_to_graduate`, `course_per_semester`, or `current_semester` is out of range.
    InvalidTimingKnob,
    /// A pending course needs a prerequisite that is neither required nor transferred.
    MissingPrerequisite,
}

impl ProfileViolation {
    pub(crate) fn new(
        kind: ProfileViolationKind,
        course_ids: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            course_ids,
            message: message.into(),
        }
    }
}

impl fmt::Display for ProfileViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a profile against raw catalog records.
///
/// Checks:
/// 1. Required courses ⊆ catalog ids
/// 2. Transfer credits ⊆ catalog ids
/// 3. `time_to_graduate > 0`, `course_per_semester > 0`, `current_semester >= 1`
/// 4. At most [`MAX_PLAN_SEMESTERS`] semesters from `current_semester`
///    through `time_to_graduate`
///
/// Runs before graph building and never mutates its input.
///
/// # Errors
/// [`PlanError::InvalidProfile`] with every violation found.
pub fn validate_profile(profile: &StudentProfile, catalog: &[CourseRecord]) -> Result<()> {
    let catalog_ids: BTreeSet<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
    let required: BTreeSet<&str> = profile.required_courses.iter().map(String::as_str).collect();
    let transfer: BTreeSet<&str> = profile.transfer_credits.iter().map(String::as_str).collect();

    let mut errors = Vec::new();

    if !is_subset_of(&required, &catalog_ids) {
        let unknown = owned(missing_from(&required, &catalog_ids));
        errors.push(ProfileViolation::new(
            ProfileViolationKind::UnknownRequiredCourse,
            unknown.clone(),
            format!("required courses not in catalog: {}", unknown.join(", ")),
        ));
    }

    if !is_subset_of(&transfer, &catalog_ids) {
        let unknown = owned(missing_from(&transfer, &catalog_ids));
        errors.push(ProfileViolation::new(
            ProfileViolationKind::UnknownTransferCredit,
            unknown.clone(),
            format!("transfer credits not in catalog: {}", unknown.join(", ")),
        ));
    }

    for (knob, value, min) in [
        ("time_to_graduate", profile.time_to_graduate, 1),
        ("course_per_semester", profile.course_per_semester, 1),
        ("current_semester", profile.current_semester, 1),
    ] {
        if value < min {
            errors.push(ProfileViolation::new(
                ProfileViolationKind::InvalidTimingKnob,
                Vec::new(),
                format!("{knob} must be at least {min}, got {value}"),
            ));
        }
    }

    let window = plan_window(profile);
    if window > u64::from(MAX_PLAN_SEMESTERS) {
        errors.push(ProfileViolation::new(
            ProfileViolationKind::InvalidTimingKnob,
            Vec::new(),
            format!(
                "semesters {} through {} span {window}, at most {MAX_PLAN_SEMESTERS} allowed",
                profile.current_semester, profile.time_to_graduate
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(PlanError::InvalidProfile(errors))
    }
}

/// Semesters from `current_semester` through `time_to_graduate`, inclusive.
fn plan_window(profile: &StudentProfile) -> u64 {
    (u64::from(profile.time_to_graduate) + 1).saturating_sub(u64::from(profile.current_semester))
}

/// Checks that every prerequisite of a pending course can be satisfied.
///
/// A prerequisite is satisfiable if it is itself required (and will be
/// scheduled) or covered by a transfer credit.
///
/// # Errors
/// [`PlanError::InvalidProfile`] with one `MissingPrerequisite` violation
/// per course that has gaps.
pub fn validate_prerequisites(graph: &CourseGraph, profile: &StudentProfile) -> Result<()> {
    let mut errors = Vec::new();

    for id in profile.pending_courses() {
        let Some(course) = graph.get(id) else {
            continue;
        };
        let gaps: Vec<String> = course
            .prerequisites
            .iter()
            .filter(|p| {
                !profile.required_courses.contains(*p) && !profile.transfer_credits.contains(*p)
            })
            .cloned()
            .collect();
        if !gaps.is_empty() {
            errors.push(ProfileViolation::new(
                ProfileViolationKind::MissingPrerequisite,
                gaps.clone(),
                format!(
                    "course '{id}' needs {} which is neither required nor transferred",
                    gaps.join(", ")
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(PlanError::InvalidProfile(errors))
    }
}

/// A broken invariant in a computed or edited plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanViolation {
    /// Violation category.
    pub kind: PlanViolationKind,
    /// Related course id, or `semester N` for semester-level violations.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of plan violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanViolationKind {
    /// A course is placed no later than one of its prerequisites.
    PrecedenceViolation,
    /// A semester holds more than `course_per_semester` courses.
    CapacityExceeded,
    /// A course is placed after `time_to_graduate`.
    BeyondHorizon,
    /// A course is placed before `current_semester`.
    BeforeCurrentSemester,
    /// A pending required course is not placed.
    MissingCourse,
    /// A course occupies more than one slot.
    DuplicatePlacement,
    /// A transfer credit occupies a slot.
    TransferScheduled,
    /// A placed course is not required.
    NotRequired,
    /// A placed course is not in the catalog.
    UnknownCourse,
}

impl PlanViolation {
    pub(crate) fn new(
        kind: PlanViolationKind,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Re-checks every plan invariant.
///
/// Returns an empty list for a valid plan.
pub fn verify_plan(graph: &CourseGraph, profile: &StudentProfile) -> Vec<PlanViolation> {
    let mut violations = Vec::new();
    let mut placed: BTreeMap<&str, u32> = BTreeMap::new();

    for (idx, semester) in profile.semesters.iter().enumerate() {
        let number = profile.semester_number(idx);
        let label = format!("semester {number}");

        if semester.len() > profile.course_per_semester as usize {
            violations.push(PlanViolation::new(
                PlanViolationKind::CapacityExceeded,
                &label,
                format!(
                    "{label} holds {} courses, capacity is {}",
                    semester.len(),
                    profile.course_per_semester
                ),
            ));
        }

        for course in semester {
            let id = course.id.as_str();
            if placed.insert(id, number).is_some() {
                violations.push(PlanViolation::new(
                    PlanViolationKind::DuplicatePlacement,
                    id,
                    format!("course '{id}' is placed more than once"),
                ));
            }
            if number > profile.time_to_graduate {
                violations.push(PlanViolation::new(
                    PlanViolationKind::BeyondHorizon,
                    id,
                    format!(
                        "course '{id}' is in {label}, after time_to_graduate {}",
                        profile.time_to_graduate
                    ),
                ));
            }
            if !graph.contains(id) {
                violations.push(PlanViolation::new(
                    PlanViolationKind::UnknownCourse,
                    id,
                    format!("course '{id}' is not in the catalog"),
                ));
            }
            if profile.transfer_credits.contains(id) {
                violations.push(PlanViolation::new(
                    PlanViolationKind::TransferScheduled,
                    id,
                    format!("course '{id}' is covered by a transfer credit"),
                ));
            } else if !profile.required_courses.contains(id) {
                violations.push(PlanViolation::new(
                    PlanViolationKind::NotRequired,
                    id,
                    format!("course '{id}' is not required"),
                ));
            }
        }
    }

    // Precedence is checked against the catalog links, not the embedded copy.
    for (&id, &number) in &placed {
        let Some(course) = graph.get(id) else {
            continue;
        };
        for prereq in &course.prerequisites {
            if profile.transfer_credits.contains(prereq) {
                continue;
            }
            match placed.get(prereq.as_str()) {
                Some(&p) if p < number => {}
                Some(&p) => violations.push(PlanViolation::new(
                    PlanViolationKind::PrecedenceViolation,
                    id,
                    format!(
                        "course '{id}' in semester {number} needs '{prereq}', \
                         which is in semester {p}"
                    ),
                )),
                None => violations.push(PlanViolation::new(
                    PlanViolationKind::PrecedenceViolation,
                    id,
                    format!("course '{id}' needs '{prereq}' which is never completed"),
                )),
            }
        }
    }

    for id in profile.pending_courses() {
        if !placed.contains_key(id) {
            violations.push(PlanViolation::new(
                PlanViolationKind::MissingCourse,
                id,
                format!("required course '{id}' is not placed"),
            ));
        }
    }

    violations
}

fn owned(ids: Vec<&&str>) -> Vec<String> {
    ids.into_iter().map(|id| id.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::models::Course;

    fn sample_catalog() -> Vec<CourseRecord> {
        vec![
            CourseRecord::new("A"),
            CourseRecord::new("B").with_prerequisite("A"),
            CourseRecord::new("C").with_prerequisite("A"),
        ]
    }

    fn course(graph: &CourseGraph, id: &str) -> Course {
        graph.get(id).unwrap().clone()
    }

    #[test]
    fn test_subset_laws() {
        let empty: BTreeSet<&str> = BTreeSet::new();
        let s: BTreeSet<&str> = ["A", "B"].into_iter().collect();
        let x: BTreeSet<&str> = ["X"].into_iter().collect();

        assert!(is_subset_of(&empty, &s));
        assert!(is_subset_of(&empty, &empty));
        assert!(is_subset_of(&s, &s));
        assert!(!is_subset_of(&x, &s));
        assert_eq!(missing_from(&x, &s), vec![&"X"]);
    }

    #[test]
    fn test_valid_profile() {
        let p = StudentProfile::new(3, 2)
            .with_required_all(["A", "B", "C"])
            .with_transfer_credit("A");
        assert!(validate_profile(&p, &sample_catalog()).is_ok());
    }

    #[test]
    fn test_unknown_required_course() {
        let p = StudentProfile::new(3, 2).with_required_all(["A", "GHOST"]);
        match validate_profile(&p, &sample_catalog()).unwrap_err() {
            PlanError::InvalidProfile(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].kind, ProfileViolationKind::UnknownRequiredCourse);
                assert_eq!(errors[0].course_ids, vec!["GHOST".to_string()]);
            }
            other => panic!("expected invalid profile, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_transfer_credit() {
        let p = StudentProfile::new(3, 2)
            .with_required("A")
            .with_transfer_credit("OLD101");
        let err = validate_profile(&p, &sample_catalog()).unwrap_err();
        assert!(matches!(
            err,
            PlanError::InvalidProfile(ref v)
                if v[0].kind == ProfileViolationKind::UnknownTransferCredit
        ));
    }

    #[test]
    fn test_invalid_knobs_collected() {
        let p = StudentProfile::new(0, 0)
            .with_required("GHOST")
            .with_current_semester(0);
        match validate_profile(&p, &sample_catalog()).unwrap_err() {
            PlanError::InvalidProfile(errors) => {
                assert_eq!(errors.len(), 4);
                assert_eq!(
                    errors
                        .iter()
                        .filter(|e| e.kind == ProfileViolationKind::InvalidTimingKnob)
                        .count(),
                    3
                );
            }
            other => panic!("expected invalid profile, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_from_keeps_order() {
        let candidate: BTreeSet<String> = ["C", "A", "B"].iter().map(|s| s.to_string()).collect();
        let reference: BTreeSet<String> = ["B"].iter().map(|s| s.to_string()).collect();
        let missing = missing_from(&candidate, &reference);
        assert_eq!(missing, vec!["A", "C"]);
    }

    #[test]
    fn test_plan_window_bounded() {
        let p = StudentProfile::new(u32::MAX, 2)
            .with_required("A")
            .with_current_semester(1 << 31);
        match validate_profile(&p, &sample_catalog()).unwrap_err() {
            PlanError::InvalidProfile(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].kind, ProfileViolationKind::InvalidTimingKnob);
            }
            other => panic!("expected invalid profile, got {other:?}"),
        }

        let late = StudentProfile::new((1 << 31) + 3, 2)
            .with_required("A")
            .with_current_semester(1 << 31);
        assert!(validate_profile(&late, &sample_catalog()).is_ok());

        let widest = StudentProfile::new(MAX_PLAN_SEMESTERS, 2).with_required("A");
        assert!(validate_profile(&widest, &sample_catalog()).is_ok());
        let too_wide = StudentProfile::new(MAX_PLAN_SEMESTERS + 1, 2).with_required("A");
        assert!(validate_profile(&too_wide, &sample_catalog()).is_err());
    }

    #[test]
    fn test_missing_prerequisite() {
        let g = build_graph(&sample_catalog()).unwrap();
        let p = StudentProfile::new(3, 2).with_required("B");
        match validate_prerequisites(&g, &p).unwrap_err() {
            PlanError::InvalidProfile(errors) => {
                assert_eq!(errors[0].kind, ProfileViolationKind::MissingPrerequisite);
                assert_eq!(errors[0].course_ids, vec!["A".to_string()]);
            }
            other => panic!("expected invalid profile, got {other:?}"),
        }

        let covered = p.with_transfer_credit("A");
        assert!(validate_prerequisites(&g, &covered).is_ok());
    }

    #[test]
    fn test_verify_valid_plan() {
        let g = build_graph(&sample_catalog()).unwrap();
        let p = StudentProfile::new(3, 2)
            .with_required_all(["A", "B", "C"])
            .with_semesters(vec![
                vec![course(&g, "A")],
                vec![course(&g, "B"), course(&g, "C")],
            ]);
        assert!(verify_plan(&g, &p).is_empty());
    }

    #[test]
    fn test_verify_precedence_and_capacity() {
        let g = build_graph(&sample_catalog()).unwrap();
        let p = StudentProfile::new(3, 2)
            .with_required_all(["A", "B", "C"])
            .with_semesters(vec![vec![course(&g, "A"), course(&g, "B"), course(&g, "C")]]);
        let violations = verify_plan(&g, &p);

        assert!(violations
            .iter()
            .any(|v| v.kind == PlanViolationKind::CapacityExceeded && v.entity_id == "semester 1"));
        assert_eq!(
            violations
                .iter()
                .filter(|v| v.kind == PlanViolationKind::PrecedenceViolation)
                .count(),
            2
        );
    }

    #[test]
    fn test_verify_missing_and_transfer() {
        let g = build_graph(&sample_catalog()).unwrap();
        let p = StudentProfile::new(3, 2)
            .with_required_all(["A", "B", "C"])
            .with_transfer_credit("A")
            .with_semesters(vec![vec![course(&g, "A"), course(&g, "B")]]);
        let violations = verify_plan(&g, &p);

        assert!(violations
            .iter()
            .any(|v| v.kind == PlanViolationKind::TransferScheduled && v.entity_id == "A"));
        assert!(violations
            .iter()
            .any(|v| v.kind == PlanViolationKind::MissingCourse && v.entity_id == "C"));
    }

    #[test]
    fn test_verify_horizon_and_duplicates() {
        let g = build_graph(&sample_catalog()).unwrap();
        let p = StudentProfile::new(1, 2)
            .with_required("A")
            .with_semesters(vec![vec![course(&g, "A")], vec![course(&g, "A")]]);
        let violations = verify_plan(&g, &p);

        assert!(violations
            .iter()
            .any(|v| v.kind == PlanViolationKind::DuplicatePlacement));
        assert!(violations
            .iter()
            .any(|v| v.kind == PlanViolationKind::BeyondHorizon));
    }

    #[test]
    fn test_verify_unknown_and_not_required() {
        let g = build_graph(&sample_catalog()).unwrap();
        let p = StudentProfile::new(3, 2)
            .with_required("A")
            .with_semesters(vec![vec![course(&g, "A"), Course::new("Z")]]);
        let violations = verify_plan(&g, &p);

        assert!(violations
            .iter()
            .any(|v| v.kind == PlanViolationKind::UnknownCourse && v.entity_id == "Z"));
        assert!(violations
            .iter()
            .any(|v| v.kind == PlanViolationKind::NotRequired && v.entity_id == "Z"));
    }
}
