//! Structured plan edits.
//!
//! Edits arrive as typed values (from a UI drag, or an external agent that
//! turned a request like "move X to semester 3" into a [`PlanEdit`]). Each
//! edit yields a new profile that is re-verified in full; an edit that
//! breaks any plan invariant is rejected and the input is left untouched.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{PlanError, Result};
use crate::graph::CourseGraph;
use crate::models::{Course, StudentProfile, MAX_PLAN_SEMESTERS};
use crate::validation::{verify_plan, PlanViolation, PlanViolationKind};

/// A single change to a computed plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlanEdit {
    /// Moves a placed course to an absolute semester.
    MoveCourse { course_id: String, semester: u32 },
    /// Exchanges the semesters of two placed courses.
    SwapCourses { a: String, b: String },
}

/// Applies an edit and re-verifies the plan.
///
/// # Errors
/// - [`PlanError::UnknownCourse`] if a course is not in the catalog or not
///   placed in the plan
/// - [`PlanError::PlanRejected`] with every violation the edit causes
#[instrument(skip_all, fields(edit = ?edit))]
pub fn apply_edit(
    graph: &CourseGraph,
    profile: &StudentProfile,
    edit: &PlanEdit,
) -> Result<StudentProfile> {
    let mut edited = profile.clone();

    match edit {
        PlanEdit::MoveCourse { course_id, semester } => {
            let (from, pos) = locate(graph, &edited, course_id)?;
            if *semester < edited.current_semester {
                return Err(rejected(
                    PlanViolationKind::BeforeCurrentSemester,
                    course_id,
                    format!(
                        "course '{course_id}' cannot move to semester {semester}, \
                         plan starts at {}",
                        edited.current_semester
                    ),
                ));
            }
            if *semester > edited.time_to_graduate {
                return Err(rejected(
                    PlanViolationKind::BeyondHorizon,
                    course_id,
                    format!(
                        "course '{course_id}' cannot move to semester {semester}, \
                         after time_to_graduate {}",
                        edited.time_to_graduate
                    ),
                ));
            }
            let target = (*semester - edited.current_semester) as usize;
            if target >= MAX_PLAN_SEMESTERS as usize {
                return Err(rejected(
                    PlanViolationKind::BeyondHorizon,
                    course_id,
                    format!(
                        "course '{course_id}' cannot move to semester {semester}, \
                         more than {MAX_PLAN_SEMESTERS} semesters ahead"
                    ),
                ));
            }
            let course: Course = edited.semesters[from].remove(pos);
            if edited.semesters.len() <= target {
                edited.semesters.resize_with(target + 1, Vec::new);
            }
            edited.semesters[target].push(course);
        }
        PlanEdit::SwapCourses { a, b } => {
            let (sem_a, pos_a) = locate(graph, &edited, a)?;
            let (sem_b, pos_b) = locate(graph, &edited, b)?;
            if sem_a != sem_b {
                let course_a = edited.semesters[sem_a][pos_a].clone();
                let course_b = std::mem::replace(&mut edited.semesters[sem_b][pos_b], course_a);
                edited.semesters[sem_a][pos_a] = course_b;
            }
        }
    }

    while edited.semesters.last().is_some_and(Vec::is_empty) {
        edited.semesters.pop();
    }

    let violations = verify_plan(graph, &edited);
    if !violations.is_empty() {
        debug!(violations = violations.len(), "plan edit rejected");
        return Err(PlanError::PlanRejected(violations));
    }

    Ok(edited)
}

fn rejected(kind: PlanViolationKind, course_id: &str, message: String) -> PlanError {
    PlanError::PlanRejected(vec![PlanViolation::new(kind, course_id, message)])
}

/// Semester index and position of a placed course.
fn locate(
    graph: &CourseGraph,
    profile: &StudentProfile,
    course_id: &str,
) -> Result<(usize, usize)> {
    if !graph.contains(course_id) {
        return Err(PlanError::unknown_course(course_id, "plan edit"));
    }
    profile
        .semesters
        .iter()
        .enumerate()
        .find_map(|(k, sem)| sem.iter().position(|c| c.id == course_id).map(|pos| (k, pos)))
        .ok_or_else(|| PlanError::unknown_course(course_id, "plan edit: course is not placed"))
}
