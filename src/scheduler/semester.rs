//! Greedy semester-by-semester course assignment.
//!
//! # Algorithm
//!
//! 1. Start at `current_semester`.
//! 2. Collect eligible courses: pending, unplaced, and every prerequisite
//!    is transferred or placed in an earlier semester.
//! 3. Rank them with the rule engine (default: slack ↑, fan-out ↓, id ↑).
//! 4. Take the first `course_per_semester` of them.
//! 5. Advance; stop when everything is placed or the horizon is passed.
//!
//! Semesters are never padded: a course is never placed before it is
//! eligible, so a semester may be under-filled.
//!
//! # Complexity
//! O(s · n · (p + log n)) where s=semesters, n=pending courses,
//! p=prerequisites per course.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use crate::dispatching::{PriorityPolicy, RuleEngine, SchedulingContext};
use crate::error::{OverCapacity, PlanError, Result};
use crate::graph::CourseGraph;
use crate::models::{Course, StudentProfile};
use crate::timing::{analyze, TimingAnalysis};

/// Computes the semester plan with the default priority policy.
///
/// Runs the timing analysis and the greedy assigner. Returns the plan with
/// `semesters[0]` = `current_semester`.
///
/// # Errors
/// - [`PlanError::Cycle`] if pending courses form a cycle
/// - [`PlanError::UnknownCourse`] if a pending id is not in the graph
/// - [`PlanError::OverCapacity`] with the partial plan if the horizon is
///   too short
pub fn compute_plan(graph: &CourseGraph, profile: &StudentProfile) -> Result<Vec<Vec<Course>>> {
    let timing = analyze(graph, profile)?;
    SemesterAssigner::new().assign(graph, profile, &timing)
}

/// Greedy priority-driven semester assigner.
///
/// # Example
///
/// ```
/// use u_curriculum::graph::build_graph;
/// use u_curriculum::models::{CourseRecord, StudentProfile};
/// use u_curriculum::scheduler::SemesterAssigner;
/// use u_curriculum::timing::analyze;
///
/// let graph = build_graph(&[
///     CourseRecord::new("A"),
///     CourseRecord::new("B").with_prerequisite("A"),
/// ]).unwrap();
/// let profile = StudentProfile::new(2, 1).with_required_all(["A", "B"]);
/// let timing = analyze(&graph, &profile).unwrap();
///
/// let plan = SemesterAssigner::new().assign(&graph, &profile, &timing).unwrap();
/// assert_eq!(plan.len(), 2);
/// assert_eq!(plan[1][0].id, "B");
/// ```
#[derive(Debug, Clone)]
pub struct SemesterAssigner {
    rule_engine: RuleEngine,
}

impl SemesterAssigner {
    /// Creates an assigner with the default critical-path policy.
    pub fn new() -> Self {
        Self::with_policy(PriorityPolicy::default())
    }

    /// Creates an assigner with a preset policy.
    pub fn with_policy(policy: PriorityPolicy) -> Self {
        Self {
            rule_engine: policy.engine(),
        }
    }

    /// Sets a custom rule engine for ranking eligible courses.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    /// Assigns pending courses to semesters.
    ///
    /// `timing` must come from [`analyze`] on the same graph and profile.
    ///
    /// # Errors
    /// - [`PlanError::UnknownCourse`] if a pending id is not in the graph
    /// - [`PlanError::OverCapacity`] with the partial plan if the horizon is
    ///   passed with courses still unplaced
    #[instrument(skip_all, fields(
        from = profile.current_semester,
        horizon = profile.time_to_graduate,
        capacity = profile.course_per_semester,
    ))]
    pub fn assign(
        &self,
        graph: &CourseGraph,
        profile: &StudentProfile,
        timing: &TimingAnalysis,
    ) -> Result<Vec<Vec<Course>>> {
        let pending: Vec<&Course> = profile
            .pending_courses()
            .into_iter()
            .map(|id| {
                graph
                    .get(id)
                    .ok_or_else(|| PlanError::unknown_course(id, "required courses"))
            })
            .collect::<Result<_>>()?;

        let capacity = profile.course_per_semester as usize;
        let mut placed: HashMap<&str, u32> = HashMap::with_capacity(pending.len());
        let mut semesters: Vec<Vec<Course>> = Vec::new();
        let mut semester = profile.current_semester;

        while placed.len() < pending.len() {
            if semester > profile.time_to_graduate {
                warn!(
                    placed = placed.len(),
                    "required courses do not fit before graduation horizon"
                );
                return Err(over_capacity(&pending, &placed, profile.time_to_graduate, semesters));
            }

            let mut eligible: Vec<&Course> = pending
                .iter()
                .copied()
                .filter(|c| !placed.contains_key(c.id.as_str()))
                .filter(|c| {
                    c.prerequisites.iter().all(|p| {
                        profile.transfer_credits.contains(p)
                            || placed.get(p.as_str()).is_some_and(|&s| s < semester)
                    })
                })
                .collect();

            // Eligibility only grows through placements, so an empty
            // semester means the rest can never be placed.
            if eligible.is_empty() {
                warn!(
                    semester,
                    placed = placed.len(),
                    "no remaining course has satisfiable prerequisites"
                );
                return Err(over_capacity(&pending, &placed, semester, semesters));
            }

            let ctx = SchedulingContext::new(semester, timing);
            self.rule_engine.sort(&mut eligible, &ctx);
            eligible.truncate(capacity);

            for &course in &eligible {
                placed.insert(course.id.as_str(), semester);
            }
            debug!(
                semester,
                courses = ?eligible.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
                "semester filled"
            );

            semesters.push(eligible.into_iter().cloned().collect());
            match semester.checked_add(1) {
                Some(next) => semester = next,
                None if placed.len() == pending.len() => break,
                None => return Err(over_capacity(&pending, &placed, semester, semesters)),
            }
        }

        Ok(semesters)
    }
}

fn over_capacity(
    pending: &[&Course],
    placed: &HashMap<&str, u32>,
    semester: u32,
    partial: Vec<Vec<Course>>,
) -> PlanError {
    let unplaced = pending
        .iter()
        .filter(|c| !placed.contains_key(c.id.as_str()))
        .map(|c| c.id.clone())
        .collect();
    PlanError::OverCapacity(Box::new(OverCapacity {
        unplaced,
        semester,
        partial,
    }))
}

impl Default for SemesterAssigner {
    fn default() -> Self {
        Self::new()
    }
}
