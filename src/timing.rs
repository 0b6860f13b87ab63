//! Critical-path timing analysis over the pending course set.
//!
//! For every required course that is not covered by a transfer credit:
//!
//! ```text
//! earliest_finish[c] = 1 + max(earliest_finish[p] for pending prerequisites p)
//!                      (current_semester when there are none)
//! latest_finish[c]   = min(latest_finish[d] for pending dependents d) - 1
//!                      (time_to_graduate when there are none)
//! fan_out[c]         = |dependents[c]|   (direct, catalog-wide)
//! slack[c]           = latest_finish[c] - earliest_finish[c]
//! ```
//!
//! Transfer credits are finished before the first planned semester: they
//! satisfy their dependents' prerequisites without appearing in the table.
//! Negative slack means the horizon is infeasible for that course; it is
//! reported, not rejected, so the assigner can still return a partial plan.
//!
//! # Reference
//! Kelley & Walker (1959), "Critical-Path Planning and Scheduling"

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::graph::CourseGraph;
use crate::models::StudentProfile;

/// Timing bounds of a single course, in absolute semester numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTiming {
    /// Earliest semester the course can be completed.
    pub earliest_finish: i64,
    /// Latest semester the course must be completed to graduate on time.
    pub latest_finish: i64,
    /// Number of direct dependents.
    pub fan_out: usize,
}

impl CourseTiming {
    /// Scheduling freedom. Lower = more urgent; negative = infeasible.
    #[inline]
    pub fn slack(&self) -> i64 {
        self.latest_finish - self.earliest_finish
    }

    /// Whether the course lies on a critical chain.
    #[inline]
    pub fn is_critical(&self) -> bool {
        self.slack() == 0
    }
}

/// Timing table for the pending course set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingAnalysis {
    timings: BTreeMap<String, CourseTiming>,
    order: Vec<String>,
    first_semester: u32,
    horizon: u32,
}

/// Runs the forward and backward passes.
///
/// Topological order comes from Kahn's algorithm restricted to the pending
/// set.
///
/// # Errors
/// - [`PlanError::Cycle`](crate::PlanError::Cycle) if pending courses form a cycle
/// - [`PlanError::UnknownCourse`](crate::PlanError::UnknownCourse) if a pending id
///   is not in the graph
#[instrument(skip_all, fields(pending = tracing::field::Empty, horizon = profile.time_to_graduate))]
pub fn analyze(graph: &CourseGraph, profile: &StudentProfile) -> Result<TimingAnalysis> {
    let pending = profile.pending_courses();
    tracing::Span::current().record("pending", pending.len());

    let sorted = graph.topological_order(pending.iter().copied())?;

    let n = graph.len();
    let mut in_set = vec![false; n];
    for &slot in &sorted {
        in_set[slot] = true;
    }

    // Forward pass
    let already_done = i64::from(profile.current_semester) - 1;
    let mut earliest = vec![0i64; n];
    for &slot in &sorted {
        let prior = graph
            .course_at(slot)
            .prerequisites
            .iter()
            .filter_map(|p| graph.index_of(p))
            .filter(|&p| in_set[p])
            .map(|p| earliest[p])
            .max()
            .unwrap_or(already_done);
        earliest[slot] = prior + 1;
    }

    // Backward pass
    let horizon = i64::from(profile.time_to_graduate);
    let mut latest = vec![horizon; n];
    for &slot in sorted.iter().rev() {
        latest[slot] = graph
            .course_at(slot)
            .dependents
            .iter()
            .filter_map(|d| graph.index_of(d))
            .filter(|&d| in_set[d])
            .map(|d| latest[d] - 1)
            .min()
            .unwrap_or(horizon);
    }

    let timings: BTreeMap<String, CourseTiming> = sorted
        .iter()
        .map(|&slot| {
            let course = graph.course_at(slot);
            (
                course.id.clone(),
                CourseTiming {
                    earliest_finish: earliest[slot],
                    latest_finish: latest[slot],
                    fan_out: course.fan_out(),
                },
            )
        })
        .collect();

    let analysis = TimingAnalysis {
        timings,
        order: sorted
            .iter()
            .map(|&slot| graph.course_at(slot).id.clone())
            .collect(),
        first_semester: profile.current_semester,
        horizon: profile.time_to_graduate,
    };

    let infeasible = analysis.infeasible_courses();
    if !infeasible.is_empty() {
        warn!(
            courses = ?infeasible,
            earliest_completion = analysis.earliest_completion(),
            "horizon shorter than prerequisite chain"
        );
    }
    debug!(
        chain = analysis.chain_length(),
        critical = analysis.critical_courses().len(),
        "timing analysis complete"
    );

    Ok(analysis)
}

impl TimingAnalysis {
    /// Timing of a course. `None` for transfer credits and non-required courses.
    pub fn get(&self, course_id: &str) -> Option<&CourseTiming> {
        self.timings.get(course_id)
    }

    /// Slack of a course.
    pub fn slack(&self, course_id: &str) -> Option<i64> {
        self.get(course_id).map(CourseTiming::slack)
    }

    /// Iterates timings in course id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CourseTiming)> {
        self.timings.iter().map(|(id, t)| (id.as_str(), t))
    }

    /// Topological order used by both passes.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Number of analyzed courses.
    pub fn len(&self) -> usize {
        self.timings.len()
    }

    /// Whether nothing needed analysis.
    pub fn is_empty(&self) -> bool {
        self.timings.is_empty()
    }

    /// Semester horizon the backward pass started from.
    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    /// Earliest semester by which every pending course can be finished.
    ///
    /// `current_semester - 1` when nothing is pending.
    pub fn earliest_completion(&self) -> i64 {
        self.timings
            .values()
            .map(|t| t.earliest_finish)
            .max()
            .unwrap_or(i64::from(self.first_semester) - 1)
    }

    /// Length of the longest pending prerequisite chain, in semesters.
    pub fn chain_length(&self) -> u32 {
        let span = self.earliest_completion() - (i64::from(self.first_semester) - 1);
        u32::try_from(span.max(0)).unwrap_or(u32::MAX)
    }

    /// Courses with zero slack, in id order.
    pub fn critical_courses(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, t)| t.is_critical())
            .map(|(id, _)| id)
            .collect()
    }

    /// Courses whose earliest finish lies past their latest finish.
    pub fn infeasible_courses(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, t)| t.slack() < 0)
            .map(|(id, _)| id)
            .collect()
    }

    /// Whether every course fits within the horizon.
    pub fn is_feasible(&self) -> bool {
        self.timings.values().all(|t| t.slack() >= 0)
    }
}
