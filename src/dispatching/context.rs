//! Scheduling context for dispatching rule evaluation.

use crate::timing::{CourseTiming, TimingAnalysis};

/// Placement state passed to dispatching rules.
///
/// Borrowed for the duration of one semester's ranking.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingContext<'a> {
    /// Absolute semester being filled.
    pub semester: u32,
    /// Timing table of the pending courses.
    pub timing: &'a TimingAnalysis,
}

impl<'a> SchedulingContext<'a> {
    /// Creates a context for the given semester.
    pub fn new(semester: u32, timing: &'a TimingAnalysis) -> Self {
        Self { semester, timing }
    }

    /// Timing of a course, if it is pending.
    pub fn timing_of(&self, course_id: &str) -> Option<&'a CourseTiming> {
        self.timing.get(course_id)
    }
}
