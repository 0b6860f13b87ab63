//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Timing-based**: SLACK, EF, LF
//! - **Structural**: FANOUT
//!
//! # Score Convention
//! All rules return lower scores for higher priority courses. Courses with
//! no timing entry (not pending) rank last on timing-based rules.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Kolisch (1996), priority rules MSLK, LFT, MTS

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Course;

// ======================== Timing-based rules ========================

/// Minimum Slack.
///
/// Prioritizes courses with the least room between earliest and latest
/// finish. Zero-slack courses sit on a critical chain: delaying them
/// delays graduation.
#[derive(Debug, Clone, Copy)]
pub struct MinSlack;

impl DispatchingRule for MinSlack {
    fn name(&self) -> &'static str {
        "SLACK"
    }

    fn evaluate(&self, course: &Course, context: &SchedulingContext<'_>) -> RuleScore {
        context
            .timing_of(&course.id)
            .map(|t| t.slack() as f64)
            .unwrap_or(f64::MAX)
    }

    fn description(&self) -> &'static str {
        "Minimum Slack"
    }
}

/// Earliest Finish.
///
/// Prioritizes courses whose prerequisite chain is shortest. Keeps
/// introductory courses early.
#[derive(Debug, Clone, Copy)]
pub struct EarliestFinish;

impl DispatchingRule for EarliestFinish {
    fn name(&self) -> &'static str {
        "EF"
    }

    fn evaluate(&self, course: &Course, context: &SchedulingContext<'_>) -> RuleScore {
        context
            .timing_of(&course.id)
            .map(|t| t.earliest_finish as f64)
            .unwrap_or(f64::MAX)
    }

    fn description(&self) -> &'static str {
        "Earliest Finish"
    }
}

/// Latest Finish.
///
/// Prioritizes courses with the earliest deadline implied by the
/// graduation horizon. Scores the semesters left before that deadline,
/// counted from the semester being filled.
#[derive(Debug, Clone, Copy)]
pub struct LatestFinish;

impl DispatchingRule for LatestFinish {
    fn name(&self) -> &'static str {
        "LF"
    }

    fn evaluate(&self, course: &Course, context: &SchedulingContext<'_>) -> RuleScore {
        context
            .timing_of(&course.id)
            .map(|t| (t.latest_finish - i64::from(context.semester)) as f64)
            .unwrap_or(f64::MAX)
    }

    fn description(&self) -> &'static str {
        "Latest Finish"
    }
}

// ======================== Structural rules ========================

/// Maximum Fan-Out.
///
/// Prioritizes courses that directly unlock the most other courses.
#[derive(Debug, Clone, Copy)]
pub struct MaxFanOut;

impl DispatchingRule for MaxFanOut {
    fn name(&self) -> &'static str {
        "FANOUT"
    }

    fn evaluate(&self, course: &Course, _context: &SchedulingContext<'_>) -> RuleScore {
        -(course.fan_out() as f64)
    }

    fn description(&self) -> &'static str {
        "Maximum Fan-Out"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::models::{CourseRecord, StudentProfile};
    use crate::timing::analyze;

    // A → B → C, A → D; horizon 4
    //   A: ef 1, lf 2, slack 1, fan-out 2
    //   B: ef 2, lf 3, slack 1
    //   C: ef 3, lf 4, slack 1
    //   D: ef 2, lf 4, slack 2
    fn fixture() -> (crate::graph::CourseGraph, crate::timing::TimingAnalysis) {
        let graph = build_graph(&[
            CourseRecord::new("A"),
            CourseRecord::new("B").with_prerequisite("A"),
            CourseRecord::new("C").with_prerequisite("B"),
            CourseRecord::new("D").with_prerequisite("A"),
            CourseRecord::new("X"),
        ])
        .unwrap();
        let profile = StudentProfile::new(4, 2).with_required_all(["A", "B", "C", "D"]);
        let timing = analyze(&graph, &profile).unwrap();
        (graph, timing)
    }

    #[test]
    fn test_min_slack() {
        let (g, t) = fixture();
        let ctx = SchedulingContext::new(2, &t);
        let b = g.get("B").unwrap();
        let d = g.get("D").unwrap();
        assert!(MinSlack.evaluate(b, &ctx) < MinSlack.evaluate(d, &ctx));
    }

    #[test]
    fn test_not_pending_ranks_last() {
        let (g, t) = fixture();
        let ctx = SchedulingContext::new(1, &t);
        let x = g.get("X").unwrap();
        assert_eq!(MinSlack.evaluate(x, &ctx), f64::MAX);
        assert_eq!(EarliestFinish.evaluate(x, &ctx), f64::MAX);
        assert_eq!(LatestFinish.evaluate(x, &ctx), f64::MAX);
    }

    #[test]
    fn test_earliest_finish() {
        let (g, t) = fixture();
        let ctx = SchedulingContext::new(1, &t);
        let a = g.get("A").unwrap();
        let c = g.get("C").unwrap();
        assert!(EarliestFinish.evaluate(a, &ctx) < EarliestFinish.evaluate(c, &ctx));
    }

    #[test]
    fn test_latest_finish() {
        let (g, t) = fixture();
        let ctx = SchedulingContext::new(2, &t);
        let b = g.get("B").unwrap();
        let d = g.get("D").unwrap();
        // lf 3, filling semester 2: one semester left
        assert!((LatestFinish.evaluate(b, &ctx) - 1.0).abs() < 1e-10);
        assert!(LatestFinish.evaluate(b, &ctx) < LatestFinish.evaluate(d, &ctx));
    }

    #[test]
    fn test_max_fan_out() {
        let (g, t) = fixture();
        let ctx = SchedulingContext::new(1, &t);
        let a = g.get("A").unwrap();
        let c = g.get("C").unwrap();
        assert!((MaxFanOut.evaluate(a, &ctx) + 2.0).abs() < 1e-10);
        assert!(MaxFanOut.evaluate(a, &ctx) < MaxFanOut.evaluate(c, &ctx));
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(MinSlack.name(), "SLACK");
        assert_eq!(MaxFanOut.description(), "Maximum Fan-Out");
        assert_eq!(EarliestFinish.name(), "EF");
        assert_eq!(LatestFinish.name(), "LF");
    }
}
