//! Dispatching rules and rule engine for semester placement.
//!
//! Ranks the courses that are eligible in a semester. Rules read the
//! timing table through a [`SchedulingContext`] and return a score where
//! lower means "place first". The engine chains rules (primary rule →
//! tie-breakers → id) so the ranking is always deterministic.
//!
//! # Usage
//!
//! ```
//! use u_curriculum::dispatching::{RuleEngine, TieBreaker};
//! use u_curriculum::dispatching::rules;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::MinSlack)
//!     .with_tie_breaker(rules::MaxFanOut)
//!     .with_final_tie_breaker(TieBreaker::ById);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Kolisch (1996), "Serial and parallel resource-constrained project
//!   scheduling methods revisited"

mod context;
mod engine;
mod policy;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{EvaluationMode, RuleEngine, TieBreaker};
pub use policy::PriorityPolicy;

use crate::models::Course;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (placed first).
pub type RuleScore = f64;

/// A dispatching rule that evaluates course urgency.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for courses that should be placed first.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SLACK", "FANOUT").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a course in the current semester.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, course: &Course, context: &SchedulingContext<'_>) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
