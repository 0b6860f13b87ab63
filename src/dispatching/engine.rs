//! Rule engine for multi-criteria course ranking.
//!
//! Each eligible course is scored once per rule; the ranking then compares
//! score vectors. In sequential mode a later rule only matters when every
//! earlier rule ties; in weighted mode the weighted sum is compared.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Course;

/// Scores closer than this are a tie.
const SCORE_EPSILON: f64 = 1e-9;

/// How multiple rules are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// Lexicographic: the next rule decides only on ties.
    #[default]
    Sequential,
    /// Weighted sum of every rule's score.
    Weighted,
}

/// Ordering applied after every rule ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreaker {
    /// Keep input order (stable sort).
    #[default]
    NextRule,
    /// Course id, ascending.
    ById,
}

#[derive(Clone)]
struct RuleSlot {
    rule: Arc<dyn DispatchingRule>,
    weight: f64,
}

/// A composable ranking of eligible courses.
#[derive(Clone, Default)]
pub struct RuleEngine {
    rules: Vec<RuleSlot>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
}

impl RuleEngine {
    /// Creates an empty engine (stable, unranked order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule with weight 1.0.
    pub fn with_rule<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 1.0)
    }

    /// Adds a rule with an explicit weight. The weight only matters in
    /// [`EvaluationMode::Weighted`].
    pub fn with_weighted_rule<R: DispatchingRule + 'static>(
        mut self,
        rule: R,
        weight: f64,
    ) -> Self {
        self.rules.push(RuleSlot {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a rule consulted only when the earlier rules tie.
    ///
    /// Carries weight 0.0, so it has no effect in weighted mode.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 0.0)
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the ordering used once every rule ties.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Names of the configured rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|slot| slot.rule.name()).collect()
    }

    /// Evaluation mode in use.
    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Ranking of `courses`, as indices into the slice, best first.
    pub fn sort_indices<C: Borrow<Course>>(
        &self,
        courses: &[C],
        context: &SchedulingContext<'_>,
    ) -> Vec<usize> {
        let keys: Vec<Vec<RuleScore>> = courses
            .iter()
            .map(|c| self.score_key(c.borrow(), context))
            .collect();

        let mut indices: Vec<usize> = (0..courses.len()).collect();
        indices.sort_by(|&a, &b| {
            compare_keys(&keys[a], &keys[b])
                .then_with(|| self.final_tie(courses[a].borrow(), courses[b].borrow()))
        });
        indices
    }

    /// Reorders `courses` in place, best first.
    pub fn sort<C: Borrow<Course>>(&self, courses: &mut Vec<C>, context: &SchedulingContext<'_>) {
        let order = self.sort_indices(courses, context);
        let mut slots: Vec<Option<C>> = courses.drain(..).map(Some).collect();
        courses.extend(order.into_iter().filter_map(|i| slots[i].take()));
    }

    /// Scores compared for one course: one entry per rule, or the single
    /// weighted sum.
    fn score_key(&self, course: &Course, context: &SchedulingContext<'_>) -> Vec<RuleScore> {
        let scores = self.rules.iter().map(|slot| (slot, slot.rule.evaluate(course, context)));
        match self.mode {
            EvaluationMode::Sequential => scores.map(|(_, score)| score).collect(),
            EvaluationMode::Weighted => {
                vec![scores
                    .filter(|(slot, _)| slot.weight != 0.0)
                    .map(|(slot, score)| score * slot.weight)
                    .sum()]
            }
        }
    }

    fn final_tie(&self, a: &Course, b: &Course) -> Ordering {
        match self.tie_breaker {
            TieBreaker::NextRule => Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

/// Lexicographic comparison with an epsilon tie band.
fn compare_keys(a: &[RuleScore], b: &[RuleScore]) -> Ordering {
    a.iter()
        .zip(b)
        .find(|(x, y)| (*x - *y).abs() > SCORE_EPSILON)
        .map_or(Ordering::Equal, |(x, y)| x.total_cmp(y))
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<String> = self
            .rules
            .iter()
            .map(|slot| format!("{}(w={})", slot.rule.name(), slot.weight))
            .collect();
        f.debug_struct("RuleEngine")
            .field("rules", &rules)
            .field("mode", &self.mode)
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
