//! Named rule chains selectable from configuration.

use serde::{Deserialize, Serialize};

use super::{rules, EvaluationMode, RuleEngine, TieBreaker};

/// Preset ordering of eligible courses.
///
/// Every preset ends with a course-id tie-breaker, so plans are
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityPolicy {
    /// Slack ascending, fan-out descending, id.
    #[default]
    CriticalPath,
    /// Fan-out descending, slack ascending, id.
    FanOutFirst,
    /// Earliest finish ascending, slack ascending, id.
    EarliestFinish,
    /// Semesters left before the latest finish ascending, fan-out
    /// descending, id.
    Deadline,
    /// Weighted sum of slack and fan-out (one unlocked course offsets half
    /// a semester of slack), then id.
    Balanced,
}

impl PriorityPolicy {
    /// Parse policy from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical_path" | "critical-path" => Some(Self::CriticalPath),
            "fan_out_first" | "fan-out-first" => Some(Self::FanOutFirst),
            "earliest_finish" | "earliest-finish" => Some(Self::EarliestFinish),
            "deadline" => Some(Self::Deadline),
            "balanced" => Some(Self::Balanced),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CriticalPath => "critical_path",
            Self::FanOutFirst => "fan_out_first",
            Self::EarliestFinish => "earliest_finish",
            Self::Deadline => "deadline",
            Self::Balanced => "balanced",
        }
    }

    /// Builds the rule engine for this policy.
    pub fn engine(&self) -> RuleEngine {
        let engine = match self {
            Self::CriticalPath => RuleEngine::new()
                .with_rule(rules::MinSlack)
                .with_tie_breaker(rules::MaxFanOut),
            Self::FanOutFirst => RuleEngine::new()
                .with_rule(rules::MaxFanOut)
                .with_tie_breaker(rules::MinSlack),
            Self::EarliestFinish => RuleEngine::new()
                .with_rule(rules::EarliestFinish)
                .with_tie_breaker(rules::MinSlack),
            Self::Deadline => RuleEngine::new()
                .with_rule(rules::LatestFinish)
                .with_tie_breaker(rules::MaxFanOut),
            Self::Balanced => RuleEngine::new()
                .with_mode(EvaluationMode::Weighted)
                .with_weighted_rule(rules::MinSlack, 1.0)
                .with_weighted_rule(rules::MaxFanOut, 0.5),
        };
        engine.with_final_tie_breaker(TieBreaker::ById)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for policy in [
            PriorityPolicy::CriticalPath,
            PriorityPolicy::FanOutFirst,
            PriorityPolicy::EarliestFinish,
            PriorityPolicy::Deadline,
            PriorityPolicy::Balanced,
        ] {
            assert_eq!(PriorityPolicy::parse(policy.as_str()), Some(policy));
        }
        assert_eq!(
            PriorityPolicy::parse(" Critical-Path "),
            Some(PriorityPolicy::CriticalPath)
        );
        assert_eq!(PriorityPolicy::parse("random"), None);
    }

    #[test]
    fn test_engine_rule_chains() {
        assert_eq!(
            PriorityPolicy::CriticalPath.engine().rule_names(),
            vec!["SLACK", "FANOUT"]
        );
        assert_eq!(
            PriorityPolicy::FanOutFirst.engine().rule_names(),
            vec!["FANOUT", "SLACK"]
        );
        assert_eq!(
            PriorityPolicy::EarliestFinish.engine().rule_names(),
            vec!["EF", "SLACK"]
        );
        assert_eq!(
            PriorityPolicy::Deadline.engine().rule_names(),
            vec!["LF", "FANOUT"]
        );
        let balanced = PriorityPolicy::Balanced.engine();
        assert_eq!(balanced.rule_names(), vec!["SLACK", "FANOUT"]);
        assert_eq!(balanced.mode(), EvaluationMode::Weighted);
    }

    #[test]
    fn test_default_and_serde() {
        assert_eq!(PriorityPolicy::default(), PriorityPolicy::CriticalPath);
        let json = serde_json::to_string(&PriorityPolicy::FanOutFirst).unwrap();
        assert_eq!(json, "\"fan_out_first\"");
    }
}
