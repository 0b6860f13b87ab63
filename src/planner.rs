//! Planning entry point with explicit configuration.
//!
//! [`Planner`] runs the whole pipeline for one request:
//!
//! ```text
//! validate_profile → build_graph → validate_prerequisites → analyze → assign
//! → verify_plan
//! ```
//!
//! Environment-dependent behavior is carried by [`PlannerConfig`], built
//! once at startup (from defaults, serde, or environment variables) and
//! passed in.

use std::env;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::blob::{from_blob, PlanBlob};
use crate::dispatching::PriorityPolicy;
use crate::error::{PlanError, Result};
use crate::graph::build_graph;
use crate::models::{CourseRecord, StudentProfile};
use crate::scheduler::{PlanKpi, SemesterAssigner};
use crate::timing::{analyze, TimingAnalysis};
use crate::validation::{validate_prerequisites, validate_profile, verify_plan};

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Developer machine.
    Local,
    /// Shared test deployment.
    Qa,
    /// Live deployment.
    #[default]
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "dev" => Some(Self::Local),
            "qa" | "staging" => Some(Self::Qa),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Qa => "qa",
            Self::Production => "production",
        }
    }
}

/// Planner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Deployment environment, recorded on every planning span.
    pub environment: Environment,
    /// Ordering of eligible courses.
    pub policy: PriorityPolicy,
    /// Re-check every computed plan before returning it.
    pub verify_plans: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            policy: PriorityPolicy::CriticalPath,
            verify_plans: true,
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by `UCURRICULUM_*` environment variables.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_vars(|key| env::var(key).ok());
        config
    }

    /// Applies overrides from a variable lookup.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("UCURRICULUM_ENV") {
            if let Some(environment) = Environment::parse(&val) {
                self.environment = environment;
            }
        }
        if let Some(val) = lookup("UCURRICULUM_POLICY") {
            if let Some(policy) = PriorityPolicy::parse(&val) {
                self.policy = policy;
            }
        }
        if let Some(val) = lookup("UCURRICULUM_VERIFY_PLANS") {
            match val.trim().to_lowercase().as_str() {
                "true" | "1" => self.verify_plans = true,
                "false" | "0" => self.verify_plans = false,
                _ => {}
            }
        }
    }

    /// Sets the environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the priority policy.
    pub fn with_policy(mut self, policy: PriorityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Turns plan re-verification on or off.
    pub fn with_verify_plans(mut self, verify: bool) -> Self {
        self.verify_plans = verify;
        self
    }
}

/// A filled profile with the analysis it was planned from.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedProfile {
    /// The input profile with `semesters` filled.
    pub profile: StudentProfile,
    /// Timing of every pending course.
    pub timing: TimingAnalysis,
    /// Plan quality indicators.
    pub kpi: PlanKpi,
}

/// Runs planning requests under one configuration.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    /// Creates a planner with the given configuration.
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans the pending courses of a profile.
    ///
    /// Any existing `semesters` in `profile` are replaced.
    ///
    /// # Errors
    /// - [`PlanError::InvalidProfile`] for unknown ids, bad knobs, a window
    ///   longer than [`crate::models::MAX_PLAN_SEMESTERS`], or prerequisites
    ///   that are neither required nor transferred
    /// - [`PlanError::Cycle`], [`PlanError::UnknownCourse`],
    ///   [`PlanError::DuplicateCourse`] for a malformed catalog
    /// - [`PlanError::OverCapacity`] with the partial plan
    /// - [`PlanError::PlanRejected`] if verification is on and fails
    #[instrument(skip_all, fields(
        environment = self.config.environment.as_str(),
        policy = self.config.policy.as_str(),
        courses = catalog.len(),
    ))]
    pub fn plan(
        &self,
        catalog: &[CourseRecord],
        profile: &StudentProfile,
    ) -> Result<PlannedProfile> {
        validate_profile(profile, catalog)?;
        let graph = build_graph(catalog)?;
        validate_prerequisites(&graph, profile)?;

        let timing = analyze(&graph, profile)?;
        let semesters =
            SemesterAssigner::with_policy(self.config.policy).assign(&graph, profile, &timing)?;
        let planned = profile.clone().with_semesters(semesters);

        if self.config.verify_plans {
            let violations = verify_plan(&graph, &planned);
            if let Some(first) = violations.first() {
                error!(
                    violations = violations.len(),
                    first = %first,
                    "computed plan violates invariants"
                );
                return Err(PlanError::PlanRejected(violations));
            }
        }

        let kpi = PlanKpi::calculate(&planned, &timing);
        info!(
            semesters = kpi.semesters_used,
            courses = kpi.courses_placed,
            headroom = kpi.headroom_semesters,
            "plan computed"
        );

        Ok(PlannedProfile {
            profile: planned,
            timing,
            kpi,
        })
    }

    /// Rebuilds a stored plan against the current catalog.
    ///
    /// A restored plan that no longer satisfies the catalog is returned
    /// as-is and logged; callers re-plan or edit it.
    ///
    /// # Errors
    /// - Catalog errors from [`build_graph`]
    /// - [`PlanError::InvalidBlob`] or [`PlanError::UnknownCourse`] from
    ///   [`from_blob`]
    #[instrument(skip_all, fields(
        environment = self.config.environment.as_str(),
        version = blob.version(),
    ))]
    pub fn restore(&self, blob: &PlanBlob, catalog: &[CourseRecord]) -> Result<StudentProfile> {
        let graph = build_graph(catalog)?;
        let profile = from_blob(blob, &graph)?;

        if self.config.verify_plans {
            let violations = verify_plan(&graph, &profile);
            if !violations.is_empty() {
                warn!(
                    violations = violations.len(),
                    "restored plan no longer satisfies the catalog"
                );
            }
        }

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::to_blob;
    use crate::models::MAX_PLAN_SEMESTERS;
    use crate::validation::ProfileViolationKind;
    use std::collections::HashMap;

    fn catalog() -> Vec<CourseRecord> {
        vec![
            CourseRecord::new("A"),
            CourseRecord::new("B").with_prerequisite("A"),
            CourseRecord::new("C").with_prerequisite("A"),
        ]
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.policy, PriorityPolicy::CriticalPath);
        assert!(config.verify_plans);
    }

    #[test]
    fn test_config_apply_vars() {
        let mut config = PlannerConfig::default();
        config.apply_vars(vars(&[
            ("UCURRICULUM_ENV", "qa"),
            ("UCURRICULUM_POLICY", "fan-out-first"),
            ("UCURRICULUM_VERIFY_PLANS", "0"),
        ]));
        assert_eq!(config.environment, Environment::Qa);
        assert_eq!(config.policy, PriorityPolicy::FanOutFirst);
        assert!(!config.verify_plans);
    }

    #[test]
    fn test_config_ignores_bad_vars() {
        let mut config = PlannerConfig::default();
        config.apply_vars(vars(&[
            ("UCURRICULUM_ENV", "moon"),
            ("UCURRICULUM_POLICY", "random"),
            ("UCURRICULUM_VERIFY_PLANS", "maybe"),
        ]));
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"environment": "local", "policy": "earliest_finish"}"#)
                .unwrap();
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.policy, PriorityPolicy::EarliestFinish);
        assert!(config.verify_plans);
    }

    #[test]
    fn test_plan_fills_profile() {
        let profile = StudentProfile::new(3, 2).with_required_all(["A", "B", "C"]);
        let planned = Planner::default().plan(&catalog(), &profile).unwrap();

        assert_eq!(
            planned.profile.semester_ids(),
            vec![vec!["A".to_string()], vec!["B".to_string(), "C".to_string()]]
        );
        assert_eq!(planned.kpi.semesters_used, 2);
        assert_eq!(planned.timing.len(), 3);
        assert_eq!(planned.profile.required_courses, profile.required_courses);
    }

    #[test]
    fn test_plan_late_semester_numbers() {
        let start = 1u32 << 31;
        let profile = StudentProfile::new(start + 4, 2)
            .with_required_all(["A", "B", "C"])
            .with_current_semester(start);
        let planned = Planner::default().plan(&catalog(), &profile).unwrap();

        assert_eq!(planned.profile.semester_of("A"), Some(start));
        assert_eq!(planned.profile.semester_of("C"), Some(start + 1));
        assert_eq!(planned.kpi.headroom_semesters, 3);
        assert!(planned.timing.is_feasible());
    }

    #[test]
    fn test_plan_window_too_long() {
        let profile = StudentProfile::new(u32::MAX, 2).with_required_all(["A", "B", "C"]);
        match Planner::default().plan(&catalog(), &profile).unwrap_err() {
            PlanError::InvalidProfile(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].kind, ProfileViolationKind::InvalidTimingKnob);
            }
            other => panic!("expected invalid profile, got {other:?}"),
        }
        let widest = StudentProfile::new(MAX_PLAN_SEMESTERS, 2).with_required("A");
        assert!(Planner::default().plan(&catalog(), &widest).is_ok());
    }

    #[test]
    fn test_plan_unknown_required_course() {
        let profile = StudentProfile::new(3, 2).with_required_all(["A", "Z"]);
        match Planner::default().plan(&catalog(), &profile).unwrap_err() {
            PlanError::InvalidProfile(violations) => {
                assert_eq!(violations[0].kind, ProfileViolationKind::UnknownRequiredCourse);
                assert_eq!(violations[0].course_ids, vec!["Z".to_string()]);
            }
            other => panic!("expected invalid profile, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_missing_prerequisite() {
        let profile = StudentProfile::new(3, 2).with_required("B");
        match Planner::default().plan(&catalog(), &profile).unwrap_err() {
            PlanError::InvalidProfile(violations) => {
                assert_eq!(violations[0].kind, ProfileViolationKind::MissingPrerequisite);
            }
            other => panic!("expected invalid profile, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_cycle_is_fatal() {
        let cyclic = vec![
            CourseRecord::new("A").with_prerequisite("B"),
            CourseRecord::new("B").with_prerequisite("A"),
        ];
        let profile = StudentProfile::new(3, 2).with_required("A");
        let err = Planner::default().plan(&cyclic, &profile).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_plan_over_capacity() {
        let profile = StudentProfile::new(2, 1).with_required_all(["A", "B", "C"]);
        let err = Planner::default().plan(&catalog(), &profile).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.partial_plan().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_restore_round_trip() {
        let planner = Planner::new(PlannerConfig::default().with_environment(Environment::Local));
        let profile = StudentProfile::new(3, 2).with_required_all(["A", "B", "C"]);
        let planned = planner.plan(&catalog(), &profile).unwrap();

        let blob = to_blob(&planned.profile);
        let restored = planner.restore(&blob, &catalog()).unwrap();
        assert_eq!(restored, planned.profile);
    }
}
