//! Plan quality metrics (KPIs).
//!
//! Computes planning indicators from a completed plan and the timing
//! analysis it was built from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Semesters used | Planned semesters, including under-filled ones |
//! | Peak load | Largest semester |
//! | Load utilization | placed / (semesters × capacity) |
//! | Headroom | time_to_graduate − last planned semester |
//! | Chain length | Longest pending prerequisite chain |
//! | Critical courses | Courses with zero slack |

use serde::Serialize;

use crate::models::StudentProfile;
use crate::timing::TimingAnalysis;

/// Plan performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanKpi {
    /// Number of planned semesters.
    pub semesters_used: usize,
    /// Absolute number of the last planned semester.
    pub last_semester: Option<u32>,
    /// Total placed courses.
    pub courses_placed: usize,
    /// Courses per semester.
    pub load_by_semester: Vec<usize>,
    /// Mean courses per planned semester.
    pub average_load: f64,
    /// Largest semester.
    pub peak_load: usize,
    /// Fraction of available slots used (0.0..1.0).
    pub load_utilization: f64,
    /// Semesters left unused before `time_to_graduate`. Negative if the plan overruns.
    pub headroom_semesters: i64,
    /// Longest pending prerequisite chain, in semesters.
    pub chain_length: u32,
    /// Number of zero-slack courses.
    pub critical_course_count: usize,
}

impl PlanKpi {
    /// Computes KPIs from a planned profile and its timing analysis.
    pub fn calculate(profile: &StudentProfile, timing: &TimingAnalysis) -> Self {
        let load_by_semester: Vec<usize> = profile.semesters.iter().map(Vec::len).collect();
        let semesters_used = load_by_semester.len();
        let courses_placed: usize = load_by_semester.iter().sum();
        let peak_load = load_by_semester.iter().copied().max().unwrap_or(0);

        let average_load = if semesters_used == 0 {
            0.0
        } else {
            courses_placed as f64 / semesters_used as f64
        };

        let slots = semesters_used * profile.course_per_semester as usize;
        let load_utilization = if slots == 0 {
            0.0
        } else {
            courses_placed as f64 / slots as f64
        };

        let last_semester = profile.last_semester();
        let finished_by = last_semester.unwrap_or(profile.current_semester.saturating_sub(1));
        let headroom_semesters = i64::from(profile.time_to_graduate) - i64::from(finished_by);

        Self {
            semesters_used,
            last_semester,
            courses_placed,
            load_by_semester,
            average_load,
            peak_load,
            load_utilization,
            headroom_semesters,
            chain_length: timing.chain_length(),
            critical_course_count: timing.critical_courses().len(),
        }
    }

    /// Whether the plan meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_peak_load: usize, min_headroom: i64) -> bool {
        self.peak_load <= max_peak_load && self.headroom_semesters >= min_headroom
    }
}
