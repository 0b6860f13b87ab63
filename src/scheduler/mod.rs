//! Semester assignment and plan KPIs.
//!
//! # Algorithm
//!
//! `SemesterAssigner` fills one semester at a time with the highest-priority
//! eligible courses. It is greedy and never backtracks: the plan is one
//! deterministic priority plan, not a global optimum.
//!
//! # KPI
//!
//! `PlanKpi` summarizes a plan: load per semester, utilization, headroom
//! before the graduation horizon, and critical-chain statistics.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Kolisch (1996), "Serial and parallel resource-constrained project
//!   scheduling methods revisited"

mod kpi;
mod semester;

pub use kpi::PlanKpi;
pub use semester::{compute_plan, SemesterAssigner};
