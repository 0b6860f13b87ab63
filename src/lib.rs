//! Course-sequencing planner for degree programs.
//!
//! Turns a course catalog with prerequisite links and a student profile
//! (required courses, transfer credits, graduation horizon, per-semester
//! load) into a semester-by-semester plan that respects every prerequisite
//! and the load limit.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `CourseRecord`, `Course`, `StudentProfile`,
//!   `NodeLayout`
//! - **`graph`**: Catalog → linked DAG (duplicate, unknown-id, cycle checks)
//! - **`timing`**: Earliest/latest finish, slack, and fan-out per course
//! - **`dispatching`**: Priority rules and the rule engine that ranks
//!   eligible courses
//! - **`scheduler`**: Greedy semester assigner and plan KPIs
//! - **`validation`**: Profile checks and full plan verification
//! - **`blob`**: Versioned persisted plan form
//! - **`edit`**: Structured plan edits with re-verification
//! - **`planner`**: Configured end-to-end pipeline
//!
//! # Pipeline
//!
//! ```text
//! catalog ──build_graph──► CourseGraph ──analyze──► TimingAnalysis
//!                              │                      │
//! profile ──validate_profile───┴──SemesterAssigner────┴──► semesters
//! ```
//!
//! Every stage is a pure function over borrowed inputs and returns new
//! values. A built [`graph::CourseGraph`] can be shared read-only between
//! concurrent requests.
//!
//! # Example
//!
//! ```
//! use u_curriculum::models::{CourseRecord, StudentProfile};
//! use u_curriculum::{build_graph, compute_plan};
//!
//! let catalog = vec![
//!     CourseRecord::new("A"),
//!     CourseRecord::new("B").with_prerequisite("A"),
//!     CourseRecord::new("C").with_prerequisite("A"),
//! ];
//! let graph = build_graph(&catalog).unwrap();
//! let profile = StudentProfile::new(3, 2).with_required_all(["A", "B", "C"]);
//!
//! let plan = compute_plan(&graph, &profile).unwrap();
//! assert_eq!(plan.len(), 2);
//! assert_eq!(plan[0][0].id, "A");
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Kelley & Walker (1959), "Critical-path planning and scheduling"

pub mod blob;
pub mod dispatching;
pub mod edit;
pub mod error;
pub mod graph;
pub mod models;
pub mod planner;
pub mod scheduler;
pub mod timing;
pub mod validation;

pub use blob::{from_blob, to_blob, PlanBlob};
pub use edit::{apply_edit, PlanEdit};
pub use error::{PlanError, Result};
pub use graph::{build_graph, CourseGraph};
pub use planner::{Planner, PlannerConfig};
pub use scheduler::compute_plan;
pub use timing::analyze;
