//! Course planning domain models.
//!
//! Provides the data types shared by every pipeline stage: catalog
//! records, linked courses, the student profile that carries the plan,
//! and the UI layout persisted alongside it.
//!
//! # Domain Mappings
//!
//! | u-curriculum | Project scheduling |
//! |--------------|--------------------|
//! | Course | Activity |
//! | Prerequisite | Precedence edge |
//! | Semester | Time bucket |
//! | course_per_semester | Bucket capacity |
//! | time_to_graduate | Horizon |

mod course;
mod layout;
mod profile;

pub use course::{Course, CourseRecord};
pub use layout::{NodeLayout, NodePosition};
pub use profile::{StudentProfile, MAX_PLAN_SEMESTERS};
