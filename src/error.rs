//! Error taxonomy for the planning pipeline.
//!
//! Catalog corruption (`Cycle`, `UnknownCourse`, `DuplicateCourse`) is fatal
//! to the current request. Everything else is recoverable: the caller can
//! correct the profile, relax the horizon, or discard a stale blob.

use std::fmt;

use thiserror::Error;

use crate::models::Course;
use crate::validation::{PlanViolation, ProfileViolation};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Errors produced by the planning pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// The prerequisite graph cannot be topologically ordered.
    #[error("prerequisite cycle among courses: {}", .course_ids.join(", "))]
    Cycle {
        /// Courses on (or trapped behind) the cycle, sorted.
        course_ids: Vec<String>,
    },

    /// A reference to a course id that does not exist in the catalog.
    #[error("unknown course '{id}' referenced by {context}")]
    UnknownCourse {
        /// The missing id.
        id: String,
        /// Where the reference came from.
        context: String,
    },

    /// Two catalog records share the same id.
    #[error("duplicate course id '{0}' in catalog")]
    DuplicateCourse(String),

    /// The student profile references invalid ids or carries bad knobs.
    #[error("invalid profile: {}", join_messages(.0))]
    InvalidProfile(Vec<ProfileViolation>),

    /// Required courses do not fit before the graduation horizon.
    #[error("{0}")]
    OverCapacity(Box<OverCapacity>),

    /// A persisted plan blob is malformed.
    #[error("invalid plan blob: field '{field}': {reason}")]
    InvalidBlob {
        /// The violated field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A plan (computed or edited) breaks a scheduling invariant.
    #[error("plan rejected: {}", join_messages(.0))]
    PlanRejected(Vec<PlanViolation>),
}

/// Payload of [`PlanError::OverCapacity`].
///
/// Carries the partial plan computed before the horizon ran out so the
/// caller can relax `time_to_graduate` or `course_per_semester` and retry.
#[derive(Debug, Clone, PartialEq)]
pub struct OverCapacity {
    /// Required courses that were never placed, sorted by id.
    pub unplaced: Vec<String>,
    /// Semester where planning gave up: `time_to_graduate` when the horizon
    /// ran out, or the first semester in which no remaining course was
    /// eligible.
    pub semester: u32,
    /// Semesters placed so far (index 0 = `current_semester`).
    pub partial: Vec<Vec<Course>>,
}

impl fmt::Display for OverCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} required course(s) could not be placed by semester {}: {}",
            self.unplaced.len(),
            self.semester,
            self.unplaced.join(", ")
        )
    }
}

impl PlanError {
    /// Creates an `UnknownCourse` error.
    pub fn unknown_course(id: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownCourse {
            id: id.into(),
            context: context.into(),
        }
    }

    /// Creates an `InvalidBlob` error.
    pub fn invalid_blob(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBlob {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error indicates corrupted catalog data.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Cycle { .. } | Self::UnknownCourse { .. } | Self::DuplicateCourse(_)
        )
    }

    /// Whether the caller can correct its input and retry.
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }

    /// The partial plan, if this is an `OverCapacity` error.
    pub fn partial_plan(&self) -> Option<&[Vec<Course>]> {
        match self {
            Self::OverCapacity(oc) => Some(&oc.partial),
            _ => None,
        }
    }
}

fn join_messages<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
