//! Versioned persisted form of a plan.
//!
//! A blob is a catalog-independent projection of a [`StudentProfile`]:
//! course sets and timing knobs verbatim, semesters reduced to course ids,
//! plus UI node positions. Rehydration re-attaches full course data by
//! looking ids up in the current catalog graph.
//!
//! # Versions
//!
//! | Tag | Shape |
//! |-----|-------|
//! | `"1"` | camelCase fields, no node positions, `currentSemester` optional |
//! | `"2"` | snake_case fields, `node_positions` map (current) |
//!
//! Decoding dispatches on the `version` tag to one decoder per version.
//! Older versions are migrated to the current shape before validation.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::{PlanError, Result};
use crate::graph::CourseGraph;
use crate::models::{NodeLayout, NodePosition, StudentProfile, MAX_PLAN_SEMESTERS};

/// Version tag written by [`to_blob`].
pub const CURRENT_VERSION: &str = "2";

/// A persisted plan, tagged by format version.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "version")]
pub enum PlanBlob {
    /// Legacy format.
    #[serde(rename = "1")]
    V1(PlanBlobV1),
    /// Current format.
    #[serde(rename = "2")]
    V2(PlanBlobV2),
}

/// Legacy blob shape, written before node positions were persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanBlobV1 {
    /// Required course ids, possibly with repeats.
    pub required_courses: Vec<String>,
    /// Transfer credit ids, possibly with repeats.
    pub transfer_credits: Vec<String>,
    /// Last allowed absolute semester.
    pub time_to_graduate: u32,
    /// Course limit per semester.
    pub course_per_semester: u32,
    /// Absent in early writers; planning then started at semester 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_semester: Option<u32>,
    /// Course ids per semester, first entry is the starting semester.
    pub semesters: Vec<Vec<String>>,
}

/// Current blob shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanBlobV2 {
    /// Required course ids.
    pub required_courses: BTreeSet<String>,
    /// Transfer credit ids.
    pub transfer_credits: BTreeSet<String>,
    /// Last allowed absolute semester.
    pub time_to_graduate: u32,
    /// Course limit per semester.
    pub course_per_semester: u32,
    /// Absolute number of `semesters[0]`.
    pub current_semester: u32,
    /// Course ids per semester.
    pub semesters: Vec<Vec<String>>,
    /// Presentation state. Never read by the scheduler.
    pub node_positions: NodeLayout,
}

/// Projects a profile to the current blob version (empty layout).
pub fn to_blob(profile: &StudentProfile) -> PlanBlob {
    PlanBlob::V2(PlanBlobV2 {
        required_courses: profile.required_courses.clone(),
        transfer_credits: profile.transfer_credits.clone(),
        time_to_graduate: profile.time_to_graduate,
        course_per_semester: profile.course_per_semester,
        current_semester: profile.current_semester,
        semesters: profile.semester_ids(),
        node_positions: NodeLayout::new(),
    })
}

/// Rebuilds a profile from a blob against the current catalog.
///
/// # Errors
/// - [`PlanError::InvalidBlob`] if a timing knob is zero, the semesters run
///   past the last representable semester number, or a course is placed
///   more than once
/// - [`PlanError::UnknownCourse`] if a planned id is no longer in the catalog
#[instrument(skip_all, fields(version = blob.version()))]
pub fn from_blob(blob: &PlanBlob, graph: &CourseGraph) -> Result<StudentProfile> {
    let current = blob.clone().into_current();
    for (name, value) in [
        ("time_to_graduate", current.time_to_graduate),
        ("course_per_semester", current.course_per_semester),
        ("current_semester", current.current_semester),
    ] {
        if value == 0 {
            return Err(PlanError::invalid_blob(name, "must be at least 1"));
        }
    }
    check_window(current.current_semester, current.semesters.len(), "current_semester")?;

    let mut seen = HashSet::new();
    for (k, semester) in current.semesters.iter().enumerate() {
        for (j, id) in semester.iter().enumerate() {
            if !seen.insert(id.as_str()) {
                return Err(PlanError::invalid_blob(
                    format!("semesters[{k}][{j}]"),
                    format!("course '{id}' is placed more than once"),
                ));
            }
        }
    }

    let semesters = current
        .semesters
        .iter()
        .enumerate()
        .map(|(k, ids)| {
            let number = current.current_semester.saturating_add(k as u32);
            ids.iter()
                .map(|id| {
                    graph.get(id).cloned().ok_or_else(|| {
                        PlanError::unknown_course(id, format!("semester {number} of plan blob"))
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(semesters = semesters.len(), "plan blob rehydrated");

    Ok(StudentProfile {
        required_courses: current.required_courses,
        transfer_credits: current.transfer_credits,
        time_to_graduate: current.time_to_graduate,
        course_per_semester: current.course_per_semester,
        current_semester: current.current_semester,
        semesters,
    })
}

impl PlanBlob {
    /// Version tag of this blob.
    pub fn version(&self) -> &'static str {
        match self {
            Self::V1(_) => "1",
            Self::V2(_) => "2",
        }
    }

    /// Migrates to the current shape.
    pub fn into_current(self) -> PlanBlobV2 {
        match self {
            Self::V1(v1) => PlanBlobV2 {
                required_courses: v1.required_courses.into_iter().collect(),
                transfer_credits: v1.transfer_credits.into_iter().collect(),
                time_to_graduate: v1.time_to_graduate,
                course_per_semester: v1.course_per_semester,
                current_semester: v1.current_semester.unwrap_or(1),
                semesters: v1.semesters,
                node_positions: NodeLayout::new(),
            },
            Self::V2(v2) => v2,
        }
    }

    /// Attaches node positions, migrating to the current version.
    pub fn with_layout(self, layout: NodeLayout) -> Self {
        let mut current = self.into_current();
        current.node_positions = layout;
        Self::V2(current)
    }

    /// Node positions. Legacy blobs have none.
    pub fn layout(&self) -> Option<&NodeLayout> {
        match self {
            Self::V1(_) => None,
            Self::V2(v2) => Some(&v2.node_positions),
        }
    }

    /// Encodes the blob as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| PlanError::invalid_blob("blob", e.to_string()))
    }

    /// Decodes a blob from JSON text.
    ///
    /// # Errors
    /// [`PlanError::InvalidBlob`] naming the first malformed field.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| PlanError::invalid_blob("blob", e.to_string()))?;
        Self::from_value(&value)
    }

    /// Decodes a blob from a parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| PlanError::invalid_blob("blob", "expected a JSON object"))?;

        let version = match obj.get("version") {
            None => return Err(PlanError::invalid_blob("version", "missing")),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(PlanError::invalid_blob(
                    "version",
                    format!("expected a string, got {other}"),
                ))
            }
        };

        match version.as_str() {
            "1" => decode_v1(obj).map(Self::V1),
            "2" => decode_v2(obj).map(Self::V2),
            other => Err(PlanError::invalid_blob(
                "version",
                format!("unsupported version '{other}'"),
            )),
        }
    }
}

fn decode_v1(obj: &Map<String, Value>) -> Result<PlanBlobV1> {
    let current_semester = match obj.get("currentSemester") {
        None | Some(Value::Null) => None,
        Some(_) => Some(knob(obj, "currentSemester")?),
    };
    let semesters = semester_lists(obj, "semesters")?;
    check_window(current_semester.unwrap_or(1), semesters.len(), "currentSemester")?;

    Ok(PlanBlobV1 {
        required_courses: string_list(obj, "requiredCourses")?,
        transfer_credits: string_list(obj, "transferCredits")?,
        time_to_graduate: knob(obj, "timeToGraduate")?,
        course_per_semester: knob(obj, "coursePerSemester")?,
        current_semester,
        semesters,
    })
}

fn decode_v2(obj: &Map<String, Value>) -> Result<PlanBlobV2> {
    let node_positions = match obj.get("node_positions") {
        None | Some(Value::Null) => NodeLayout::new(),
        Some(value) => layout(value)?,
    };
    let current_semester = knob(obj, "current_semester")?;
    let semesters = semester_lists(obj, "semesters")?;
    check_window(current_semester, semesters.len(), "current_semester")?;

    Ok(PlanBlobV2 {
        required_courses: string_list(obj, "required_courses")?.into_iter().collect(),
        transfer_credits: string_list(obj, "transfer_credits")?.into_iter().collect(),
        time_to_graduate: knob(obj, "time_to_graduate")?,
        course_per_semester: knob(obj, "course_per_semester")?,
        current_semester,
        semesters,
        node_positions,
    })
}

/// Rejects semester lists longer than a plan may be, or whose last entry
/// has no `u32` semester number.
fn check_window(current_semester: u32, count: usize, name: &str) -> Result<()> {
    if count > MAX_PLAN_SEMESTERS as usize {
        return Err(PlanError::invalid_blob(
            "semesters",
            format!("{count} semesters, at most {MAX_PLAN_SEMESTERS} allowed"),
        ));
    }
    let last_offset = count.saturating_sub(1) as u32;
    if current_semester.checked_add(last_offset).is_none() {
        return Err(PlanError::invalid_blob(
            name,
            format!("{current_semester} plus {count} semesters is out of range"),
        ));
    }
    Ok(())
}

fn field<'v>(obj: &'v Map<String, Value>, name: &str) -> Result<&'v Value> {
    obj.get(name)
        .ok_or_else(|| PlanError::invalid_blob(name, "missing"))
}

fn strings(value: &Value, path: &str) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| PlanError::invalid_blob(path, "expected an array"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_owned)
                .ok_or_else(|| {
                    PlanError::invalid_blob(format!("{path}[{i}]"), "expected a course id string")
                })
        })
        .collect()
}

fn string_list(obj: &Map<String, Value>, name: &str) -> Result<Vec<String>> {
    strings(field(obj, name)?, name)
}

fn semester_lists(obj: &Map<String, Value>, name: &str) -> Result<Vec<Vec<String>>> {
    let items = field(obj, name)?
        .as_array()
        .ok_or_else(|| PlanError::invalid_blob(name, "expected an array of semesters"))?;
    items
        .iter()
        .enumerate()
        .map(|(k, semester)| strings(semester, &format!("{name}[{k}]")))
        .collect()
}

fn knob(obj: &Map<String, Value>, name: &str) -> Result<u32> {
    let value = field(obj, name)?
        .as_u64()
        .ok_or_else(|| PlanError::invalid_blob(name, "expected a non-negative integer"))?;
    match u32::try_from(value) {
        Ok(0) => Err(PlanError::invalid_blob(name, "must be at least 1")),
        Ok(v) => Ok(v),
        Err(_) => Err(PlanError::invalid_blob(name, "out of range")),
    }
}

fn layout(value: &Value) -> Result<NodeLayout> {
    let entries = value
        .as_object()
        .ok_or_else(|| PlanError::invalid_blob("node_positions", "expected an object"))?;
    let mut layout = NodeLayout::new();
    for (id, pos) in entries {
        let coord = |axis: &str| {
            pos.get(axis).and_then(Value::as_f64).ok_or_else(|| {
                PlanError::invalid_blob(format!("node_positions.{id}.{axis}"), "expected a number")
            })
        };
        layout.set(id.clone(), NodePosition::new(coord("x")?, coord("y")?));
    }
    Ok(layout)
}
