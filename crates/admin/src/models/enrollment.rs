//! Workshop enrollments.

use oakline_core::StudentId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resources::{Resource, ResourceKind};

/// A student enrolled in a woodworking course.
///
/// Served under `student` or `Enrollment` envelopes as well as `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Student {
    type Id = StudentId;
    const KIND: ResourceKind = ResourceKind::Students;
}
