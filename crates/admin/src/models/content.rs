//! Showcase content: portfolio projects, offered services and testimonials.

use oakline_core::types::lenient;
use oakline_core::{ProjectId, ServiceId, TestimonialId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resources::{ImageResource, Resource, ResourceKind};

/// A completed portfolio project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Project {
    type Id = ProjectId;
    const KIND: ResourceKind = ResourceKind::Projects;
}

impl ImageResource for Project {}

/// A service offered to customers (custom builds, restoration, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Service {
    type Id = ServiceId;
    const KIND: ResourceKind = ResourceKind::Services;
}

/// A customer testimonial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: TestimonialId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Star rating, 1-5.
    #[serde(
        default,
        deserialize_with = "lenient::optional_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Testimonial {
    type Id = TestimonialId;
    const KIND: ResourceKind = ResourceKind::Testimonials;
}
