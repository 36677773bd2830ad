//! Core data models used throughout Labelkit.
//!
//! These types represent the projects, images, shape annotations, and
//! entity spans that flow through the upload and text-annotation
//! pipelines. Shape annotations are a single tagged-variant type with
//! one canonical field set per kind, decoded once at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single point of a polygon or segmentation outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The three supported shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Polygon,
    Segmentation,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Rectangle => write!(f, "rectangle"),
            ShapeKind::Polygon => write!(f, "polygon"),
            ShapeKind::Segmentation => write!(f, "segmentation"),
        }
    }
}

/// A geometric annotation attached to an image.
///
/// The `kind` tag is fixed per variant and not independently settable
/// by callers; a payload with a missing or unknown tag fails to decode.
/// `class_id` is a label identifier and not necessarily integral.
/// `color` is caller-supplied display data and is not validated for
/// format. `rotation` is in degrees with an unconstrained range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeAnnotation {
    Rectangle {
        class_name: String,
        class_id: f64,
        color: String,
        editable: bool,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rotation: f64,
    },
    Polygon {
        class_name: String,
        class_id: f64,
        color: String,
        editable: bool,
        points: Vec<Point>,
    },
    Segmentation {
        class_name: String,
        class_id: f64,
        color: String,
        editable: bool,
        points: Vec<Point>,
    },
}

impl ShapeAnnotation {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeAnnotation::Rectangle { .. } => ShapeKind::Rectangle,
            ShapeAnnotation::Polygon { .. } => ShapeKind::Polygon,
            ShapeAnnotation::Segmentation { .. } => ShapeKind::Segmentation,
        }
    }

    pub fn class_name(&self) -> &str {
        match self {
            ShapeAnnotation::Rectangle { class_name, .. }
            | ShapeAnnotation::Polygon { class_name, .. }
            | ShapeAnnotation::Segmentation { class_name, .. } => class_name,
        }
    }
}

/// A named annotation project. Projects own images and text records by
/// reference and are read-only after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Unix timestamp of creation.
    pub created_on: i64,
}

/// One stored image record per (project, distinct content) pair.
///
/// `content_key` is the SHA-256 hex of `content`, used for exact-match
/// dedup lookups within a project. The three annotation lists are each
/// independently replaceable and are replaced wholesale on re-upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub project_id: String,
    pub filename: String,
    pub content: Vec<u8>,
    pub content_key: String,
    pub mime_type: String,
    pub width: f64,
    pub height: f64,
    pub width_multiplier: f64,
    pub height_multiplier: f64,
    pub rectangle_annotations: Vec<ShapeAnnotation>,
    pub polygon_annotations: Vec<ShapeAnnotation>,
    pub segmentation_annotations: Vec<ShapeAnnotation>,
}

/// A caller-supplied entity pattern with its display style.
///
/// `entity` is always treated as a literal substring, never a pattern
/// language. `label` defaults to `"UNKNOWN"` and `background_color` to
/// `"#ffffff"` when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub entity: String,
    #[serde(default)]
    pub label: Option<String>,
    pub color: String,
    #[serde(default)]
    pub background_color: Option<String>,
    pub text_color: String,
}

/// A labeled character-offset range within an annotated text.
///
/// `start_pos`/`end_pos` are half-open, 0-indexed character offsets
/// into the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub entity: String,
    pub label: String,
    pub start_pos: usize,
    pub end_pos: usize,
    pub color: String,
    pub background_color: String,
    pub text_color: String,
}

/// The stored text annotation for a project.
///
/// One active record per project; replaced in place only when a newly
/// computed entity list differs from the stored one. `revision`
/// increments on every real write and is left untouched by no-op
/// annotate calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextAnnotationRecord {
    pub id: String,
    pub project_id: String,
    pub text: String,
    pub entities: Vec<EntitySpan>,
    pub revision: i64,
}

/// A distinct (entity, label, style) definition in use for a project.
///
/// Uniqueness is by the full display tuple: two spans with the same
/// entity and label but different colors are distinct definitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelDefinition {
    pub entity: String,
    pub label: String,
    pub color: String,
    pub background_color: String,
    pub text_color: String,
}
