//! Storage abstraction for Labelkit.
//!
//! The [`Store`] trait defines all persistence operations the
//! annotation engine needs, enabling pluggable backends (SQLite,
//! in-memory). It is the only suspension point in the engine: shape
//! validation and entity matching are computed synchronously.
//!
//! Implementations must be `Send + Sync` to work with async runtimes,
//! and must provide per-record atomicity for a single update call:
//! [`Store::update_image_annotations`] replaces the three annotation
//! lists and mutable metadata in one operation so no caller ever
//! observes a half-replaced record.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{EntitySpan, Image, Project, ShapeAnnotation, TextAnnotationRecord};

/// Mutable fields applied to an existing image on re-upload.
///
/// `content`, `filename`, and dimensions are deliberately absent: a
/// repeat upload of identical content leaves them untouched.
#[derive(Debug, Clone)]
pub struct ImageUpdate {
    pub rectangle_annotations: Vec<ShapeAnnotation>,
    pub polygon_annotations: Vec<ShapeAnnotation>,
    pub segmentation_annotations: Vec<ShapeAnnotation>,
    pub mime_type: String,
    pub width_multiplier: f64,
    pub height_multiplier: f64,
}

/// Abstract storage backend for the annotation engine.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_project`](Store::insert_project) | Create a project |
/// | [`find_project_by_name`](Store::find_project_by_name) | Resolve a project by its unique name |
/// | [`list_projects`](Store::list_projects) | All projects |
/// | [`find_image_by_content_key`](Store::find_image_by_content_key) | Dedup lookup within a project |
/// | [`insert_image`](Store::insert_image) | Create an image record |
/// | [`update_image_annotations`](Store::update_image_annotations) | Replace annotation lists wholesale |
/// | [`get_image`](Store::get_image) / [`list_images`](Store::list_images) | Read side |
/// | [`delete_image`](Store::delete_image) | Hard delete |
/// | [`find_text_record`](Store::find_text_record) | Active text record for a project |
/// | [`insert_text_record`](Store::insert_text_record) | First annotate call |
/// | [`replace_text_record`](Store::replace_text_record) | Difference-checked replace |
/// | [`list_text_records`](Store::list_text_records) | All text records for a project |
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a project. Fails if the name is already taken.
    async fn insert_project(&self, project: &Project) -> Result<String>;

    /// Resolve a project by its unique name.
    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>>;

    /// All projects, in no guaranteed order.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Find the image with the given content key within a project.
    async fn find_image_by_content_key(
        &self,
        project_id: &str,
        content_key: &str,
    ) -> Result<Option<Image>>;

    /// Retrieve an image by id.
    async fn get_image(&self, image_id: &str) -> Result<Option<Image>>;

    /// All images of a project.
    async fn list_images(&self, project_id: &str) -> Result<Vec<Image>>;

    /// Insert a fully-populated image record, returning its id.
    async fn insert_image(&self, image: &Image) -> Result<String>;

    /// Atomically replace an image's annotation lists and mutable
    /// metadata. Returns the number of matched records (0 when the id
    /// does not resolve).
    async fn update_image_annotations(&self, image_id: &str, update: &ImageUpdate) -> Result<u64>;

    /// Delete an image record. Returns the number of deleted records.
    async fn delete_image(&self, image_id: &str) -> Result<u64>;

    /// The active text annotation record for a project, if any.
    async fn find_text_record(&self, project_id: &str) -> Result<Option<TextAnnotationRecord>>;

    /// All text annotation records for a project.
    async fn list_text_records(&self, project_id: &str) -> Result<Vec<TextAnnotationRecord>>;

    /// Insert a new text annotation record, returning its id.
    async fn insert_text_record(&self, record: &TextAnnotationRecord) -> Result<String>;

    /// Replace a text record's text and entity list, bumping its
    /// revision. Returns the number of matched records.
    async fn replace_text_record(
        &self,
        record_id: &str,
        text: &str,
        entities: &[EntitySpan],
    ) -> Result<u64>;
}
