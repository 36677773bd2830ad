//! Content-keyed image record reconciliation.
//!
//! Within a project, at most one image record may exist for a given
//! exact content value. An upload either creates a new record or
//! replaces the annotation lists of the existing one, keyed by the
//! SHA-256 of the raw bytes. All shapes are validated before any
//! lookup or write, so a failing upload leaves prior state intact.
//!
//! Concurrent first uploads of the same new content are not serialized
//! here; the storage backend is expected to enforce uniqueness of
//! `(project, content_key)` and surface a conflict as a storage error.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Image, ShapeAnnotation, ShapeKind};
use crate::projects::resolve_project;
use crate::shape;
use crate::store::{ImageUpdate, Store};

/// Mime type recorded when an upload does not specify one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// An incoming image upload, decoded at the boundary.
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub width: f64,
    pub height: f64,
    pub width_multiplier: Option<f64>,
    pub height_multiplier: Option<f64>,
    pub rectangle_annotations: Vec<ShapeAnnotation>,
    pub polygon_annotations: Vec<ShapeAnnotation>,
    pub segmentation_annotations: Vec<ShapeAnnotation>,
}

/// Result of an upsert: the record touched and whether it was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub image_id: String,
    pub created: bool,
}

/// Content identity key: SHA-256 hex of the raw media bytes.
pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Create or update the image record for `(project, content)`.
///
/// Validates every supplied shape first; any failure aborts the whole
/// call with no write. On a content match the three annotation lists
/// are replaced wholesale and mutable metadata (mime type, scale
/// multipliers) is updated, leaving content, filename, and dimensions
/// untouched. On a miss a fully-populated record is inserted.
pub async fn upsert_image(
    store: &dyn Store,
    project_name: &str,
    file_bytes: Vec<u8>,
    upload: ImageUpload,
) -> EngineResult<UpsertOutcome> {
    let project = resolve_project(store, project_name).await?;

    shape::validate_all(&upload.rectangle_annotations, ShapeKind::Rectangle)?;
    shape::validate_all(&upload.polygon_annotations, ShapeKind::Polygon)?;
    shape::validate_all(&upload.segmentation_annotations, ShapeKind::Segmentation)?;

    let key = content_key(&file_bytes);
    let mime_type = upload
        .mime_type
        .clone()
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
    let width_multiplier = upload.width_multiplier.unwrap_or(1.0);
    let height_multiplier = upload.height_multiplier.unwrap_or(1.0);

    let existing = store.find_image_by_content_key(&project.id, &key).await?;

    match existing {
        Some(image) => {
            let update = ImageUpdate {
                rectangle_annotations: upload.rectangle_annotations,
                polygon_annotations: upload.polygon_annotations,
                segmentation_annotations: upload.segmentation_annotations,
                mime_type,
                width_multiplier,
                height_multiplier,
            };
            let matched = store.update_image_annotations(&image.id, &update).await?;
            if matched == 0 {
                return Err(EngineError::ImageNotFound(image.id));
            }
            Ok(UpsertOutcome {
                image_id: image.id,
                created: false,
            })
        }
        None => {
            let image = Image {
                id: Uuid::new_v4().to_string(),
                project_id: project.id,
                filename: upload.filename,
                content: file_bytes,
                content_key: key,
                mime_type,
                width: upload.width,
                height: upload.height,
                width_multiplier,
                height_multiplier,
                rectangle_annotations: upload.rectangle_annotations,
                polygon_annotations: upload.polygon_annotations,
                segmentation_annotations: upload.segmentation_annotations,
            };
            let image_id = store.insert_image(&image).await?;
            Ok(UpsertOutcome {
                image_id,
                created: true,
            })
        }
    }
}

/// Retrieve an image by id, failing with
/// [`EngineError::ImageNotFound`] when absent.
pub async fn get_image(store: &dyn Store, image_id: &str) -> EngineResult<Image> {
    store
        .get_image(image_id)
        .await?
        .ok_or_else(|| EngineError::ImageNotFound(image_id.to_string()))
}

/// All images of a project.
pub async fn list_images(store: &dyn Store, project_name: &str) -> EngineResult<Vec<Image>> {
    let project = resolve_project(store, project_name).await?;
    Ok(store.list_images(&project.id).await?)
}

/// Hard-delete an image and everything attached to it.
pub async fn delete_image(store: &dyn Store, image_id: &str) -> EngineResult<()> {
    let deleted = store.delete_image(image_id).await?;
    if deleted == 0 {
        return Err(EngineError::ImageNotFound(image_id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;
    use crate::projects::create_project;
    use crate::store::memory::InMemoryStore;

    fn rectangle(class_name: &str) -> ShapeAnnotation {
        ShapeAnnotation::Rectangle {
            class_name: class_name.to_string(),
            class_id: 1.0,
            color: "#ff0000".to_string(),
            editable: true,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            rotation: 0.0,
        }
    }

    fn polygon(n: usize) -> ShapeAnnotation {
        ShapeAnnotation::Polygon {
            class_name: "roof".to_string(),
            class_id: 2.0,
            color: "#00ff00".to_string(),
            editable: true,
            points: (0..n)
                .map(|i| Point {
                    x: i as f64,
                    y: 0.0,
                })
                .collect(),
        }
    }

    fn upload_with(rects: Vec<ShapeAnnotation>, polys: Vec<ShapeAnnotation>) -> ImageUpload {
        ImageUpload {
            filename: "photo.jpg".to_string(),
            mime_type: Some("image/jpeg".to_string()),
            width: 640.0,
            height: 480.0,
            rectangle_annotations: rects,
            polygon_annotations: polys,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_repeat_upload_updates_in_place() {
        let store = InMemoryStore::new();
        create_project(&store, "P1", None).await.unwrap();

        let first = upsert_image(
            &store,
            "P1",
            b"abc".to_vec(),
            upload_with(vec![rectangle("cat")], vec![]),
        )
        .await
        .unwrap();
        assert!(first.created);

        let second = upsert_image(&store, "P1", b"abc".to_vec(), upload_with(vec![], vec![]))
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(first.image_id, second.image_id);

        let image = get_image(&store, &second.image_id).await.unwrap();
        assert!(image.rectangle_annotations.is_empty());
        assert_eq!(image.content, b"abc".to_vec());
        assert_eq!(image.filename, "photo.jpg");
    }

    #[tokio::test]
    async fn test_different_content_creates_second_record() {
        let store = InMemoryStore::new();
        create_project(&store, "P1", None).await.unwrap();

        let a = upsert_image(&store, "P1", b"abc".to_vec(), upload_with(vec![], vec![]))
            .await
            .unwrap();
        let b = upsert_image(&store, "P1", b"abcd".to_vec(), upload_with(vec![], vec![]))
            .await
            .unwrap();
        assert!(a.created && b.created);
        assert_ne!(a.image_id, b.image_id);
        assert_eq!(list_images(&store, "P1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_same_content_other_project_is_independent() {
        let store = InMemoryStore::new();
        create_project(&store, "P1", None).await.unwrap();
        create_project(&store, "P2", None).await.unwrap();

        let a = upsert_image(&store, "P1", b"abc".to_vec(), upload_with(vec![], vec![]))
            .await
            .unwrap();
        let b = upsert_image(&store, "P2", b"abc".to_vec(), upload_with(vec![], vec![]))
            .await
            .unwrap();
        assert!(a.created && b.created);
        assert_ne!(a.image_id, b.image_id);
    }

    #[tokio::test]
    async fn test_invalid_polygon_aborts_without_write() {
        let store = InMemoryStore::new();
        create_project(&store, "P1", None).await.unwrap();

        let err = upsert_image(
            &store,
            "P1",
            b"abc".to_vec(),
            upload_with(vec![], vec![polygon(2)]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAnnotation(_)));
        assert!(list_images(&store, "P1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_reupload_leaves_existing_record_untouched() {
        let store = InMemoryStore::new();
        create_project(&store, "P1", None).await.unwrap();

        let first = upsert_image(
            &store,
            "P1",
            b"abc".to_vec(),
            upload_with(vec![rectangle("cat")], vec![]),
        )
        .await
        .unwrap();

        let err = upsert_image(
            &store,
            "P1",
            b"abc".to_vec(),
            upload_with(vec![], vec![polygon(2)]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAnnotation(_)));

        let image = get_image(&store, &first.image_id).await.unwrap();
        assert_eq!(image.rectangle_annotations.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_project_rejected_before_validation() {
        let store = InMemoryStore::new();
        let err = upsert_image(&store, "nope", b"abc".to_vec(), upload_with(vec![], vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ProjectNotFound));
    }

    #[tokio::test]
    async fn test_mime_and_multiplier_defaults() {
        let store = InMemoryStore::new();
        create_project(&store, "P1", None).await.unwrap();

        let outcome = upsert_image(
            &store,
            "P1",
            b"abc".to_vec(),
            ImageUpload {
                filename: "blob".to_string(),
                width: 10.0,
                height: 10.0,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let image = get_image(&store, &outcome.image_id).await.unwrap();
        assert_eq!(image.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(image.width_multiplier, 1.0);
        assert_eq!(image.height_multiplier, 1.0);
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let store = InMemoryStore::new();
        create_project(&store, "P1", None).await.unwrap();
        let outcome = upsert_image(&store, "P1", b"abc".to_vec(), upload_with(vec![], vec![]))
            .await
            .unwrap();

        delete_image(&store, &outcome.image_id).await.unwrap();
        let err = get_image(&store, &outcome.image_id).await.unwrap_err();
        assert!(matches!(err, EngineError::ImageNotFound(_)));
        let err = delete_image(&store, &outcome.image_id).await.unwrap_err();
        assert!(matches!(err, EngineError::ImageNotFound(_)));
    }
}
