//! SQLite-backed [`Store`] implementation.
//!
//! Maps each [`Store`] operation to SQL against the schema created by
//! [`crate::migrate`]. Shape annotation and entity span lists are
//! persisted as JSON text columns; image bytes are stored as a BLOB
//! next to their SHA-256 content key so dedup lookups stay indexed.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use labelkit_core::models::{
    EntitySpan, Image, Project, ShapeAnnotation, TextAnnotationRecord,
};
use labelkit_core::store::{ImageUpdate, Store};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn shapes_from_json(raw: &str) -> Result<Vec<ShapeAnnotation>> {
    Ok(serde_json::from_str(raw)?)
}

fn image_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Image> {
    let rectangles: String = row.get("rectangle_annotations");
    let polygons: String = row.get("polygon_annotations");
    let segmentations: String = row.get("segmentation_annotations");

    Ok(Image {
        id: row.get("id"),
        project_id: row.get("project_id"),
        filename: row.get("filename"),
        content: row.get("content"),
        content_key: row.get("content_key"),
        mime_type: row.get("mime_type"),
        width: row.get("width"),
        height: row.get("height"),
        width_multiplier: row.get("width_multiplier"),
        height_multiplier: row.get("height_multiplier"),
        rectangle_annotations: shapes_from_json(&rectangles)?,
        polygon_annotations: shapes_from_json(&polygons)?,
        segmentation_annotations: shapes_from_json(&segmentations)?,
    })
}

fn text_record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<TextAnnotationRecord> {
    let entities: String = row.get("entities");
    Ok(TextAnnotationRecord {
        id: row.get("id"),
        project_id: row.get("project_id"),
        text: row.get("text"),
        entities: serde_json::from_str(&entities)?,
        revision: row.get("revision"),
    })
}

const IMAGE_COLUMNS: &str = "id, project_id, filename, content, content_key, mime_type, \
     width, height, width_multiplier, height_multiplier, \
     rectangle_annotations, polygon_annotations, segmentation_annotations";

#[async_trait]
impl Store for SqliteStore {
    async fn insert_project(&self, project: &Project) -> Result<String> {
        sqlx::query(
            "INSERT INTO projects (id, name, description, created_on) VALUES (?, ?, ?, ?)",
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.created_on)
        .execute(&self.pool)
        .await?;

        Ok(project.id.clone())
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        let row = sqlx::query(
            "SELECT id, name, description, created_on FROM projects WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Project {
            id: r.get("id"),
            name: r.get("name"),
            description: r.get("description"),
            created_on: r.get("created_on"),
        }))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query(
            "SELECT id, name, description, created_on FROM projects ORDER BY created_on ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| Project {
                id: r.get("id"),
                name: r.get("name"),
                description: r.get("description"),
                created_on: r.get("created_on"),
            })
            .collect())
    }

    async fn find_image_by_content_key(
        &self,
        project_id: &str,
        content_key: &str,
    ) -> Result<Option<Image>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM images WHERE project_id = ? AND content_key = ?",
            IMAGE_COLUMNS
        ))
        .bind(project_id)
        .bind(content_key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(image_from_row).transpose()
    }

    async fn get_image(&self, image_id: &str) -> Result<Option<Image>> {
        let row = sqlx::query(&format!("SELECT {} FROM images WHERE id = ?", IMAGE_COLUMNS))
            .bind(image_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(image_from_row).transpose()
    }

    async fn list_images(&self, project_id: &str) -> Result<Vec<Image>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM images WHERE project_id = ?",
            IMAGE_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(image_from_row).collect()
    }

    async fn insert_image(&self, image: &Image) -> Result<String> {
        sqlx::query(
            r#"
            INSERT INTO images (id, project_id, filename, content, content_key, mime_type,
                                width, height, width_multiplier, height_multiplier,
                                rectangle_annotations, polygon_annotations, segmentation_annotations)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&image.id)
        .bind(&image.project_id)
        .bind(&image.filename)
        .bind(&image.content)
        .bind(&image.content_key)
        .bind(&image.mime_type)
        .bind(image.width)
        .bind(image.height)
        .bind(image.width_multiplier)
        .bind(image.height_multiplier)
        .bind(serde_json::to_string(&image.rectangle_annotations)?)
        .bind(serde_json::to_string(&image.polygon_annotations)?)
        .bind(serde_json::to_string(&image.segmentation_annotations)?)
        .execute(&self.pool)
        .await?;

        Ok(image.id.clone())
    }

    async fn update_image_annotations(&self, image_id: &str, update: &ImageUpdate) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE images
            SET rectangle_annotations = ?,
                polygon_annotations = ?,
                segmentation_annotations = ?,
                mime_type = ?,
                width_multiplier = ?,
                height_multiplier = ?
            WHERE id = ?
            "#,
        )
        .bind(serde_json::to_string(&update.rectangle_annotations)?)
        .bind(serde_json::to_string(&update.polygon_annotations)?)
        .bind(serde_json::to_string(&update.segmentation_annotations)?)
        .bind(&update.mime_type)
        .bind(update.width_multiplier)
        .bind(update.height_multiplier)
        .bind(image_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_image(&self, image_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(image_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_text_record(&self, project_id: &str) -> Result<Option<TextAnnotationRecord>> {
        let row = sqlx::query(
            "SELECT id, project_id, text, entities, revision FROM text_annotations WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(text_record_from_row).transpose()
    }

    async fn list_text_records(&self, project_id: &str) -> Result<Vec<TextAnnotationRecord>> {
        let rows = sqlx::query(
            "SELECT id, project_id, text, entities, revision FROM text_annotations WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(text_record_from_row).collect()
    }

    async fn insert_text_record(&self, record: &TextAnnotationRecord) -> Result<String> {
        sqlx::query(
            "INSERT INTO text_annotations (id, project_id, text, entities, revision) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.project_id)
        .bind(&record.text)
        .bind(serde_json::to_string(&record.entities)?)
        .bind(record.revision)
        .execute(&self.pool)
        .await?;

        Ok(record.id.clone())
    }

    async fn replace_text_record(
        &self,
        record_id: &str,
        text: &str,
        entities: &[EntitySpan],
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE text_annotations SET text = ?, entities = ?, revision = revision + 1 WHERE id = ?",
        )
        .bind(text)
        .bind(serde_json::to_string(entities)?)
        .bind(record_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
