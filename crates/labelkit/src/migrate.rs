use anyhow::Result;
use sqlx::SqlitePool;

/// Create the schema. Idempotent, safe to run on every startup.
///
/// The unique index on `(project_id, content_key)` backs the
/// content-identity dedup invariant: a concurrent duplicate-create race
/// surfaces as a constraint violation instead of a second record.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            created_on INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS images (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            filename TEXT NOT NULL,
            content BLOB NOT NULL,
            content_key TEXT NOT NULL,
            mime_type TEXT NOT NULL DEFAULT 'application/octet-stream',
            width REAL NOT NULL,
            height REAL NOT NULL,
            width_multiplier REAL NOT NULL DEFAULT 1.0,
            height_multiplier REAL NOT NULL DEFAULT 1.0,
            rectangle_annotations TEXT NOT NULL DEFAULT '[]',
            polygon_annotations TEXT NOT NULL DEFAULT '[]',
            segmentation_annotations TEXT NOT NULL DEFAULT '[]',
            UNIQUE(project_id, content_key),
            FOREIGN KEY (project_id) REFERENCES projects(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS text_annotations (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            text TEXT NOT NULL,
            entities TEXT NOT NULL DEFAULT '[]',
            revision INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (project_id) REFERENCES projects(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_images_project_id ON images(project_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_text_annotations_project_id ON text_annotations(project_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
