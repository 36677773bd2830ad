//! Annotation HTTP server.
//!
//! Exposes the annotation engine over a JSON HTTP API with permissive
//! CORS for browser-based labeling frontends.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/projects` | Create a project |
//! | `GET`  | `/projects` | List projects |
//! | `POST` | `/projects/{name}/upload` | Upsert an image with its shape annotations |
//! | `GET`  | `/projects/{name}/images` | List a project's images (metadata only) |
//! | `GET`  | `/images/{id}` | Image metadata and annotations |
//! | `GET`  | `/images/{id}/content` | Raw image bytes with the stored mime type |
//! | `DELETE` | `/images/{id}` | Delete an image |
//! | `POST` | `/annotate/{name}/ner` | Compute and persist entity spans for a text |
//! | `GET`  | `/projects/{name}/ner/labels` | Distinct label definitions in use |
//! | `GET`  | `/projects/{name}/ner/full-text` | Stored text records with spans |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Every error is a single structured response:
//!
//! ```json
//! { "error": { "code": "invalid_annotation", "message": "polygon must have at least 3 points, got 2" } }
//! ```
//!
//! Codes: `malformed_input` (400), `invalid_annotation` (400),
//! `not_found` (404), `internal` (500). No stack traces or internal
//! identifiers are exposed.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use labelkit_core::models::{
    EntityDefinition, EntitySpan, Image, LabelDefinition, ShapeAnnotation,
};
use labelkit_core::reconcile::{self, ImageUpload};
use labelkit_core::store::Store;
use labelkit_core::{annotate, labels, projects, EngineError};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    store: Arc<SqliteStore>,
}

/// Starts the annotation HTTP server.
///
/// Runs migrations, binds to the configured address, and serves until
/// the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;

    let state = AppState {
        store: Arc::new(SqliteStore::new(pool)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/projects", post(handle_create_project).get(handle_list_projects))
        .route("/projects/{name}/upload", post(handle_upload))
        .route("/projects/{name}/images", get(handle_list_images))
        .route("/images/{id}", get(handle_get_image).delete(handle_delete_image))
        .route("/images/{id}/content", get(handle_image_content))
        .route("/annotate/{name}/ner", post(handle_annotate))
        .route("/projects/{name}/ner/labels", get(handle_labels))
        .route("/projects/{name}/ner/full-text", get(handle_full_text))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    tracing::info!(bind = %config.server.bind, "annotation server listening");
    println!("annotation server listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ProjectNotFound | EngineError::ImageNotFound(_) => AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found".to_string(),
                message: err.to_string(),
            },
            EngineError::InvalidAnnotation(_) => AppError {
                status: StatusCode::BAD_REQUEST,
                code: "invalid_annotation".to_string(),
                message: err.to_string(),
            },
            EngineError::MalformedInput(_) => AppError {
                status: StatusCode::BAD_REQUEST,
                code: "malformed_input".to_string(),
                message: err.to_string(),
            },
            EngineError::Storage(inner) => {
                tracing::error!(error = %inner, "storage failure");
                AppError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "internal".to_string(),
                    message: "internal storage failure".to_string(),
                }
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Projects ============

#[derive(Deserialize)]
struct CreateProjectRequest {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Serialize)]
struct CreateProjectResponse {
    project_id: String,
}

async fn handle_create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<CreateProjectResponse>, AppError> {
    let project =
        projects::create_project(state.store.as_ref(), &req.name, req.description).await?;
    tracing::info!(project = %project.name, "project created");
    Ok(Json(CreateProjectResponse {
        project_id: project.id,
    }))
}

#[derive(Serialize)]
struct ProjectResponse {
    project_id: String,
    name: String,
    description: Option<String>,
    created_on: i64,
}

async fn handle_list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let projects = state
        .store
        .list_projects()
        .await
        .map_err(EngineError::Storage)?;
    Ok(Json(
        projects
            .into_iter()
            .map(|p| ProjectResponse {
                project_id: p.id,
                name: p.name,
                description: p.description,
                created_on: p.created_on,
            })
            .collect(),
    ))
}

// ============ Image upload / retrieval ============

#[derive(Deserialize)]
struct ImageMeta {
    width: f64,
    height: f64,
    #[serde(default)]
    width_multiplier: Option<f64>,
    #[serde(default)]
    height_multiplier: Option<f64>,
}

#[derive(Deserialize)]
struct UploadRequest {
    file_content: String,
    file_name: String,
    #[serde(default)]
    mime_type: Option<String>,
    image: ImageMeta,
    #[serde(default)]
    rectangle_annotations: Vec<ShapeAnnotation>,
    #[serde(default)]
    polygon_annotations: Vec<ShapeAnnotation>,
    #[serde(default)]
    segmentation_annotations: Vec<ShapeAnnotation>,
}

#[derive(Serialize)]
struct UploadResponse {
    image_id: String,
    created: bool,
}

async fn handle_upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    let file_bytes = BASE64
        .decode(&req.file_content)
        .map_err(|e| EngineError::MalformedInput(format!("file_content is not valid base64: {}", e)))?;

    let upload = ImageUpload {
        filename: req.file_name,
        mime_type: req.mime_type,
        width: req.image.width,
        height: req.image.height,
        width_multiplier: req.image.width_multiplier,
        height_multiplier: req.image.height_multiplier,
        rectangle_annotations: req.rectangle_annotations,
        polygon_annotations: req.polygon_annotations,
        segmentation_annotations: req.segmentation_annotations,
    };

    let outcome =
        reconcile::upsert_image(state.store.as_ref(), &name, file_bytes, upload).await?;
    tracing::info!(project = %name, image_id = %outcome.image_id, created = outcome.created, "image upserted");
    Ok(Json(UploadResponse {
        image_id: outcome.image_id,
        created: outcome.created,
    }))
}

/// Image metadata response. `content_reference` points at the raw-bytes
/// endpoint so large payloads are never inlined in metadata responses.
#[derive(Serialize)]
struct ImageResponse {
    image_id: String,
    filename: String,
    mime_type: String,
    width: f64,
    height: f64,
    width_multiplier: f64,
    height_multiplier: f64,
    rectangle_annotations: Vec<ShapeAnnotation>,
    polygon_annotations: Vec<ShapeAnnotation>,
    segmentation_annotations: Vec<ShapeAnnotation>,
    content_reference: String,
}

fn image_response(image: Image) -> ImageResponse {
    ImageResponse {
        content_reference: format!("/images/{}/content", image.id),
        image_id: image.id,
        filename: image.filename,
        mime_type: image.mime_type,
        width: image.width,
        height: image.height,
        width_multiplier: image.width_multiplier,
        height_multiplier: image.height_multiplier,
        rectangle_annotations: image.rectangle_annotations,
        polygon_annotations: image.polygon_annotations,
        segmentation_annotations: image.segmentation_annotations,
    }
}

async fn handle_list_images(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    let images = reconcile::list_images(state.store.as_ref(), &name).await?;
    Ok(Json(images.into_iter().map(image_response).collect()))
}

async fn handle_get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImageResponse>, AppError> {
    let image = reconcile::get_image(state.store.as_ref(), &id).await?;
    Ok(Json(image_response(image)))
}

async fn handle_image_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let image = reconcile::get_image(state.store.as_ref(), &id).await?;
    Ok(([(header::CONTENT_TYPE, image.mime_type)], image.content).into_response())
}

async fn handle_delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    reconcile::delete_image(state.store.as_ref(), &id).await?;
    tracing::info!(image_id = %id, "image deleted");
    Ok(Json(serde_json::json!({
        "message": format!("Image with id {} and all its annotations have been deleted.", id)
    })))
}

// ============ Text annotation ============

#[derive(Deserialize)]
struct AnnotateRequest {
    text: String,
    #[serde(default)]
    entities: Vec<EntityDefinition>,
}

async fn handle_annotate(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<AnnotateRequest>,
) -> Result<Json<Vec<EntitySpan>>, AppError> {
    let spans =
        annotate::annotate_text(state.store.as_ref(), &name, &req.text, &req.entities).await?;
    Ok(Json(spans))
}

async fn handle_labels(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<LabelDefinition>>, AppError> {
    let labels = labels::labels_for_project(state.store.as_ref(), &name).await?;
    Ok(Json(labels))
}

#[derive(Serialize)]
struct TextRecordResponse {
    id: String,
    text: String,
    entities: Vec<EntitySpan>,
}

async fn handle_full_text(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<TextRecordResponse>>, AppError> {
    let records = annotate::full_text_records(state.store.as_ref(), &name).await?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| TextRecordResponse {
                id: r.id,
                text: r.text,
                entities: r.entities,
            })
            .collect(),
    ))
}
