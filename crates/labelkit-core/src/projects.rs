//! Project creation and lookup.
//!
//! Projects are the ownership unit for images and text records. They
//! are created once and read-only afterwards; the engine components
//! resolve them by name before touching anything they own.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::Project;
use crate::store::Store;

/// Create a project with a unique name.
pub async fn create_project(
    store: &dyn Store,
    name: &str,
    description: Option<String>,
) -> EngineResult<Project> {
    if name.is_empty() {
        return Err(EngineError::MalformedInput(
            "project name must not be empty".to_string(),
        ));
    }
    if store.find_project_by_name(name).await?.is_some() {
        return Err(EngineError::MalformedInput(format!(
            "project '{}' already exists",
            name
        )));
    }

    let project = Project {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description,
        created_on: Utc::now().timestamp(),
    };
    store.insert_project(&project).await?;
    Ok(project)
}

/// Resolve a project by name, failing with
/// [`EngineError::ProjectNotFound`] when absent.
pub async fn resolve_project(store: &dyn Store, name: &str) -> EngineResult<Project> {
    store
        .find_project_by_name(name)
        .await?
        .ok_or(EngineError::ProjectNotFound)
}
