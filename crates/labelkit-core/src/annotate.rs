//! Difference-checked text annotation persistence.
//!
//! Computes entity spans for a project's text via [`crate::entity`] and
//! keeps exactly one active [`TextAnnotationRecord`] per project. The
//! stored record is replaced only when the newly computed entity list
//! differs from the stored one, so client retries with identical input
//! cause no persistence churn; the record's revision marker stays put.
//!
//! The sequence is compute, then compare, then write: no write happens
//! until the full new state is ready, so a crash mid-request leaves
//! prior state intact.

use uuid::Uuid;

use crate::entity;
use crate::error::EngineResult;
use crate::models::{EntityDefinition, EntitySpan, TextAnnotationRecord};
use crate::projects::resolve_project;
use crate::store::Store;

/// Annotate `text` for a project and persist the result.
///
/// Returns the computed spans in discovery order regardless of whether
/// a write occurred.
pub async fn annotate_text(
    store: &dyn Store,
    project_name: &str,
    text: &str,
    definitions: &[EntityDefinition],
) -> EngineResult<Vec<EntitySpan>> {
    let project = resolve_project(store, project_name).await?;

    let spans = entity::annotate(text, definitions)?;

    match store.find_text_record(&project.id).await? {
        Some(existing) => {
            if existing.entities != spans {
                store.replace_text_record(&existing.id, text, &spans).await?;
            }
        }
        None => {
            let record = TextAnnotationRecord {
                id: Uuid::new_v4().to_string(),
                project_id: project.id,
                text: text.to_string(),
                entities: spans.clone(),
                revision: 0,
            };
            store.insert_text_record(&record).await?;
        }
    }

    Ok(spans)
}

/// Every stored text record for a project, with its spans.
pub async fn full_text_records(
    store: &dyn Store,
    project_name: &str,
) -> EngineResult<Vec<TextAnnotationRecord>> {
    let project = resolve_project(store, project_name).await?;
    Ok(store.list_text_records(&project.id).await?)
}
