//! Label aggregation over stored text annotations.
//!
//! Derives the distinct set of label definitions in use for a project
//! by scanning its persisted entity spans. Uniqueness is by the full
//! display tuple: two spans with the same entity and label but
//! different colors count as distinct definitions. The result is
//! unordered; callers must not rely on any particular order.

use std::collections::HashSet;

use crate::error::EngineResult;
use crate::models::LabelDefinition;
use crate::projects::resolve_project;
use crate::store::Store;

/// The distinct label definitions referenced by a project's spans.
pub async fn labels_for_project(
    store: &dyn Store,
    project_name: &str,
) -> EngineResult<Vec<LabelDefinition>> {
    let project = resolve_project(store, project_name).await?;

    let mut unique: HashSet<LabelDefinition> = HashSet::new();
    for record in store.list_text_records(&project.id).await? {
        for span in record.entities {
            unique.insert(LabelDefinition {
                entity: span.entity,
                label: span.label,
                color: span.color,
                background_color: span.background_color,
                text_color: span.text_color,
            });
        }
    }

    Ok(unique.into_iter().collect())
}
