//! In-memory [`Store`] implementation for tests.
//!
//! Uses `HashMap` and `Vec` behind `std::sync::RwLock` for thread
//! safety. Lookups are linear scans; this backend exists so the engine
//! and its properties can be exercised without a database.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{EntitySpan, Image, Project, TextAnnotationRecord};

use super::{ImageUpdate, Store};

/// In-memory store for tests.
#[derive(Default)]
pub struct InMemoryStore {
    projects: RwLock<Vec<Project>>,
    images: RwLock<HashMap<String, Image>>,
    text_records: RwLock<HashMap<String, TextAnnotationRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_project(&self, project: &Project) -> Result<String> {
        let mut projects = self.projects.write().unwrap();
        if projects.iter().any(|p| p.name == project.name) {
            bail!("project '{}' already exists", project.name);
        }
        projects.push(project.clone());
        Ok(project.id.clone())
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        let projects = self.projects.read().unwrap();
        Ok(projects.iter().find(|p| p.name == name).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.read().unwrap().clone())
    }

    async fn find_image_by_content_key(
        &self,
        project_id: &str,
        content_key: &str,
    ) -> Result<Option<Image>> {
        let images = self.images.read().unwrap();
        Ok(images
            .values()
            .find(|img| img.project_id == project_id && img.content_key == content_key)
            .cloned())
    }

    async fn get_image(&self, image_id: &str) -> Result<Option<Image>> {
        Ok(self.images.read().unwrap().get(image_id).cloned())
    }

    async fn list_images(&self, project_id: &str) -> Result<Vec<Image>> {
        let images = self.images.read().unwrap();
        Ok(images
            .values()
            .filter(|img| img.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn insert_image(&self, image: &Image) -> Result<String> {
        let mut images = self.images.write().unwrap();
        if images
            .values()
            .any(|img| img.project_id == image.project_id && img.content_key == image.content_key)
        {
            bail!(
                "duplicate content key {} in project {}",
                image.content_key,
                image.project_id
            );
        }
        images.insert(image.id.clone(), image.clone());
        Ok(image.id.clone())
    }

    async fn update_image_annotations(&self, image_id: &str, update: &ImageUpdate) -> Result<u64> {
        let mut images = self.images.write().unwrap();
        match images.get_mut(image_id) {
            Some(img) => {
                img.rectangle_annotations = update.rectangle_annotations.clone();
                img.polygon_annotations = update.polygon_annotations.clone();
                img.segmentation_annotations = update.segmentation_annotations.clone();
                img.mime_type = update.mime_type.clone();
                img.width_multiplier = update.width_multiplier;
                img.height_multiplier = update.height_multiplier;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_image(&self, image_id: &str) -> Result<u64> {
        let mut images = self.images.write().unwrap();
        Ok(if images.remove(image_id).is_some() { 1 } else { 0 })
    }

    async fn find_text_record(&self, project_id: &str) -> Result<Option<TextAnnotationRecord>> {
        let records = self.text_records.read().unwrap();
        Ok(records
            .values()
            .find(|r| r.project_id == project_id)
            .cloned())
    }

    async fn list_text_records(&self, project_id: &str) -> Result<Vec<TextAnnotationRecord>> {
        let records = self.text_records.read().unwrap();
        Ok(records
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn insert_text_record(&self, record: &TextAnnotationRecord) -> Result<String> {
        let mut records = self.text_records.write().unwrap();
        records.insert(record.id.clone(), record.clone());
        Ok(record.id.clone())
    }

    async fn replace_text_record(
        &self,
        record_id: &str,
        text: &str,
        entities: &[EntitySpan],
    ) -> Result<u64> {
        let mut records = self.text_records.write().unwrap();
        match records.get_mut(record_id) {
            Some(record) => {
                record.text = text.to_string();
                record.entities = entities.to_vec();
                record.revision += 1;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
