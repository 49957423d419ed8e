// image.rs — 图片记录与清单加载

use crate::error::{Result, SphereError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One image placed on the sphere. `src` is opaque to the engine; the
/// rendering layer decides whether it is a path or a URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ImageRecord {
    pub fn new(id: impl Into<String>, src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
            alt: alt.into(),
            title: None,
            description: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Label for the detail view: title, then alt text, then id.
    pub fn caption(&self) -> &str {
        match &self.title {
            Some(t) if !t.is_empty() => t,
            _ if !self.alt.is_empty() => &self.alt,
            _ => &self.id,
        }
    }
}

/// Ids must be unique within one sphere.
pub fn ensure_unique_ids(images: &[ImageRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(images.len());
    for img in images {
        if !seen.insert(img.id.as_str()) {
            return Err(SphereError::DuplicateImageId(img.id.clone()));
        }
    }
    Ok(())
}

/// Load a JSON array of image records.
pub fn load_manifest(path: &Path) -> Result<Vec<ImageRecord>> {
    let text = std::fs::read_to_string(path).map_err(|source| SphereError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let images: Vec<ImageRecord> =
        serde_json::from_str(&text).map_err(|source| SphereError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    ensure_unique_ids(&images)?;
    log::debug!("loaded {} image records from {}", images.len(), path.display());
    Ok(images)
}
