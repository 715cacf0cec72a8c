//! COCO format data structures and the read-only annotation index
//!
//! TAO-Amodal stores its annotations as a COCO file where every image also
//! carries the video it was extracted from. Only the fields needed to map
//! frames to category names are deserialized; everything else is ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{LabelsError, Result};

/// COCO category information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// COCO image information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    /// Conventionally `<split>/<video>/<frame>.<ext>`
    pub file_name: String,
    /// Explicit video the frame belongs to, e.g. `train/YFCC100M/v_abc.mp4`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

// Builders for assembling a `CocoFile` in code, e.g. before `CocoIndex::from_coco`.
impl Image {
    pub fn new(id: u64, file_name: impl Into<String>) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            video: None,
        }
    }

    pub fn with_video(mut self, video: impl Into<String>) -> Self {
        self.video = Some(video.into());
        self
    }

    /// Trailing path component of `file_name`.
    pub fn frame_file_name(&self) -> &str {
        self.file_name.rsplit('/').next().unwrap_or(&self.file_name)
    }
}

/// COCO annotation information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub image_id: u64,
    pub category_id: u64,
}

impl Annotation {
    pub fn new(image_id: u64, category_id: u64) -> Self {
        Self {
            id: None,
            image_id,
            category_id,
        }
    }
}

/// The subset of a COCO file this tool reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CocoFile {
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Read-only lookup tables built once from a [`CocoFile`].
#[derive(Debug, Clone, Default)]
pub struct CocoIndex {
    images: IndexMap<u64, Image>,
    categories: HashMap<u64, Category>,
    image_annotations: HashMap<u64, Vec<Annotation>>,
}

impl CocoIndex {
    /// Load and index a COCO annotation file, parsing straight from the file stream.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| LabelsError::ReadAnnotations {
            path: path.to_path_buf(),
            source,
        })?;
        let coco: CocoFile = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            LabelsError::ParseAnnotations {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self::from_coco(coco))
    }

    /// Index images by id (file order kept), categories by id and annotations by image.
    pub fn from_coco(coco: CocoFile) -> Self {
        let mut images = IndexMap::with_capacity(coco.images.len());
        for image in coco.images {
            images.insert(image.id, image);
        }

        let categories = coco
            .categories
            .into_iter()
            .map(|category| (category.id, category))
            .collect();

        let mut image_annotations: HashMap<u64, Vec<Annotation>> = HashMap::new();
        for annotation in coco.annotations {
            image_annotations
                .entry(annotation.image_id)
                .or_default()
                .push(annotation);
        }

        Self {
            images,
            categories,
            image_annotations,
        }
    }

    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.images.values()
    }

    pub fn categories(&self) -> &HashMap<u64, Category> {
        &self.categories
    }

    /// Annotations of an image in file order; empty when it has none.
    pub fn annotations_for(&self, image_id: u64) -> &[Annotation] {
        self.image_annotations
            .get(&image_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn num_images(&self) -> usize {
        self.images.len()
    }

    pub fn num_annotations(&self) -> usize {
        self.image_annotations.values().map(Vec::len).sum()
    }
}
