//! Reconcile the frames extracted on disk with their annotation records
//!
//! The frames found on disk are authoritative: every image file in a video's
//! frame directory gets an entry, annotated or not, and annotation records
//! whose frame is missing on disk are dropped.

use indexmap::IndexMap;
use indicatif::ProgressBar;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::coco::{Category, CocoIndex, Image};
use crate::error::{LabelsError, Result};
use crate::grouping::VideoBuckets;
use crate::io::list_frames;
use crate::types::{DatasetLabels, FrameLabels, ProcessingStats};
use crate::utils::strip_extension;

/// Category names reported under another name in the output
pub const CATEGORY_ALIASES: &[(&str, &str)] = &[("baby", "person")];

/// Build an owned id -> name table with [`CATEGORY_ALIASES`] applied.
/// The categories of the annotation index are left untouched.
pub fn relabel_categories(categories: &HashMap<u64, Category>) -> HashMap<u64, String> {
    categories
        .iter()
        .map(|(&id, category)| {
            let name = CATEGORY_ALIASES
                .iter()
                .find(|(from, _)| *from == category.name)
                .map(|(_, to)| (*to).to_string())
                .unwrap_or_else(|| category.name.clone());
            (id, name)
        })
        .collect()
}

/// Map each annotation record of a video to its frame stem.
///
/// Records are first keyed by trailing file name, then by that name without
/// its extension. On collision the later record wins.
pub fn index_by_frame_stem<'a>(video: &str, images: &[&'a Image]) -> HashMap<String, &'a Image> {
    let mut by_file_name: IndexMap<&str, &'a Image> = IndexMap::with_capacity(images.len());
    for &image in images {
        if let Some(previous) = by_file_name.insert(image.frame_file_name(), image) {
            debug!(
                "{}: images {} and {} share file name {}, keeping {}",
                video,
                previous.id,
                image.id,
                image.frame_file_name(),
                image.id
            );
        }
    }

    by_file_name
        .into_iter()
        .map(|(file_name, image)| (strip_extension(file_name).to_string(), image))
        .collect()
}

/// Frame labels of one video along with join diagnostics
#[derive(Debug, Clone, Default)]
pub struct VideoFrames {
    pub labels: FrameLabels,
    /// Annotated frames with no file on disk
    pub missing_on_disk: usize,
}

/// Resolves per-frame labels for videos of one annotation index
pub struct FrameLabelResolver<'a> {
    index: &'a CocoIndex,
    category_names: HashMap<u64, String>,
    images_dir: PathBuf,
}

impl<'a> FrameLabelResolver<'a> {
    pub fn new(index: &'a CocoIndex, images_dir: &Path) -> Self {
        Self {
            index,
            category_names: relabel_categories(index.categories()),
            images_dir: images_dir.to_path_buf(),
        }
    }

    /// Labels of one image, in annotation order, duplicates kept
    pub fn labels_for(&self, image: &Image) -> Result<Vec<String>> {
        self.index
            .annotations_for(image.id)
            .iter()
            .map(|annotation| {
                self.category_names
                    .get(&annotation.category_id)
                    .cloned()
                    .ok_or_else(|| LabelsError::UnknownCategory {
                        image_id: image.id,
                        category_id: annotation.category_id,
                    })
            })
            .collect()
    }

    /// Build the frame stem -> labels mapping of one video.
    ///
    /// Fails with [`LabelsError::MissingFrameDirectory`] when the video has no
    /// frame directory under the images root.
    pub fn resolve_video(&self, video: &str, images: &[&Image]) -> Result<VideoFrames> {
        let frames_dir = self.images_dir.join(video);
        if !frames_dir.exists() {
            return Err(LabelsError::MissingFrameDirectory {
                video: video.to_string(),
                path: frames_dir,
            });
        }

        let frame_infos = index_by_frame_stem(video, images);
        let frames = list_frames(&frames_dir)?;

        let mut labels = FrameLabels::with_capacity(frames.len());
        for frame in &frames {
            let stem = frame
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let frame_labels = match frame_infos.get(&stem) {
                Some(image) => self.labels_for(image)?,
                None => Vec::new(),
            };
            labels.insert(stem, frame_labels);
        }

        let missing_on_disk = frame_infos
            .keys()
            .filter(|stem| !labels.contains_key(stem.as_str()))
            .count();
        if missing_on_disk > 0 {
            debug!(
                "{}: {} annotated frames not found in {}",
                video,
                missing_on_disk,
                frames_dir.display()
            );
        }

        Ok(VideoFrames {
            labels,
            missing_on_disk,
        })
    }

    /// Resolve every video in parallel. Videos without a frame directory are
    /// skipped with a warning; any other error aborts.
    pub fn resolve_dataset(
        &self,
        buckets: &VideoBuckets<'_>,
        pb: &ProgressBar,
    ) -> Result<(DatasetLabels, ProcessingStats)> {
        let videos: Vec<(&String, &Vec<&Image>)> = buckets.iter().collect();
        let results: Vec<(&String, Result<VideoFrames>)> = videos
            .into_par_iter()
            .map(|(video, images)| {
                let result = self.resolve_video(video, images);
                pb.inc(1);
                (video, result)
            })
            .collect();

        let mut dataset = DatasetLabels::with_capacity(results.len());
        let mut stats = ProcessingStats::new();
        for (video, result) in results {
            match result {
                Ok(frames) => {
                    stats.record_video(&frames.labels, frames.missing_on_disk);
                    dataset.insert(video.clone(), frames.labels);
                }
                Err(e) if e.is_recoverable() => {
                    warn!("{}", e);
                    stats.record_skipped();
                }
                Err(e) => return Err(e),
            }
        }

        Ok((dataset, stats))
    }
}
