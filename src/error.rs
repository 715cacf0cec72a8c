use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while extracting frame labels.
///
/// Only [`LabelsError::MissingFrameDirectory`] is recoverable: the video is
/// skipped and the run continues. Everything else aborts the run.
#[derive(Debug, Error)]
pub enum LabelsError {
    #[error("failed to read annotations {}: {source}", .path.display())]
    ReadAnnotations {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse annotations {}: {source}", .path.display())]
    ParseAnnotations {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("image {image_id} has file_name {file_name:?} without a video directory")]
    MalformedFileName { image_id: u64, file_name: String },

    #[error("annotation on image {image_id} references unknown category {category_id}")]
    UnknownCategory { image_id: u64, category_id: u64 },

    #[error("could not find images for video {video} at {}", .path.display())]
    MissingFrameDirectory { video: String, path: PathBuf },

    #[error("failed to list frames in {}: {reason}", .path.display())]
    FrameListing { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize frame labels: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LabelsError {
    /// Whether the run may continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LabelsError::MissingFrameDirectory { .. })
    }
}

pub type Result<T> = std::result::Result<T, LabelsError>;
