//! TAO-Amodal frame label extractor
//!
//! This library groups the images of a COCO-style annotation file into videos,
//! matches them against the frames extracted on disk and lists the object
//! categories visible in every frame.

pub mod coco;
pub mod config;
pub mod error;
pub mod frame_dataset;
pub mod grouping;
pub mod io;
pub mod resolver;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use coco::{Annotation, Category, CocoFile, CocoIndex, Image};
pub use config::Args;
pub use error::{LabelsError, Result};
pub use frame_dataset::{extract_frame_labels, process_dataset, DatasetReport};
pub use grouping::{group_by_video, video_identifier, VideoBuckets};
pub use resolver::{relabel_categories, FrameLabelResolver};
pub use types::{DatasetLabels, FrameLabels, ProcessingStats};
