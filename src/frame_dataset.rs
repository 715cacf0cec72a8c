use log::info;
use std::path::PathBuf;

use crate::coco::CocoIndex;
use crate::config::Args;
use crate::error::Result;
use crate::grouping::{filter_videos, group_by_video};
use crate::io::{ensure_output_directory, write_dataset_labels};
use crate::resolver::FrameLabelResolver;
use crate::types::{DatasetLabels, ProcessingStats};
use crate::utils::create_progress_bar;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub output_path: PathBuf,
    pub stats: ProcessingStats,
}

/// Group the images of `index` into videos and resolve the labels of every frame on disk
pub fn extract_frame_labels(
    index: &CocoIndex,
    args: &Args,
) -> Result<(DatasetLabels, ProcessingStats)> {
    let buckets = group_by_video(index.images())?;
    info!("Found {} videos in the annotations.", buckets.len());

    let buckets = filter_videos(buckets, &args.video_name);

    let resolver = FrameLabelResolver::new(index, &args.images_dir);
    let pb = create_progress_bar(buckets.len() as u64, "Videos");
    let result = resolver.resolve_dataset(&buckets, &pb);
    pb.finish_and_clear();
    result
}

/// Main pipeline: load annotations, resolve frame labels and write `<split>_annotations.json`
pub fn process_dataset(args: &Args) -> Result<DatasetReport> {
    ensure_output_directory(&args.output_dir)?;

    info!("Loading annotations from {}", args.annotations.display());
    let index = CocoIndex::load(&args.annotations)?;
    info!(
        "Loaded {} images and {} annotations.",
        index.num_images(),
        index.num_annotations()
    );

    let (labels, stats) = extract_frame_labels(&index, args)?;

    let output_path = args.output_path();
    write_dataset_labels(&labels, &output_path)?;
    info!("Wrote frame labels to {}", output_path.display());

    Ok(DatasetReport { output_path, stats })
}
