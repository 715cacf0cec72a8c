use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::OnceLock;

// Supported image formats
pub const IMG_FORMATS: &[&str] = &[
    "bmp", "jpeg", "jpg", "pgm", "png", "ppm", "tif", "tiff", "webp",
];

// Precomputed HashSet of image extensions for fast lookup
pub static IMAGE_EXTENSIONS_SET: OnceLock<HashSet<String>> = OnceLock::new();

/// Get the image extensions set
pub fn get_image_extensions_set() -> &'static HashSet<String> {
    IMAGE_EXTENSIONS_SET.get_or_init(|| IMG_FORMATS.iter().map(|ext| ext.to_lowercase()).collect())
}

/// Frame stem -> labels, in natural frame order
pub type FrameLabels = IndexMap<String, Vec<String>>;

/// Video identifier -> frame labels, for the whole split
pub type DatasetLabels = IndexMap<String, FrameLabels>;

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub videos_processed: usize,
    pub videos_skipped: usize,
    pub frames_written: usize,
    pub labelled_frames: usize,
    pub labels_written: usize,
    pub annotated_frames_missing_on_disk: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the counters of one resolved video into the run totals.
    pub fn record_video(&mut self, frames: &FrameLabels, missing_on_disk: usize) {
        self.videos_processed += 1;
        self.frames_written += frames.len();
        self.labelled_frames += frames.values().filter(|labels| !labels.is_empty()).count();
        self.labels_written += frames.values().map(Vec::len).sum::<usize>();
        self.annotated_frames_missing_on_disk += missing_on_disk;
    }

    pub fn record_skipped(&mut self) {
        self.videos_skipped += 1;
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Videos processed: {}", self.videos_processed);
        log::info!("Frames written: {}", self.frames_written);
        log::info!("Frames with labels: {}", self.labelled_frames);
        log::info!("Labels written: {}", self.labels_written);

        if self.videos_skipped > 0 {
            log::warn!(
                "Skipped videos (missing frame directory): {}",
                self.videos_skipped
            );
        }
        if self.annotated_frames_missing_on_disk > 0 {
            log::info!(
                "Annotated frames not found on disk: {}",
                self.annotated_frames_missing_on_disk
            );
        }
    }
}
