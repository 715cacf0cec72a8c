use clap::Parser;
use std::path::PathBuf;

/// Extract the object labels visible in every frame of a TAO-Amodal split.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Path to the TAO-Amodal annotation json
    #[arg(long = "annotations", default_value = "TAO-Amodal/annotations/train.json")]
    pub annotations: PathBuf,

    /// Folder where the label json is written
    #[arg(long = "output-dir", default_value = "output")]
    pub output_dir: PathBuf,

    /// Path to TAO-Amodal/frames
    #[arg(long = "images-dir", default_value = "TAO-Amodal/frames")]
    pub images_dir: PathBuf,

    /// Dataset split (e.g. train/val/test), used to name the output file
    #[arg(long = "split", default_value = "train")]
    pub split: String,

    /// If specified, only these videos are processed
    #[arg(long = "video-name", num_args = 0..)]
    pub video_name: Vec<String>,
}

impl Args {
    /// Name of the label file written for this split.
    pub fn output_file_name(&self) -> String {
        format!("{}_annotations.json", sanitize_filename::sanitize(&self.split))
    }

    /// Full path of the label file written for this split.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.output_file_name())
    }
}
