use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use tao_frame_labels::{process_dataset, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Extracting frame labels for split {}...", args.split);

    match process_dataset(&args) {
        Ok(report) => {
            report.stats.print_summary();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to extract frame labels: {}", e);
            ExitCode::FAILURE
        }
    }
}
