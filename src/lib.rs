mod utils;
pub mod common;
pub mod config;
pub mod data;
pub mod detection_processing;
pub mod detection_runners;
pub mod detectors;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod orientation;
pub mod pipeline;
pub mod server;

use std::time::Instant;
use image::RgbImage;
use crate::common::ModelConfig;
use crate::detectors::OrtDetector;
use crate::pipeline::PersonCounter;

pub use crate::detectors::Detector;
pub use crate::error::{CountError, DetectError};
pub use crate::orientation::Orientation;

pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// Loads the ONNX model once; the returned detector is shared by every
/// request for the life of the process.
pub fn init_detector(model_details: &ModelConfig) -> Result<OrtDetector> {
    log::info!("Initializing detector\n{}", model_details.summary());
    let now = Instant::now();
    let detector = OrtDetector::init(model_details)?;
    log::info!("Detector ready in {:.2?}", now.elapsed());
    Ok(detector)
}

/// Orientation correction and counting for an image already in memory.
pub fn run_detection(counter: &PersonCounter, image: RgbImage) -> Result<usize> {
    let now = Instant::now();
    let count = counter.count_image(image)?;
    log::debug!("Processing time: {:.2?}", now.elapsed());
    Ok(count)
}
