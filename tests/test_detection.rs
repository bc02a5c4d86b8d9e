extern crate headcount;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use image::RgbImage;
use headcount::common::{InferenceDevice, ModelConfig, ModelVersion};
use headcount::detection_processing::count_people;
use headcount::fetch::ImageFetcher;
use headcount::pipeline::PersonCounter;

/// Model-backed checks. They need real weights, so they only run when
/// `HEADCOUNT_TEST_MODEL` points at an ONNX file. Optional:
/// `HEADCOUNT_TEST_ORT_LIB`, `HEADCOUNT_TEST_MODEL_VERSION`,
/// `HEADCOUNT_TEST_IMAGE` + `HEADCOUNT_TEST_PEOPLE`.
fn model_details() -> Option<ModelConfig> {
    let weights_path = PathBuf::from(std::env::var_os("HEADCOUNT_TEST_MODEL")?);
    let model_version = std::env::var("HEADCOUNT_TEST_MODEL_VERSION")
        .ok()
        .and_then(|v| v.parse::<ModelVersion>().ok())
        .unwrap_or_default();

    Some(ModelConfig {
        weights_path,
        ort_lib_path: std::env::var_os("HEADCOUNT_TEST_ORT_LIB").map(PathBuf::from),
        labels_path: None,
        inference_device: InferenceDevice::CPU,
        model_version,
        inference_size: 640,
        ..ModelConfig::default()
    })
}

#[tokio::test]
async fn blank_image_has_no_people() {
    let Some(model_details) = model_details() else {
        eprintln!("HEADCOUNT_TEST_MODEL not set, skipping");
        return;
    };

    let detector = headcount::init_detector(&model_details).expect("Failed to initialize YOLO model");
    let blank = RgbImage::from_pixel(960, 540, image::Rgb([255, 255, 255]));

    let now = Instant::now();
    let mut elapsed = now.elapsed();
    for i in 0..3 {
        assert_eq!(count_people(&detector, &blank).unwrap(), 0);
        println!("TIME | Total={:.2?} | {}th detection={:.2?}", now.elapsed(), i, now.elapsed() - elapsed);
        elapsed = now.elapsed();
    }
}

#[tokio::test]
async fn counts_people_in_sample_image() {
    let Some(model_details) = model_details() else {
        eprintln!("HEADCOUNT_TEST_MODEL not set, skipping");
        return;
    };
    let Some(image_path) = std::env::var_os("HEADCOUNT_TEST_IMAGE") else {
        eprintln!("HEADCOUNT_TEST_IMAGE not set, skipping");
        return;
    };
    let expected: usize = std::env::var("HEADCOUNT_TEST_PEOPLE")
        .ok()
        .and_then(|v| v.parse().ok())
        .expect("HEADCOUNT_TEST_PEOPLE must be set alongside HEADCOUNT_TEST_IMAGE");

    let detector = headcount::init_detector(&model_details).expect("Failed to initialize YOLO model");
    let counter = PersonCounter::new(Arc::new(detector), ImageFetcher::default());
    let image = image::open(&image_path).unwrap().to_rgb8();

    let now = Instant::now();
    let upright = headcount::run_detection(&counter, image.clone()).unwrap();
    println!("Counted {} people in {:.2?}", upright, now.elapsed());
    assert_eq!(upright, expected);

    // a sideways copy must be turned back and give the same count
    let sideways = image::imageops::rotate270(&image);
    assert_eq!(headcount::run_detection(&counter, sideways).unwrap(), expected);
}
