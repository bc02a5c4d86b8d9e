#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use image::{Rgb, RgbImage};
use headcount::common::Detection;
use headcount::{DetectError, Detector};

pub const MARKER: Rgb<u8> = Rgb([255, 0, 0]);
pub const CAR_CLASS: isize = 2;

/// Sees `people` persons only when the red marker pixel sits in the top-left
/// corner, i.e. when the image is "upright". Always sees one car.
pub struct MarkerDetector {
    pub people: usize,
    pub calls: AtomicUsize,
}

impl MarkerDetector {
    pub fn new(people: usize) -> Self {
        Self { people, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for MarkerDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut detections = vec![Detection::default().with_class_id(CAR_CLASS).with_confidence(0.9)];
        if *image.get_pixel(0, 0) == MARKER {
            detections.extend(
                (0..self.people).map(|i| {
                    Detection::default()
                        .with_class_id(0)
                        .with_confidence(0.8)
                        .with_x1y1_wh(i as f32, 0.0, 1.0, 1.0)
                }),
            );
        }
        Ok(detections)
    }
}

/// Fails every call, like a broken model runtime.
pub struct FailingDetector;

impl Detector for FailingDetector {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<Detection>, DetectError> {
        Err(anyhow::anyhow!("session run failed").into())
    }
}

/// 6x4 grey image with the marker at `(x, y)`.
pub fn marked_image(x: u32, y: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(6, 4, Rgb([90, 90, 90]));
    image.put_pixel(x, y, MARKER);
    image
}
