extern crate headcount;

mod common;

use std::sync::Arc;
use image::imageops;
use headcount::detection_processing::count_people;
use headcount::error::CountError;
use headcount::fetch::ImageFetcher;
use headcount::orientation::{correct_orientation, probe_orientations};
use headcount::pipeline::PersonCounter;
use headcount::Orientation;
use common::{marked_image, FailingDetector, MarkerDetector, MARKER};

#[test]
fn upright_image_is_returned_untouched() {
    let detector = MarkerDetector::new(3);
    let image = marked_image(0, 0);

    let corrected = correct_orientation(&detector, image.clone()).unwrap();

    assert_eq!(corrected, image);
    assert_eq!(detector.calls(), 3);
}

#[test]
fn marker_bottom_left_turns_clockwise() {
    let detector = MarkerDetector::new(2);
    let image = marked_image(0, 3);

    let candidates = probe_orientations(&detector, &image).unwrap();
    let counts: Vec<_> = candidates.iter().map(|c| (c.orientation, c.person_count)).collect();
    assert_eq!(
        counts,
        vec![
            (Orientation::Original, 0),
            (Orientation::Clockwise, 2),
            (Orientation::CounterClockwise, 0),
        ]
    );

    let corrected = correct_orientation(&detector, image.clone()).unwrap();
    assert_eq!(corrected, imageops::rotate90(&image));
    assert_eq!((corrected.width(), corrected.height()), (4, 6));
    assert_eq!(*corrected.get_pixel(0, 0), MARKER);
}

#[test]
fn marker_top_right_turns_counter_clockwise() {
    let detector = MarkerDetector::new(1);
    let image = marked_image(5, 0);

    let corrected = correct_orientation(&detector, image.clone()).unwrap();

    assert_eq!(corrected, imageops::rotate270(&image));
    assert_eq!(*corrected.get_pixel(0, 0), MARKER);
}

#[test]
fn no_people_anywhere_keeps_original() {
    let detector = MarkerDetector::new(0);
    let image = marked_image(0, 3);

    let corrected = correct_orientation(&detector, image.clone()).unwrap();

    assert_eq!(corrected, image);
}

#[test]
fn other_classes_do_not_count() {
    let detector = MarkerDetector::new(0);
    assert_eq!(count_people(&detector, &marked_image(0, 0)).unwrap(), 0);

    let detector = MarkerDetector::new(4);
    assert_eq!(count_people(&detector, &marked_image(0, 0)).unwrap(), 4);
}

#[test]
fn counter_uses_four_detector_calls() {
    let detector = Arc::new(MarkerDetector::new(3));
    let counter = PersonCounter::new(detector.clone(), ImageFetcher::default());

    let count = counter.count_image(marked_image(0, 3)).unwrap();

    assert_eq!(count, 3);
    assert_eq!(detector.calls(), 4);
}

#[test]
fn detector_failure_surfaces_as_inference_error() {
    assert!(correct_orientation(&FailingDetector, marked_image(0, 0)).is_err());

    let counter = PersonCounter::new(Arc::new(FailingDetector), ImageFetcher::default());
    assert!(counter.count_image(marked_image(0, 0)).is_err());

    let err = CountError::from(counter.count_image(marked_image(0, 0)).unwrap_err());
    assert_eq!(err.kind(), "inference");
}
