use image::RgbImage;
use crate::common::Detection;
use crate::detectors::Detector;
use crate::error::DetectError;

/// Number of detections belonging to `class_id`.
pub fn count_class(detections: &[Detection], class_id: isize) -> usize {
    detections.iter().filter(|d| d.is_class(class_id)).count()
}

/// Runs the detector once and counts the person-class detections.
pub fn count_people(detector: &dyn Detector, image: &RgbImage) -> Result<usize, DetectError> {
    let detections = detector.detect(image)?;
    Ok(count_class(&detections, detector.person_class_id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_requested_class() {
        let detections: Vec<Detection> = [0, 2, 0, 17, 0]
            .into_iter()
            .map(|id| Detection::default().with_class_id(id))
            .collect();

        assert_eq!(count_class(&detections, 0), 3);
        assert_eq!(count_class(&detections, 17), 1);
        assert_eq!(count_class(&detections, 5), 0);
        assert_eq!(count_class(&[], 0), 0);
    }
}
