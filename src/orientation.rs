//! Picks the 90° rotation of an image in which the model finds the most people.

use std::borrow::Cow;
use image::{imageops, RgbImage};
use rayon::prelude::*;
use crate::detection_processing::count_people;
use crate::detectors::Detector;
use crate::error::DetectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Original,
    /// 90° clockwise.
    Clockwise,
    /// 90° counter-clockwise.
    CounterClockwise,
}

impl Orientation {
    /// Probe order. On equal counts the earlier entry wins.
    pub const EVALUATION_ORDER: [Orientation; 3] = [
        Orientation::Original,
        Orientation::Clockwise,
        Orientation::CounterClockwise,
    ];

    /// Borrowing rotation; `Original` costs nothing.
    pub fn rotated<'a>(&self, image: &'a RgbImage) -> Cow<'a, RgbImage> {
        match self {
            Orientation::Original => Cow::Borrowed(image),
            Orientation::Clockwise => Cow::Owned(imageops::rotate90(image)),
            Orientation::CounterClockwise => Cow::Owned(imageops::rotate270(image)),
        }
    }

    /// Owning rotation; `Original` hands the buffer back untouched.
    pub fn apply(&self, image: RgbImage) -> RgbImage {
        match self {
            Orientation::Original => image,
            _ => self.rotated(&image).into_owned(),
        }
    }

    /// The rotation that undoes this one.
    pub fn inverse(&self) -> Orientation {
        match self {
            Orientation::Original => Orientation::Original,
            Orientation::Clockwise => Orientation::CounterClockwise,
            Orientation::CounterClockwise => Orientation::Clockwise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationCandidate {
    pub orientation: Orientation,
    pub person_count: usize,
}

/// Returns the candidate orientation with the highest person count.
///
/// Ties resolve to the first candidate in slice order, so with
/// [`Orientation::EVALUATION_ORDER`] the original orientation wins any tie
/// it is part of. An empty slice selects `Original`.
pub fn select_orientation(candidates: &[OrientationCandidate]) -> Orientation {
    let mut best: Option<&OrientationCandidate> = None;
    for candidate in candidates {
        match best {
            Some(b) if candidate.person_count <= b.person_count => {}
            _ => best = Some(candidate),
        }
    }
    best.map(|c| c.orientation).unwrap_or(Orientation::Original)
}

/// Counts people in each of the three orientations.
///
/// The probes run on the rayon pool; the result keeps evaluation order.
pub fn probe_orientations(
    detector: &dyn Detector,
    image: &RgbImage,
) -> Result<Vec<OrientationCandidate>, DetectError> {
    Orientation::EVALUATION_ORDER
        .par_iter()
        .map(|&orientation| -> Result<OrientationCandidate, DetectError> {
            let rotated = orientation.rotated(image);
            let person_count = count_people(detector, &rotated)?;
            Ok(OrientationCandidate {
                orientation,
                person_count,
            })
        })
        .collect()
}

/// Returns `image` turned to the orientation with the most person
/// detections.
pub fn correct_orientation(detector: &dyn Detector, image: RgbImage) -> Result<RgbImage, DetectError> {
    let candidates = probe_orientations(detector, &image)?;
    let orientation = select_orientation(&candidates);

    log::debug!(
        "Orientation probes: {:?} -> {:?}",
        candidates
            .iter()
            .map(|c| (c.orientation, c.person_count))
            .collect::<Vec<_>>(),
        orientation
    );

    Ok(orientation.apply(image))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(counts: [usize; 3]) -> Vec<OrientationCandidate> {
        Orientation::EVALUATION_ORDER
            .iter()
            .zip(counts)
            .map(|(&orientation, person_count)| OrientationCandidate { orientation, person_count })
            .collect()
    }

    #[test]
    fn strict_maximum_wins() {
        assert_eq!(select_orientation(&candidates([1, 4, 2])), Orientation::Clockwise);
        assert_eq!(select_orientation(&candidates([1, 2, 4])), Orientation::CounterClockwise);
        assert_eq!(select_orientation(&candidates([5, 2, 4])), Orientation::Original);
    }

    #[test]
    fn ties_keep_evaluation_order() {
        assert_eq!(select_orientation(&candidates([0, 0, 0])), Orientation::Original);
        assert_eq!(select_orientation(&candidates([3, 3, 1])), Orientation::Original);
        assert_eq!(select_orientation(&candidates([1, 3, 3])), Orientation::Clockwise);
        assert_eq!(select_orientation(&[]), Orientation::Original);
    }

    #[test]
    fn inverse_undoes_rotation() {
        let image = RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8, y as u8, 7]));
        for orientation in Orientation::EVALUATION_ORDER {
            let turned = orientation.apply(image.clone());
            assert_eq!(orientation.inverse().apply(turned), image);
        }
    }
}
