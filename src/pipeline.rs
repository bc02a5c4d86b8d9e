//! One request's lifecycle: fetch, decode, correct orientation, count.

use std::sync::Arc;
use image::RgbImage;
use serde::{Serialize, Serializer};
use crate::detection_processing::count_people;
use crate::detectors::Detector;
use crate::error::{CountError, CountResult, DetectError};
use crate::fetch::{decode_image, ImageFetcher};
use crate::orientation::correct_orientation;

/// Shared, request-independent state: the model and the HTTP client.
pub struct PersonCounter {
    detector: Arc<dyn Detector>,
    fetcher: ImageFetcher,
}

impl PersonCounter {
    pub fn new(detector: Arc<dyn Detector>, fetcher: ImageFetcher) -> Self {
        Self { detector, fetcher }
    }

    pub fn detector(&self) -> &dyn Detector {
        self.detector.as_ref()
    }

    /// Corrects the orientation of a decoded image, then counts the people
    /// in it. Four detector calls in total.
    pub fn count_image(&self, image: RgbImage) -> Result<usize, DetectError> {
        let corrected = correct_orientation(self.detector(), image)?;
        count_people(self.detector(), &corrected)
    }

    /// Full pipeline for one URL. Blocking.
    pub fn count_from_url(&self, image_url: &str) -> CountResult<usize> {
        let bytes = self.fetcher.fetch(image_url)?;
        let image = decode_image(&bytes)?;
        log::debug!("Decoded {}x{} image from {}", image.width(), image.height(), image_url);
        Ok(self.count_image(image)?)
    }
}

/// Value of the `count` field: a number, or the literal `"Error"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonCount {
    Count(usize),
    Error,
}

impl Serialize for PersonCount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PersonCount::Count(n) => serializer.serialize_u64(*n as u64),
            PersonCount::Error => serializer.serialize_str("Error"),
        }
    }
}

/// Body of `GET /detect/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectResponse {
    pub image_url: String,
    pub count: PersonCount,
}

impl DetectResponse {
    pub fn new(image_url: impl Into<String>, result: &Result<usize, CountError>) -> Self {
        let count = match result {
            Ok(n) => PersonCount::Count(*n),
            Err(_) => PersonCount::Error,
        };
        Self {
            image_url: image_url.into(),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[test]
    fn serializes_count_or_error_marker() {
        let ok = DetectResponse::new("http://a/b.jpg", &Ok(3));
        assert_eq!(
            serde_json::to_string(&ok).unwrap(),
            r#"{"image_url":"http://a/b.jpg","count":3}"#
        );

        let failed = DetectResponse::new("http://a/b.jpg", &Err(CountError::Fetch(FetchError::Status(404))));
        assert_eq!(
            serde_json::to_string(&failed).unwrap(),
            r#"{"image_url":"http://a/b.jpg","count":"Error"}"#
        );
    }
}
