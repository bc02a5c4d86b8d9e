//! Downloading and decoding the source image.

use std::io::{Cursor, Read};
use std::time::Duration;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use url::Url;
use crate::error::{DecodeError, FetchError};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 64 * 1024 * 1024;

/// Blocking HTTP client for source images.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl Default for ImageFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_IMAGE_BYTES)
    }
}

impl ImageFetcher {
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("headcount/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent, max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// GETs `image_url` and returns the body. Non-2xx statuses are errors.
    pub fn fetch(&self, image_url: &str) -> Result<Vec<u8>, FetchError> {
        let url = Url::parse(image_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }

        let response = match self.agent.request_url("GET", &url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code)),
            Err(ureq::Error::Transport(transport)) => return Err(FetchError::Transport(Box::new(transport))),
        };

        if let Some(len) = response
            .header("Content-Length")
            .and_then(|v| v.parse::<u64>().ok())
        {
            if len > self.max_bytes {
                return Err(FetchError::TooLarge { limit: self.max_bytes });
            }
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(self.max_bytes + 1)
            .read_to_end(&mut bytes)?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(FetchError::TooLarge { limit: self.max_bytes });
        }

        log::debug!("Fetched {} bytes from {}", bytes.len(), image_url);
        Ok(bytes)
    }
}

/// Decodes any format the `image` crate recognises into an RGB buffer,
/// upright according to its EXIF orientation tag.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, DecodeError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    if image.width() == 0 || image.height() == 0 {
        return Err(DecodeError::ZeroDimensions);
    }
    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_urls() {
        let fetcher = ImageFetcher::default();
        assert!(matches!(fetcher.fetch("not a url"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(
            fetcher.fetch("file:///etc/passwd"),
            Err(FetchError::UnsupportedScheme(s)) if s == "file"
        ));
    }

    #[test]
    fn decodes_png_and_rejects_text() {
        let source = RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30]));
        let mut png = Cursor::new(Vec::new());
        source.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let decoded = decode_image(png.get_ref()).unwrap();
        assert_eq!(decoded, source);

        assert!(matches!(decode_image(b"<html>nope</html>"), Err(DecodeError::Image(_))));
    }

    /// APP1 segment carrying a big-endian TIFF IFD with a single Orientation entry.
    fn exif_app1(orientation: u16) -> Vec<u8> {
        let mut payload = b"Exif\0\0MM\0\x2a\0\0\0\x08".to_vec();
        payload.extend_from_slice(&[0x00, 0x01]);
        payload.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
        payload.extend_from_slice(&orientation.to_be_bytes());
        payload.extend_from_slice(&[0x00, 0x00]);
        payload.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        let mut segment = vec![0xFF, 0xE1];
        segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        segment.extend_from_slice(&payload);
        segment
    }

    #[test]
    fn applies_exif_orientation() {
        let source = RgbImage::from_pixel(8, 4, image::Rgb([200, 120, 40]));
        let mut jpeg = Cursor::new(Vec::new());
        source.write_to(&mut jpeg, image::ImageFormat::Jpeg).unwrap();
        let jpeg = jpeg.into_inner();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let plain = decode_image(&jpeg).unwrap();
        assert_eq!(plain.dimensions(), (8, 4));

        // orientation 6: stored sideways, display rotated 90° clockwise
        let mut tagged = jpeg[..2].to_vec();
        tagged.extend_from_slice(&exif_app1(6));
        tagged.extend_from_slice(&jpeg[2..]);

        let decoded = decode_image(&tagged).unwrap();
        assert_eq!(decoded.dimensions(), (4, 8));

        let mut upside_down = jpeg[..2].to_vec();
        upside_down.extend_from_slice(&exif_app1(3));
        upside_down.extend_from_slice(&jpeg[2..]);
        assert_eq!(decode_image(&upside_down).unwrap().dimensions(), (8, 4));
    }
}
