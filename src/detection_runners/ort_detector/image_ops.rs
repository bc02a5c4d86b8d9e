//! Letterbox preprocessing of RGB images into a normalised NCHW batch.

use anyhow::{bail, Result};
use fast_image_resize::{
    images::{Image as FirImage, ImageRef},
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::RgbImage;
use ndarray::Array;
use rayon::prelude::*;
use crate::detection_runners::input_wrapper::X;

/// Grey used by YOLO exporters for letterbox borders.
const PAD_VALUE: u8 = 114;

/// Geometry of one letterboxed image: how the source maps into the model input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageTransformInfo {
    pub width_src: u32,
    pub height_src: u32,
    pub width_dst: u32,
    pub height_dst: u32,
    pub scale: f32,
    pub width_pad: u32,
    pub height_pad: u32,
}

impl ImageTransformInfo {
    /// Scales the long side to fit `target_w` x `target_h`, centering the
    /// result and padding the rest.
    pub fn letterbox(width_src: u32, height_src: u32, target_w: u32, target_h: u32) -> Self {
        let scale = (target_w as f32 / width_src as f32).min(target_h as f32 / height_src as f32);
        let width_dst = ((width_src as f32 * scale).round() as u32).clamp(1, target_w);
        let height_dst = ((height_src as f32 * scale).round() as u32).clamp(1, target_h);
        Self {
            width_src,
            height_src,
            width_dst,
            height_dst,
            scale,
            width_pad: (target_w - width_dst) / 2,
            height_pad: (target_h - height_dst) / 2,
        }
    }

    /// Maps a point in model-input space back to source image space.
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        let x = ((x - self.width_pad as f32) / self.scale).clamp(0., self.width_src as f32);
        let y = ((y - self.height_pad as f32) / self.scale).clamp(0., self.height_src as f32);
        (x, y)
    }
}

/// Letterboxes every image to `target_w` x `target_h` and stacks them into a
/// `[N, 3, H, W]` tensor scaled to `0..=1`.
pub fn preprocess(xs: &[RgbImage], target_h: u32, target_w: u32) -> Result<X> {
    if xs.is_empty() {
        bail!("No images to preprocess");
    }

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));

    let image_tensors: Vec<Vec<f32>> = xs
        .par_iter()
        .map(|img| {
            let mut resizer = Resizer::new();
            let padded = letterbox_image(img, target_h, target_w, &mut resizer, &options)?;
            nchw_normalize_flat(&padded, target_w as usize, target_h as usize)
        })
        .collect::<Result<_>>()?;

    let channels = 3;
    let height = target_h as usize;
    let width = target_w as usize;
    let image_size = channels * height * width;

    let mut batch_flat: Vec<f32> = Vec::with_capacity(xs.len() * image_size);
    for img in image_tensors.iter() {
        batch_flat.extend_from_slice(img);
    }

    let batch = Array::from_shape_vec((xs.len(), channels, height, width), batch_flat)?.into_dyn();

    Ok(X::from(batch))
}

/// Resizes `img` into the centre of a `target_w` x `target_h` grey canvas.
/// Returns packed RGB bytes.
fn letterbox_image(
    img: &RgbImage,
    target_h: u32,
    target_w: u32,
    resizer: &mut Resizer,
    resize_options: &ResizeOptions,
) -> Result<Vec<u8>> {
    let (w0, h0) = img.dimensions();
    if w0 == 0 || h0 == 0 {
        bail!("Cannot letterbox an empty image");
    }
    let info = ImageTransformInfo::letterbox(w0, h0, target_w, target_h);

    let src = ImageRef::new(w0, h0, img.as_raw(), PixelType::U8x3)?;
    let mut resized = FirImage::new(info.width_dst, info.height_dst, PixelType::U8x3);
    resizer.resize(&src, &mut resized, resize_options)?;

    let mut padded = vec![PAD_VALUE; (target_w * target_h * 3) as usize];
    let row_len = info.width_dst as usize * 3;
    for (row, line) in resized.buffer().chunks_exact(row_len).enumerate() {
        let start = ((row + info.height_pad as usize) * target_w as usize + info.width_pad as usize) * 3;
        padded[start..start + row_len].copy_from_slice(line);
    }

    Ok(padded)
}

fn nchw_normalize_flat(buf: &[u8], w: usize, h: usize) -> Result<Vec<f32>> {
    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }

    let mut out = vec![0.0f32; buf.len()];
    let hw = w * h;

    for i in 0..hw {
        out[i] = buf[3 * i] as f32 / 255.0;
        out[i + hw] = buf[3 * i + 1] as f32 / 255.0;
        out[i + 2 * hw] = buf[3 * i + 2] as f32 / 255.0;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterbox_scales_long_side() {
        let info = ImageTransformInfo::letterbox(2560, 1280, 1280, 1280);
        assert_eq!(info.scale, 0.5);
        assert_eq!((info.width_dst, info.height_dst), (1280, 640));
        assert_eq!((info.width_pad, info.height_pad), (0, 320));

        let (x, y) = info.to_source(640., 640.);
        assert_eq!((x, y), (1280., 640.));
    }

    #[test]
    fn preprocess_pads_with_grey() {
        let img = RgbImage::from_pixel(20, 10, image::Rgb([255, 0, 0]));
        let x = preprocess(&[img], 32, 32).unwrap();
        assert_eq!(x.shape(), &[1, 3, 32, 32]);

        // top border row is padding, the centre row is the red image
        let pad = PAD_VALUE as f32 / 255.0;
        assert_eq!(x[[0, 0, 0, 16]], pad);
        assert!(x[[0, 0, 16, 16]] > 0.99);
        assert!(x[[0, 1, 16, 16]] < 0.01);
    }
}
