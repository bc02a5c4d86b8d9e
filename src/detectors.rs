//! The object-detection black box and its ONNX Runtime implementation.

use std::time::Instant;
use anyhow::Context;
use image::RgbImage;
use crate::common::{Detection, ModelConfig, PERSON_CLASS_ID};
use crate::data::ConfigOrt;
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::OrtYolo;
use crate::error::DetectError;
use crate::utils;

/// Image in, detections out.
///
/// Implementations must be safe to call from several threads at once; the
/// three orientation probes of one request run in parallel.
pub trait Detector: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectError>;

    /// Class id counted as a person.
    fn person_class_id(&self) -> isize {
        PERSON_CLASS_ID
    }
}

/// YOLO model loaded once at startup and shared by every request.
#[derive(Debug)]
pub struct OrtDetector {
    yolo: OrtYolo,
    person_class_id: isize,
}

impl OrtDetector {
    /// Loads the model described by `model_details` and runs it once on a
    /// blank frame so the first request does not pay for graph setup.
    pub fn init(model_details: &ModelConfig) -> anyhow::Result<Self> {
        let names = match &model_details.labels_path {
            Some(path) => Some(
                utils::file_to_vec(path)
                    .with_context(|| format!("Failed to read labels from {}", path.display()))?,
            ),
            None => None,
        };

        let ort_options = ConfigOrt::new()
            .with_model(&model_details.weights_path)?
            .with_ort_lib_path(model_details.ort_lib_path.as_deref())?
            .with_yolo_version(model_details.model_version)
            .with_device(model_details.inference_device)
            .with_inference_size(model_details.inference_size)
            .with_confs(&[model_details.conf_threshold])
            .with_iou(model_details.iou_threshold)
            .with_names(names)
            .with_profile(false);

        log::info!("Initializing ORT session with ({}) execution provider", model_details.inference_device);
        let yolo = OrtYolo::new(ort_options.clone())?;

        for _ in 0..ort_options.num_dry_run {
            yolo.run(&[RgbImage::new(model_details.inference_size, model_details.inference_size)])?;
        }

        if let Some(name) = usize::try_from(model_details.person_class_id)
            .ok()
            .and_then(|id| yolo.names().get(id))
        {
            log::info!("Counting class {} ({})", model_details.person_class_id, name);
        } else {
            log::warn!("Person class id {} is outside the model's classes", model_details.person_class_id);
        }

        Ok(Self {
            yolo,
            person_class_id: model_details.person_class_id,
        })
    }
}

impl Detector for OrtDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectError> {
        let now = Instant::now();
        // single-image batch; `run` hands back one list per input
        let mut ys = self.yolo.run(std::slice::from_ref(image))?;
        let detections = ys.pop().unwrap_or_default();
        log::debug!(
            "Detected {} objects on {}x{} in {:.2?}",
            detections.len(),
            image.width(),
            image.height(),
            now.elapsed()
        );
        Ok(detections)
    }

    fn person_class_id(&self) -> isize {
        self.person_class_id
    }
}
