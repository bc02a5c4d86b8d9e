use std::path::PathBuf;
use crate::common::inference_device::InferenceDevice;
use crate::common::model_version::ModelVersion;

/// Square side the image is letterboxed to before inference.
pub const DEFAULT_INFERENCE_SIZE: u32 = 1280;

/// COCO class id of "person".
pub const PERSON_CLASS_ID: isize = 0;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub weights_path: PathBuf,
    pub ort_lib_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub inference_device: InferenceDevice,
    pub model_version: ModelVersion,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub inference_size: u32,
    pub person_class_id: isize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::from("yolov10l.onnx"),
            ort_lib_path: None,
            labels_path: None,
            inference_device: InferenceDevice::CPU,
            model_version: ModelVersion::YoloV10,
            conf_threshold: 0.25,
            iou_threshold: 0.7,
            inference_size: DEFAULT_INFERENCE_SIZE,
            person_class_id: PERSON_CLASS_ID,
        }
    }
}

impl ModelConfig {
    pub fn summary(&self) -> String {
        format!("Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Model Version: {}\n\
        Model Input Resolution: {}x{}\n\
        Detection Threshold: {} | NMS IoU: {}\n\
        Person Class Id: {}",
                self.weights_path.display(),
                self.labels_path.as_ref().map(|p| p.display().to_string()).unwrap_or("-".into()),
                self.ort_lib_path.as_ref().map(|p| p.display().to_string()).unwrap_or("-".into()),
                self.inference_device, self.model_version,
                self.inference_size, self.inference_size,
                self.conf_threshold, self.iou_threshold,
                self.person_class_id)
    }
}
