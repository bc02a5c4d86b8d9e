//! Options for building the ORT YOLO runner.

use std::path::{Path, PathBuf};
use anyhow::Result;
use crate::common::{InferenceDevice, ModelVersion, DEFAULT_INFERENCE_SIZE};
use crate::data::CROSS_MARK;

#[derive(Debug, Clone)]
pub struct ConfigOrt {
    pub onnx_path: PathBuf,
    pub ort_lib_path: Option<PathBuf>,
    pub device: InferenceDevice,
    pub model_width: u32,
    pub model_height: u32,
    pub profile: bool,
    pub num_dry_run: usize,

    pub nc: Option<usize>,
    pub confs: Vec<f32>,
    pub iou: Option<f32>,
    pub names: Option<Vec<String>>,
    pub yolo_version: ModelVersion,
}

impl Default for ConfigOrt {
    fn default() -> Self {
        Self {
            onnx_path: PathBuf::new(),
            ort_lib_path: None,
            device: InferenceDevice::CPU,
            profile: false,
            model_height: DEFAULT_INFERENCE_SIZE,
            model_width: DEFAULT_INFERENCE_SIZE,
            num_dry_run: 1,

            nc: Some(80), // Default COCO class number
            confs: vec![0.25f32],
            iou: None,
            names: None,
            yolo_version: ModelVersion::default(),
        }
    }
}

impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_model(mut self, onnx_path: &Path) -> Result<Self> {
        if !onnx_path.is_file() {
            anyhow::bail!("{CROSS_MARK} ONNX model not found: {}", onnx_path.display());
        }
        self.onnx_path = onnx_path.to_path_buf();
        Ok(self)
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = ort_lib_path {
            if !path.is_file() {
                anyhow::bail!("{CROSS_MARK} ONNX Runtime library not found: {}", path.display());
            }
        }
        self.ort_lib_path = ort_lib_path.map(Path::to_path_buf);
        Ok(self)
    }

    /// Square model input, `n` x `n`.
    pub fn with_inference_size(mut self, n: u32) -> Self {
        self.model_width = n;
        self.model_height = n;
        self
    }

    pub fn with_device(mut self, device_type: InferenceDevice) -> Self {
        self.device = device_type;
        self
    }

    pub fn with_yolo_version(mut self, x: ModelVersion) -> Self {
        self.yolo_version = x;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_names(mut self, names: Option<Vec<String>>) -> Self {
        self.names = names;
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.iou = Some(x);
        self
    }

    pub fn with_confs(mut self, x: &[f32]) -> Self {
        self.confs = x.to_vec();
        self
    }
}
