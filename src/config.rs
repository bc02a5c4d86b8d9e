//! Command line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::Context;
use clap::Parser;
use crate::common::{InferenceDevice, ModelConfig, ModelVersion, DEFAULT_INFERENCE_SIZE, PERSON_CLASS_ID};
use crate::data::FsAccess;
use crate::fetch::DEFAULT_MAX_IMAGE_BYTES;

const DEFAULT_MODEL_FILE: &str = "yolov10l.onnx";

#[derive(Parser, Debug, Clone)]
#[command(name = "headcount", version, about = "Counts people in images fetched by URL")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "HEADCOUNT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "HEADCOUNT_PORT", default_value_t = 80)]
    pub port: u16,

    /// ONNX weights [default: <cache dir>/headcount/yolov10l.onnx]
    #[arg(long, env = "HEADCOUNT_MODEL")]
    pub model: Option<PathBuf>,

    /// Path to libonnxruntime; the system library is used when unset
    #[arg(long, env = "HEADCOUNT_ORT_LIB_PATH")]
    pub ort_lib_path: Option<PathBuf>,

    /// Class names, one per line
    #[arg(long, env = "HEADCOUNT_LABELS")]
    pub labels: Option<PathBuf>,

    #[arg(long, env = "HEADCOUNT_MODEL_VERSION", default_value_t = ModelVersion::YoloV10)]
    pub model_version: ModelVersion,

    /// cpu or cuda
    #[arg(long, env = "HEADCOUNT_DEVICE", default_value = "cpu")]
    pub device: String,

    #[arg(long, env = "HEADCOUNT_DEVICE_ID", default_value_t = 0)]
    pub device_id: usize,

    #[arg(long, env = "HEADCOUNT_INFERENCE_SIZE", default_value_t = DEFAULT_INFERENCE_SIZE)]
    pub inference_size: u32,

    #[arg(long, env = "HEADCOUNT_CONFIDENCE", default_value_t = 0.25)]
    pub confidence: f32,

    #[arg(long, env = "HEADCOUNT_IOU", default_value_t = 0.7)]
    pub iou: f32,

    #[arg(long, env = "HEADCOUNT_PERSON_CLASS_ID", default_value_t = PERSON_CLASS_ID)]
    pub person_class_id: isize,

    #[arg(long, env = "HEADCOUNT_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    #[arg(long, env = "HEADCOUNT_MAX_IMAGE_BYTES", default_value_t = DEFAULT_MAX_IMAGE_BYTES)]
    pub max_image_bytes: u64,

    /// Answer failed requests with 502/422/500 instead of 200
    #[arg(long, env = "HEADCOUNT_STRICT_STATUS")]
    pub strict_status: bool,

    /// Used when RUST_LOG is unset
    #[arg(long, env = "HEADCOUNT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn inference_device(&self) -> anyhow::Result<InferenceDevice> {
        match self.device.to_lowercase().as_str() {
            "cpu" => Ok(InferenceDevice::CPU),
            "cuda" => Ok(InferenceDevice::CUDA(self.device_id)),
            other => other.parse::<InferenceDevice>().map_err(anyhow::Error::msg),
        }
    }

    pub fn model_config(&self) -> anyhow::Result<ModelConfig> {
        let weights_path = self
            .model
            .clone()
            .unwrap_or_else(|| FsAccess::Cache.file_or_local(DEFAULT_MODEL_FILE));

        if !(0.0..=1.0).contains(&self.confidence) {
            anyhow::bail!("Confidence must be within [0, 1], got {}", self.confidence);
        }
        if !(0.0..=1.0).contains(&self.iou) {
            anyhow::bail!("IoU threshold must be within [0, 1], got {}", self.iou);
        }
        if self.inference_size == 0 || self.inference_size % 32 != 0 {
            anyhow::bail!("Inference size must be a positive multiple of 32, got {}", self.inference_size);
        }

        Ok(ModelConfig {
            weights_path,
            ort_lib_path: self.ort_lib_path.clone(),
            labels_path: self.labels.clone(),
            inference_device: self.inference_device()?,
            model_version: self.model_version,
            conf_threshold: self.confidence,
            iou_threshold: self.iou,
            inference_size: self.inference_size,
            person_class_id: self.person_class_id,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
