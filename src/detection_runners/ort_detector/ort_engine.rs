//! ONNX Runtime session wrapper: provider selection, dtype alignment, run.

use std::time::Instant;
use anyhow::Result;
use half::f16;
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::{Session, SessionInputValue},
    tensor::TensorElementType,
    value::{DynValue, Value},
};
use crate::common::InferenceDevice;
use crate::data::{ConfigOrt, TimeCalc, Xs, CROSS_MARK, X};

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    input_dtypes: Vec<TensorElementType>,
    output_names: Vec<String>,
    model_width: u32,
    model_height: u32,
    profile: bool,
    infer_time: TimeCalc,
}

impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        if let Some(lib_path) = &config.ort_lib_path {
            // Dynamically load the library from given path
            match ort::init_from(lib_path.to_string_lossy().to_string()).with_name("headcount").commit() {
                Ok(_) => {}
                Err(e) => {
                    anyhow::bail!("{CROSS_MARK} Failed to commit ORT from {}: {:?}", lib_path.display(), e)
                }
            };
        }

        let mut builder = Session::builder()?;

        let mut device = config.device;
        match device {
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.onnx_path)?;

        let input_names: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
        let input_dtypes: Vec<TensorElementType> = session
            .inputs
            .iter()
            .map(|i| i.input_type.tensor_type().unwrap_or(TensorElementType::Float32))
            .collect();
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

        if input_names.is_empty() || output_names.is_empty() {
            anyhow::bail!("{CROSS_MARK} Model has no inputs or outputs: {}", config.onnx_path.display());
        }

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Inputs: {:?} {:?} | Outputs: {:?}",
            device,
            input_names,
            input_dtypes,
            output_names,
        );

        Ok(Self {
            session,
            input_dtypes,
            output_names,
            model_width: config.model_width,
            model_height: config.model_height,
            profile: config.profile,
            infer_time: TimeCalc::default(),
        })
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => {}
                Err(err) => anyhow::bail!("{CROSS_MARK} CUDA initialization failed: {:?}", err),
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => {}
                Err(err) => anyhow::bail!("{CROSS_MARK} CPU initialization failed: {:?}", err),
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CPU execution provider not available")
        }
    }

    fn tensor_preprocess(x: &X, dtype: &TensorElementType) -> Result<DynValue> {
        let x = match dtype {
            TensorElementType::Float32 => Value::from_array(x.0.clone())?.into_dyn(),
            TensorElementType::Float16 => Value::from_array(x.mapv(f16::from_f32))?.into_dyn(),
            _ => anyhow::bail!("Unsupported model input type: {:?}", dtype),
        };
        Ok(x)
    }

    fn tensor_postprocess(x: &DynValue) -> Result<Array<f32, IxDyn>> {
        if let Ok(x) = x.try_extract_array::<f32>() {
            return Ok(x.view().into_owned());
        }
        match x.try_extract_array::<f16>() {
            Ok(x) => Ok(x.view().mapv(f16::to_f32).into_owned()),
            Err(err) => anyhow::bail!("Unsupported model output type: {:?}", err),
        }
    }

    pub fn run(&mut self, xs: Xs) -> Result<Xs> {
        let mut ys = Xs::new();

        // alignment
        let t_pre = Instant::now();
        let mut xs_ = Vec::new();
        for (dtype, x) in self.input_dtypes.iter().zip(xs.iter()) {
            xs_.push(Into::<SessionInputValue<'_>>::into(Self::tensor_preprocess(x, dtype)?));
        }
        let t_pre = t_pre.elapsed();
        self.infer_time.add_or_push(0, t_pre);

        // run
        let t_run = Instant::now();
        let outputs = self.session.run(&xs_[..])?;
        let t_run = t_run.elapsed();
        self.infer_time.add_or_push(1, t_run);

        // extract
        let t_post = Instant::now();
        for name in self.output_names.iter() {
            let y = Self::tensor_postprocess(&outputs[name.as_str()])?;
            ys.push_kv(name.as_str(), X::from(y))?;
        }
        let t_post = t_post.elapsed();
        self.infer_time.add_or_push(2, t_post);

        if self.profile {
            log::info!(
                "[Profile] {:.2?} ({:.2?} avg) [alignment: {:.2?} | inference: {:.2?} | to_f32: {:.2?}]",
                t_pre + t_run + t_post,
                self.infer_time.avg(),
                t_pre,
                t_run,
                t_post,
            );
        }

        Ok(ys)
    }

    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom(key).unwrap_or_default(),
        }
    }

    pub fn model_width(&self) -> u32 {
        self.model_width
    }

    pub fn model_height(&self) -> u32 {
        self.model_height
    }
}
