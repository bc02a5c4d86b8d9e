use std::fmt;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
}

// Hardcoded device names. Storing the "proper" spelling and the lowercase version.
const CPU: [&str; 2] = ["CPU", "cpu"];
const CUDA: [&str; 2] = ["CUDA", "cuda"];

impl InferenceDevice {
    pub fn from_name(device: &str, device_id: usize) -> Option<Self> {
        match device.to_lowercase().as_str() {
            "cpu" => Some(InferenceDevice::CPU),
            "cuda" => Some(InferenceDevice::CUDA(device_id)),
            _ => None,
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => CPU[0],
            InferenceDevice::CUDA(_) => CUDA[0],
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => CPU[1],
            InferenceDevice::CUDA(_) => CUDA[1],
        }
    }

    pub fn all_inference_devices() -> Vec<String> {
        vec![
            InferenceDevice::CPU.str_lowercase().to_string(),
            InferenceDevice::CUDA(0).str_lowercase().to_string(),
        ]
    }
}

impl fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceDevice::CPU => f.write_str(self.str()),
            InferenceDevice::CUDA(id) => write!(f, "{}:{}", self.str(), id),
        }
    }
}

impl FromStr for InferenceDevice {
    type Err = String;

    /// Accepts `cpu`, `cuda` or `cuda:<id>`.
    fn from_str(device: &str) -> Result<Self, Self::Err> {
        let (name, id) = match device.split_once(':') {
            Some((name, id)) => {
                let id = id.parse::<usize>().map_err(|_| format!("invalid device id: {id}"))?;
                (name, id)
            }
            None => (device, 0),
        };
        Self::from_name(name, id).ok_or_else(|| {
            format!(
                "unknown inference device {device}, expected one of: {}",
                Self::all_inference_devices().join(", ")
            )
        })
    }
}
