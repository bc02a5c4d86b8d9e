mod bounding_box;
mod detection;
mod inference_device;
mod model_config;
mod model_version;

pub use bounding_box::*;
pub use detection::*;
pub use inference_device::*;
pub use model_config::*;
pub use model_version::*;
