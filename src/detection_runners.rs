pub mod inference_process;
pub mod ort_detector;

pub use ort_detector::*;
