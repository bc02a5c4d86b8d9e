use std::time::Instant;
use crate::common::Detection;
use crate::data::{ConfigOrt, Xs};
use crate::utils;

pub trait InferenceProcess: Sized {
    type Input;

    /// Creates a new instance of the model with the given options.
    fn new(options: ConfigOrt) -> anyhow::Result<Self>;

    /// Pre-process the input data.
    fn preprocess(&self, xs: &[Self::Input]) -> anyhow::Result<Xs>;

    /// Executes the model on the preprocessed data.
    fn inference(&self, xs: Xs) -> anyhow::Result<Xs>;

    /// Post-process the model's output, one detection list per input.
    fn postprocess(&self, xs: Xs, xs0: &[Self::Input]) -> anyhow::Result<Vec<Vec<Detection>>>;

    /// Executes the full pipeline.
    fn run(&self, xs: &[Self::Input]) -> anyhow::Result<Vec<Vec<Detection>>> {
        let detect_time = Instant::now();
        let mut elapsed = detect_time.elapsed();

        let ys = self.preprocess(xs)?;
        elapsed = utils::trace("Preprocessing input", detect_time, elapsed);

        let ys = self.inference(ys)?;
        elapsed = utils::trace("Detection run", detect_time, elapsed);

        let ys = self.postprocess(ys, xs)?;
        utils::trace("Postprocessing", detect_time, elapsed);

        Ok(ys)
    }
}
