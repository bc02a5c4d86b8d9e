//! YOLO on top of [`OrtEngine`]: letterbox in, layout-aware decoding out.

use anyhow::Result;
use image::RgbImage;
use ndarray::{s, Axis};
use parking_lot::Mutex;
use rayon::prelude::*;
use regex::Regex;

use crate::common::{BoxType, Detection, ModelVersion, YoloPreds};
use crate::data::{ConfigOrt, DynConf, Xs};
use crate::detection_runners::image_ops::{self, ImageTransformInfo};
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::nms::nms;
use crate::detection_runners::ort_detector::OrtEngine;

#[derive(Debug)]
pub struct OrtYolo {
    engine: Mutex<OrtEngine>,
    nc: usize,
    height: u32,
    width: u32,
    confs: DynConf,
    iou: f32,
    names: Vec<String>,
    layout: YoloPreds,
    version: ModelVersion,
}

impl InferenceProcess for OrtYolo {
    type Input = RgbImage;

    fn new(options: ConfigOrt) -> Result<Self> {
        let engine = OrtEngine::new(&options)?;
        let (height, width) = (engine.model_height(), engine.model_width());

        let version = options.yolo_version;
        let layout = version.layout();

        // Class names: user-defined.or(parsed)
        let names_parsed = Self::fetch_names(&engine)?;
        let names = match (names_parsed, options.names) {
            (Some(parsed), Some(names)) => {
                if names.len() != parsed.len() {
                    anyhow::bail!(
                        "The lengths of parsed class names: {} and user-defined class names: {} do not match.",
                        parsed.len(),
                        names.len(),
                    );
                }
                Some(names)
            }
            (Some(parsed), None) => Some(parsed),
            (None, names) => names,
        };

        // nc: names.len().or(options.nc)
        let nc = match &names {
            Some(names) => names.len(),
            None => match options.nc {
                Some(nc) => nc,
                None => anyhow::bail!(
                    "Unable to obtain the number of classes. Provide a labels file or a model with `names` metadata."
                ),
            },
        };

        let names = names.unwrap_or_else(|| Self::n2s(nc));

        let confs = DynConf::new(&options.confs, nc);
        let iou = options.iou.unwrap_or(0.7);

        log::info!("YOLO Version: {} | Classes: {} | Input: {}x{}", version, nc, width, height);

        Ok(Self {
            engine: Mutex::new(engine),
            confs,
            iou,
            nc,
            height,
            width,
            names,
            layout,
            version,
        })
    }

    fn preprocess(&self, xs: &[Self::Input]) -> Result<Xs> {
        let x = image_ops::preprocess(xs, self.height, self.width)?;
        Ok(Xs::from(x))
    }

    fn inference(&self, xs: Xs) -> Result<Xs> {
        self.engine.lock().run(xs)
    }

    fn postprocess(&self, xs: Xs, xs0: &[Self::Input]) -> Result<Vec<Vec<Detection>>> {
        if xs.is_empty() {
            anyhow::bail!("Model produced no outputs");
        }
        let preds = &xs[0];
        self.layout.check_shape(preds.shape(), self.nc)?;

        let ys: Vec<Vec<Detection>> = preds
            .axis_iter(Axis(0))
            .into_par_iter()
            .enumerate()
            .map(|(idx, preds)| {
                let Some(image) = xs0.get(idx) else {
                    return Vec::new();
                };
                let info = ImageTransformInfo::letterbox(image.width(), image.height(), self.width, self.height);

                let (slice_bboxes, slice_id, slice_clss, slice_confs) =
                    self.layout.parse_preds(preds, self.nc);

                let mut detections: Vec<Detection> = slice_bboxes
                    .axis_iter(Axis(0))
                    .enumerate()
                    .filter_map(|(i, bbox)| {
                        // confidence & class_id
                        let (class_id, confidence) = match &slice_id {
                            Some(ids) => (ids[[i, 0]] as usize, slice_clss[[i, 0]]),
                            None => {
                                let (class_id, &confidence) = slice_clss
                                    .slice(s![i, ..])
                                    .into_iter()
                                    .enumerate()
                                    .max_by(|a, b| a.1.total_cmp(b.1))?;

                                match &slice_confs {
                                    None => (class_id, confidence),
                                    Some(slice_confs) => (class_id, confidence * slice_confs[[i, 0]]),
                                }
                            }
                        };

                        // filtering low scores
                        if confidence < self.confs.get(class_id)? {
                            return None;
                        }

                        let bbox = if self.layout.is_bbox_normalized {
                            (
                                bbox[0] * self.width as f32,
                                bbox[1] * self.height as f32,
                                bbox[2] * self.width as f32,
                                bbox[3] * self.height as f32,
                            )
                        } else {
                            (bbox[0], bbox[1], bbox[2], bbox[3])
                        };

                        // corners in model-input space
                        let (x1, y1, x2, y2) = match self.layout.box_type()? {
                            BoxType::Cxcywh => {
                                let (cx, cy, w, h) = bbox;
                                (cx - w / 2., cy - h / 2., cx + w / 2., cy + h / 2.)
                            }
                            BoxType::Xyxy => bbox,
                            BoxType::Xywh => {
                                let (x, y, w, h) = bbox;
                                (x, y, x + w, y + h)
                            }
                            BoxType::Cxcyxy => {
                                let (cx, cy, x2, y2) = bbox;
                                (2. * cx - x2, 2. * cy - y2, x2, y2)
                            }
                        };

                        let (x1, y1) = info.to_source(x1, y1);
                        let (x2, y2) = info.to_source(x2, y2);

                        Some(
                            Detection::default()
                                .with_x1y1_x2y2(x1, y1, x2, y2)
                                .with_confidence(confidence)
                                .with_class_id(class_id as isize)
                                .with_label(&self.names[class_id]),
                        )
                    })
                    .collect();

                if self.layout.apply_nms {
                    nms(&mut detections, self.iou);
                }

                detections
            })
            .collect();

        Ok(ys)
    }
}

impl OrtYolo {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn version(&self) -> ModelVersion {
        self.version
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn fetch_names(engine: &OrtEngine) -> Result<Option<Vec<String>>> {
        // fetch class names from onnx metadata
        // String format: `{0: 'person', 1: 'bicycle', 2: 'sports ball', ..., 27: "yellow_lady's_slipper"}`
        let Some(names) = engine.try_fetch("names") else {
            return Ok(None);
        };
        let re = Regex::new(r#"(['"])([-()\w '"]+)(['"])"#)?;
        let names_: Vec<String> = re
            .captures_iter(&names)
            .map(|x| x.extract::<3>().1[1].to_string())
            .collect();
        Ok((!names_.is_empty()).then_some(names_))
    }

    fn n2s(n: usize) -> Vec<String> {
        (0..n).map(|x| format!("# {}", x)).collect::<Vec<String>>()
    }
}
