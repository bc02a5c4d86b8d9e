//! YOLO families and the layout of their raw prediction tensors.

use std::fmt;
use std::str::FromStr;
use ndarray::{ArrayView, Axis, IxDyn};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ModelVersion {
    YoloV5,
    YoloV6,
    YoloV7,
    YoloV8,
    YoloV9,
    #[default] YoloV10,
    YoloV11,
    YoloV12,
}

impl ModelVersion {
    pub fn name(&self) -> &'static str {
        match self {
            Self::YoloV5 => "YoloV5",
            Self::YoloV6 => "YoloV6",
            Self::YoloV7 => "YoloV7",
            Self::YoloV8 => "YoloV8",
            Self::YoloV9 => "YoloV9",
            Self::YoloV10 => "YoloV10",
            Self::YoloV11 => "YoloV11",
            Self::YoloV12 => "YoloV12",
        }
    }

    /// Output tensor layout exported by this family.
    pub fn layout(&self) -> YoloPreds {
        match self {
            Self::YoloV5 | Self::YoloV6 | Self::YoloV7 => YoloPreds::n_a_cxcywh_confclss(),
            Self::YoloV8 | Self::YoloV9 | Self::YoloV11 | Self::YoloV12 => YoloPreds::n_cxcywh_clss_a(),
            // end-to-end head, boxes are already de-duplicated
            Self::YoloV10 => YoloPreds::n_a_xyxy_confcls().apply_nms(false),
        }
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelVersion {
    type Err = String;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let version = version.to_lowercase();
        let version = version.trim_start_matches("yolo").trim_start_matches('v');
        match version {
            "5" => Ok(ModelVersion::YoloV5),
            "6" => Ok(ModelVersion::YoloV6),
            "7" => Ok(ModelVersion::YoloV7),
            "8" => Ok(ModelVersion::YoloV8),
            "9" => Ok(ModelVersion::YoloV9),
            "10" => Ok(ModelVersion::YoloV10),
            "11" => Ok(ModelVersion::YoloV11),
            "12" => Ok(ModelVersion::YoloV12),
            other => Err(format!("unknown YOLO version: {other}")),
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum BoxType {
    /// 1
    Cxcywh,

    /// 2 Cxcybr
    Cxcyxy,

    /// 3 Tlbr
    Xyxy,

    /// 4  Tlwh
    Xywh,
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum ClssType {
    Clss,
    ConfCls,
    ClsConf,
    ConfClss,
    ClssConf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnchorsPosition {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YoloPreds {
    pub clss: ClssType,
    pub bbox: Option<BoxType>,
    pub anchors: Option<AnchorsPosition>,
    pub is_bbox_normalized: bool,
    pub apply_nms: bool,
}

impl Default for YoloPreds {
    fn default() -> Self {
        Self {
            clss: ClssType::Clss,
            bbox: None,
            anchors: None,
            is_bbox_normalized: false,
            apply_nms: true,
        }
    }
}

/// Per-anchor slices of one image's predictions: boxes, explicit class ids,
/// class scores and objectness.
pub type PredSlices<'a> = (
    ArrayView<'a, f32, IxDyn>,
    Option<ArrayView<'a, f32, IxDyn>>,
    ArrayView<'a, f32, IxDyn>,
    Option<ArrayView<'a, f32, IxDyn>>,
);

impl YoloPreds {
    pub fn apply_nms(mut self, x: bool) -> Self {
        self.apply_nms = x;
        self
    }

    pub fn n_a_cxcywh_confclss() -> Self {
        // YOLOv5 | YOLOv6 | YOLOv7 | YOLOX : NACxcywhConfClss
        Self {
            bbox: Some(BoxType::Cxcywh),
            clss: ClssType::ConfClss,
            anchors: Some(AnchorsPosition::Before),
            ..Default::default()
        }
    }

    pub fn n_cxcywh_clss_a() -> Self {
        // YOLOv8 | YOLOv9 | YOLO11 : NCxcywhClssA
        Self {
            bbox: Some(BoxType::Cxcywh),
            clss: ClssType::Clss,
            anchors: Some(AnchorsPosition::After),
            ..Default::default()
        }
    }

    pub fn n_a_xyxy_confcls() -> Self {
        // YOLOv10 : NAXyxyConfCls
        Self {
            bbox: Some(BoxType::Xyxy),
            clss: ClssType::ConfCls,
            anchors: Some(AnchorsPosition::Before),
            ..Default::default()
        }
    }

    pub fn box_type(&self) -> Option<&BoxType> {
        self.bbox.as_ref()
    }

    pub fn is_anchors_first(&self) -> bool {
        matches!(self.anchors, Some(AnchorsPosition::Before))
    }

    /// Values each anchor must carry for `nc` classes.
    pub fn num_features(&self, nc: usize) -> usize {
        4 + match self.clss {
            ClssType::Clss => nc,
            ClssType::ConfClss | ClssType::ClssConf => nc + 1,
            ClssType::ConfCls | ClssType::ClsConf => 2,
        }
    }

    /// Checks a `[batch, .., ..]` prediction shape against this layout before
    /// it is sliced by [`YoloPreds::parse_preds`].
    pub fn check_shape(&self, shape: &[usize], nc: usize) -> anyhow::Result<()> {
        if shape.len() != 3 {
            anyhow::bail!("Expected a 3D prediction tensor, got shape {:?}", shape);
        }
        let features = if self.is_anchors_first() { shape[2] } else { shape[1] };
        let needed = self.num_features(nc);
        if features < needed {
            anyhow::bail!(
                "Model outputs {} values per anchor but {} classes need {}; check the labels file and model version",
                features,
                nc,
                needed
            );
        }
        Ok(())
    }

    /// Splits one image's prediction matrix into its per-anchor slices.
    ///
    /// `x` is `[anchors, features]` when anchors come first and
    /// `[features, anchors]` otherwise.
    pub fn parse_preds<'a>(&self, x: ArrayView<'a, f32, IxDyn>, nc: usize) -> PredSlices<'a> {
        let x = if self.is_anchors_first() {
            x
        } else {
            x.reversed_axes()
        };

        let (slice_bboxes, xs) = x.split_at(Axis(1), 4);

        let (slice_id, slice_clss, slice_confs) = match self.clss {
            ClssType::ConfClss => {
                let (confs, xs) = xs.split_at(Axis(1), 1);
                let (clss, _) = xs.split_at(Axis(1), nc);
                (None, clss, Some(confs))
            }
            ClssType::ClssConf => {
                let (clss, xs) = xs.split_at(Axis(1), nc);
                let (confs, _) = xs.split_at(Axis(1), 1);
                (None, clss, Some(confs))
            }
            ClssType::ConfCls => {
                let (clss, xs) = xs.split_at(Axis(1), 1);
                let (ids, _) = xs.split_at(Axis(1), 1);
                (Some(ids), clss, None)
            }
            ClssType::ClsConf => {
                let (ids, xs) = xs.split_at(Axis(1), 1);
                let (clss, _) = xs.split_at(Axis(1), 1);
                (Some(ids), clss, None)
            }
            ClssType::Clss => {
                let (clss, _) = xs.split_at(Axis(1), nc);
                (None, clss, None)
            }
        };

        (slice_bboxes, slice_id, slice_clss, slice_confs)
    }
}
