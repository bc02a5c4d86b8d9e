use crate::common::BoundingBox;
use crate::detection_runners::ort_detector::nms::Nms;

/// One candidate object reported by the model.
///
/// Only `class_id` takes part in counting; the box and confidence are kept for
/// NMS and for logging.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd)]
pub struct Detection {
    pub class_id: isize,
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub label: Option<String>,
}

impl Nms for Detection {
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn class_id(&self) -> isize {
        self.class_id
    }
}

impl Detection {
    /// Sets the bounding box's coordinates using `(x1, y1, x2, y2)`.
    pub fn with_x1y1_x2y2(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = BoundingBox::new(x1, y1, x2, y2);
        self
    }

    /// Sets the bounding box's coordinates and dimensions using `(x, y, w, h)`.
    pub fn with_x1y1_wh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = BoundingBox::default().with_x1y1_wh(x, y, w, h);
        self
    }

    pub fn with_confidence(mut self, conf: f32) -> Self {
        self.confidence = conf;
        self
    }

    pub fn with_class_id(mut self, class_id: isize) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// True when this detection belongs to `class_id`.
    pub fn is_class(&self, class_id: isize) -> bool {
        self.class_id == class_id
    }
}
