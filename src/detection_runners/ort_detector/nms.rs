pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
    fn class_id(&self) -> isize;
}

/// Greedy per-class non-maximum suppression, keeping the most confident box
/// of every overlapping group. Boxes of different classes never suppress each
/// other. The survivors are left sorted by confidence.
pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32) {
    boxes.sort_by(|b1, b2| {
        b2.confidence()
            .partial_cmp(&b1.confidence())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut current_index = 0;
    for index in 0..boxes.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            if boxes[prev_index].class_id() != boxes[index].class_id() {
                continue;
            }
            let iou = boxes[prev_index].iou(&boxes[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            boxes.swap(current_index, index);
            current_index += 1;
        }
    }
    boxes.truncate(current_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Detection;

    #[test]
    fn suppresses_overlapping_boxes() {
        let mut boxes = vec![
            Detection::default().with_x1y1_wh(0., 0., 100., 100.).with_confidence(0.6),
            Detection::default().with_x1y1_wh(5., 5., 100., 100.).with_confidence(0.9),
            Detection::default().with_x1y1_wh(300., 300., 50., 50.).with_confidence(0.4),
        ];

        nms(&mut boxes, 0.7);

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].confidence, 0.9);
        assert_eq!(boxes[1].confidence, 0.4);
    }

    #[test]
    fn overlapping_boxes_of_other_classes_survive() {
        let mut boxes = vec![
            Detection::default().with_class_id(0).with_x1y1_wh(10., 10., 80., 200.).with_confidence(0.6),
            Detection::default().with_class_id(26).with_x1y1_wh(12., 12., 80., 200.).with_confidence(0.8),
            Detection::default().with_class_id(0).with_x1y1_wh(11., 11., 80., 200.).with_confidence(0.5),
        ];

        nms(&mut boxes, 0.7);

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].class_id, 26);
        assert_eq!(boxes[1].class_id, 0);
        assert_eq!(boxes[1].confidence, 0.6);
    }
}
