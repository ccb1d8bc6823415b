use crate::detection::preprocessing::Letterbox;
use crate::models::{BoundingBox, Detection};
use std::cmp::Ordering;

/// Orientation of a single-output YOLO head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// `[4 + classes, anchors]`, the usual ultralytics export
    FeaturesFirst,
    /// `[anchors, 4 + classes]`
    AnchorsFirst,
}

impl OutputLayout {
    /// Guess the layout from the two trailing dims; anchors outnumber features
    pub fn infer(dim1: usize, dim2: usize) -> Self {
        if dim1 <= dim2 {
            OutputLayout::FeaturesFirst
        } else {
            OutputLayout::AnchorsFirst
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    class_id: u32,
    confidence: f32,
}

impl Candidate {
    fn iou(&self, other: &Candidate) -> f32 {
        let iw = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let ih = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let inter = iw * ih;
        let area_a = (self.x2 - self.x1) * (self.y2 - self.y1);
        let area_b = (other.x2 - other.x1) * (other.y2 - other.y1);
        let union = area_a + area_b - inter;
        if union <= 0.0 { 0.0 } else { inter / union }
    }
}

/// Raw head output plus the letterbox that produced its input
pub struct RawPredictions<'a> {
    pub data: &'a [f32],
    pub num_features: usize,
    pub num_anchors: usize,
    pub layout: OutputLayout,
}

impl RawPredictions<'_> {
    fn at(&self, feature: usize, anchor: usize) -> f32 {
        match self.layout {
            OutputLayout::FeaturesFirst => self.data[feature * self.num_anchors + anchor],
            OutputLayout::AnchorsFirst => self.data[anchor * self.num_features + feature],
        }
    }
}

/// Turn raw predictions into detections in original image pixels
pub fn decode(
    raw: &RawPredictions<'_>,
    letterbox: &Letterbox,
    confidence_threshold: f32,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    let num_classes = raw.num_features.saturating_sub(4);
    let mut candidates = Vec::new();

    for anchor in 0..raw.num_anchors {
        let mut best_class = 0usize;
        let mut best_score = f32::MIN;
        for c in 0..num_classes {
            let s = raw.at(4 + c, anchor);
            if s > best_score {
                best_score = s;
                best_class = c;
            }
        }

        if num_classes == 0 || best_score < confidence_threshold {
            continue;
        }

        let cx = raw.at(0, anchor);
        let cy = raw.at(1, anchor);
        let w = raw.at(2, anchor);
        let h = raw.at(3, anchor);

        let (x1, y1) = letterbox.to_original(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_original(cx + w / 2.0, cy + h / 2.0);
        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        candidates.push(Candidate {
            x1,
            y1,
            x2,
            y2,
            class_id: best_class as u32,
            confidence: best_score,
        });
    }

    nms(candidates, iou_threshold)
        .into_iter()
        .take(max_detections)
        .map(|c| Detection {
            bbox: BoundingBox::new(c.x1 as i32, c.y1 as i32, c.x2 as i32, c.y2 as i32),
            class_id: c.class_id,
            confidence: c.confidence,
        })
        .collect()
}

/// Greedy per-class NMS, highest confidence first
fn nms(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal));

    let mut kept: Vec<Candidate> = Vec::new();
    let mut suppressed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        kept.push(candidates[i]);
        for j in (i + 1)..candidates.len() {
            if candidates[j].class_id == candidates[i].class_id
                && candidates[i].iou(&candidates[j]) > iou_threshold
            {
                suppressed[j] = true;
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a features-first tensor from per-anchor rows
    fn features_first(rows: &[[f32; 6]]) -> Vec<f32> {
        let anchors = rows.len();
        let mut data = vec![0.0; 6 * anchors];
        for (a, row) in rows.iter().enumerate() {
            for (f, v) in row.iter().enumerate() {
                data[f * anchors + a] = *v;
            }
        }
        data
    }

    fn identity() -> Letterbox {
        Letterbox::new(640, 640, 640)
    }

    #[test]
    fn keeps_best_class_above_threshold() {
        let data = features_first(&[
            [100.0, 100.0, 40.0, 20.0, 0.1, 0.9],
            [300.0, 300.0, 10.0, 10.0, 0.2, 0.3],
        ]);
        let raw = RawPredictions { data: &data, num_features: 6, num_anchors: 2, layout: OutputLayout::FeaturesFirst };

        let dets = decode(&raw, &identity(), 0.5, 0.7, 300);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].class_id, 1);
        assert_eq!(dets[0].bbox, BoundingBox::new(80, 90, 120, 110));
    }

    #[test]
    fn suppresses_overlapping_boxes_of_same_class() {
        let data = features_first(&[
            [100.0, 100.0, 40.0, 40.0, 0.8, 0.0],
            [102.0, 101.0, 40.0, 40.0, 0.95, 0.0],
            [102.0, 101.0, 40.0, 40.0, 0.0, 0.6],
        ]);
        let raw = RawPredictions { data: &data, num_features: 6, num_anchors: 3, layout: OutputLayout::FeaturesFirst };

        let dets = decode(&raw, &identity(), 0.5, 0.7, 300);
        assert_eq!(dets.len(), 2);
        assert!((dets[0].confidence - 0.95).abs() < 1e-6);
        assert_eq!(dets[1].class_id, 1);
    }

    #[test]
    fn reads_anchors_first_layout() {
        let data = vec![50.0, 50.0, 20.0, 20.0, 0.0, 0.7];
        let raw = RawPredictions { data: &data, num_features: 6, num_anchors: 1, layout: OutputLayout::AnchorsFirst };

        let dets = decode(&raw, &identity(), 0.5, 0.7, 300);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].bbox, BoundingBox::new(40, 40, 60, 60));
    }

    #[test]
    fn undoes_letterbox_padding() {
        // 1280x640 -> scale 0.5, pad_y 160
        let lb = Letterbox::new(1280, 640, 640);
        let data = features_first(&[[320.0, 320.0, 100.0, 50.0, 0.9, 0.0]]);
        let raw = RawPredictions { data: &data, num_features: 6, num_anchors: 1, layout: OutputLayout::FeaturesFirst };

        let dets = decode(&raw, &lb, 0.5, 0.7, 300);
        assert_eq!(dets[0].bbox, BoundingBox::new(540, 270, 740, 370));
    }

    #[test]
    fn infers_layout_from_dims() {
        assert_eq!(OutputLayout::infer(84, 8400), OutputLayout::FeaturesFirst);
        assert_eq!(OutputLayout::infer(8400, 84), OutputLayout::AnchorsFirst);
    }
}
