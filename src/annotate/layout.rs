use crate::models::{BoundingBox, Detection, LabelPosition, StyleOptions};

/// Gap between a box edge and a label placed above, below or inside it
const VERTICAL_GAP: i32 = 5;
/// Gap between a box edge and a label placed beside it
const SIDE_GAP: i32 = 10;
/// Background padding around label text, per side
pub const LABEL_PADDING: i32 = 2;

/// Drawing instructions for one detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelLayout {
    /// Box outline, clamped to the canvas
    pub outline: BoundingBox,
    /// Top-left corner of the label text
    pub text_origin: (i32, i32),
    /// Filled rectangle behind the text, inclusive corners
    pub background: BoundingBox,
}

/// Label text: display name plus an optional two-decimal confidence
pub fn label_text(name: &str, confidence: f32, show_confidence: bool) -> String {
    if show_confidence {
        format!("{} {:.2}", name, confidence)
    } else {
        name.to_string()
    }
}

/// Text origin for `position`; only the left strategy clamps (at x = 0)
pub fn text_origin(bbox: &BoundingBox, position: LabelPosition, text_width: i32, text_height: i32) -> (i32, i32) {
    let BoundingBox { x1, y1, x2, y2 } = *bbox;
    let mid_y = y1 + (y2 - y1).div_euclid(2) - text_height.div_euclid(2);

    match position {
        LabelPosition::Above => (x1, y1 - text_height - VERTICAL_GAP),
        LabelPosition::Below => (x1, y2 + VERTICAL_GAP),
        LabelPosition::Left => ((x1 - text_width - SIDE_GAP).max(0), mid_y),
        LabelPosition::Right => (x2 + SIDE_GAP, mid_y),
        LabelPosition::Inside => (x1 + VERTICAL_GAP, y1 + VERTICAL_GAP),
    }
}

/// Lay out one detection on a `canvas` of (width, height) pixels
pub fn compute_layout(
    detection: &Detection,
    canvas: (u32, u32),
    style: &StyleOptions,
    text_size: (u32, u32),
) -> LabelLayout {
    let outline = detection.bbox.clamp_to(canvas.0, canvas.1);
    let (tw, th) = (text_size.0 as i32, text_size.1 as i32);
    // Placement follows the detection's own box; only the outline is clamped
    let (tx, ty) = text_origin(&detection.bbox, style.label_position, tw, th);

    LabelLayout {
        outline,
        text_origin: (tx, ty),
        background: BoundingBox::new(
            tx - LABEL_PADDING,
            ty - LABEL_PADDING,
            tx + tw + LABEL_PADDING,
            ty + th + LABEL_PADDING,
        ),
    }
}
