use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::font::LabelFont;
use super::layout::{self, LabelLayout};
use crate::classes::ClassNameTable;
use crate::models::{AnnotatedImage, BoundingBox, DetectedLabel, Detection, StyleOptions};

pub const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Inclusive-corner box as an imageproc rect, None when degenerate
fn to_rect(b: &BoundingBox) -> Option<Rect> {
    let w = b.x2 - b.x1 + 1;
    let h = b.y2 - b.y1 + 1;
    if w <= 0 || h <= 0 {
        return None;
    }
    Some(Rect::at(b.x1, b.y1).of_size(w as u32, h as u32))
}

/// Stroke `thickness` nested outlines growing inward from the box edge
pub fn draw_outline(canvas: &mut RgbImage, bbox: &BoundingBox, thickness: u32, color: Rgb<u8>) {
    for i in 0..thickness as i32 {
        let inner = BoundingBox::new(bbox.x1 + i, bbox.y1 + i, bbox.x2 - i, bbox.y2 - i);
        match to_rect(&inner) {
            Some(rect) => draw_hollow_rect_mut(canvas, rect, color),
            None => break,
        }
    }
}

/// Draw one laid-out label: outline, background, then text
pub fn draw_label(canvas: &mut RgbImage, layout: &LabelLayout, text: &str, font: &LabelFont, style: &StyleOptions) {
    draw_outline(canvas, &layout.outline, style.box_thickness, BOX_COLOR);
    if let Some(rect) = to_rect(&layout.background) {
        draw_filled_rect_mut(canvas, rect, BOX_COLOR);
    }
    let (x, y) = layout.text_origin;
    font.draw(canvas, TEXT_COLOR, x, y, style.font_size, text);
}

/// Draw every detection onto a copy of `image`
pub fn annotate(
    image: &RgbImage,
    detections: &[Detection],
    classes: &ClassNameTable,
    font: &LabelFont,
    style: &StyleOptions,
) -> AnnotatedImage {
    let mut canvas = image.clone();
    let canvas_size = canvas.dimensions();
    let mut labels = Vec::with_capacity(detections.len());

    for det in detections {
        let name = classes.label_for(det.class_id);
        let text = layout::label_text(&name, det.confidence, style.show_confidence);
        let text_size = font.measure(&text, style.font_size);
        let layout = layout::compute_layout(det, canvas_size, style, text_size);

        draw_label(&mut canvas, &layout, &text, font, style);

        labels.push(DetectedLabel { label: text, confidence: det.confidence });
    }

    AnnotatedImage { image: canvas, labels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_thickness_grows_inward() {
        let mut canvas = RgbImage::new(20, 20);
        draw_outline(&mut canvas, &BoundingBox::new(2, 2, 17, 17), 3, BOX_COLOR);

        assert_eq!(canvas.get_pixel(2, 10), &BOX_COLOR);
        assert_eq!(canvas.get_pixel(4, 10), &BOX_COLOR);
        assert_eq!(canvas.get_pixel(5, 10), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(1, 10), &Rgb([0, 0, 0]));
    }

    #[test]
    fn thick_outline_on_tiny_box_stops() {
        let mut canvas = RgbImage::new(10, 10);
        draw_outline(&mut canvas, &BoundingBox::new(4, 4, 6, 6), 10, BOX_COLOR);
        assert_eq!(canvas.get_pixel(5, 5), &BOX_COLOR);
        assert_eq!(canvas.get_pixel(3, 3), &Rgb([0, 0, 0]));
    }

    #[test]
    fn no_detections_leaves_image_untouched() {
        let image = RgbImage::from_pixel(32, 32, Rgb([10, 20, 30]));
        let out = annotate(&image, &[], &ClassNameTable::default(), &LabelFont::Builtin, &StyleOptions::default());
        assert!(out.is_empty());
        assert_eq!(out.image, image);
    }
}
