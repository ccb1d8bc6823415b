use image::{ImageFormat, Rgb, RgbImage};
use signview::{ClassNameTable, Detection, Detector, LabelFont, SignAnnotator};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Detector returning canned detections, filtered by the threshold
pub struct FakeDetector {
    pub detections: Vec<Detection>,
    pub calls: AtomicUsize,
}

impl FakeDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for FakeDetector {
    fn detect(&self, _image: &image::DynamicImage, confidence_threshold: f32) -> anyhow::Result<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .detections
            .iter()
            .filter(|d| d.confidence >= confidence_threshold)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn detection(x1: i32, y1: i32, x2: i32, y2: i32, class_id: u32, confidence: f32) -> Detection {
    Detection { bbox: signview::BoundingBox::new(x1, y1, x2, y2), class_id, confidence }
}

/// Class table with three sign codes
pub fn test_classes() -> ClassNameTable {
    ClassNameTable::from_names(["2.1", "5.19.1", "3.24"])
}

/// Annotator around a fake detector, always using the built-in font
pub fn make_annotator(detections: Vec<Detection>) -> (SignAnnotator, Arc<FakeDetector>) {
    let detector = Arc::new(FakeDetector::new(detections));
    let annotator = SignAnnotator::new(
        detector.clone(),
        Arc::new(test_classes()),
        Arc::new(LabelFont::Builtin),
    );
    (annotator, detector)
}

/// Uniform gray test image
pub fn gray_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([128, 128, 128]))
}

/// Gray image encoded as `format`
pub fn encoded_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    gray_image(width, height)
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("Failed to encode test image");
    buf
}

/// PNG-encoded gray image
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded_bytes(width, height, ImageFormat::Png)
}
