use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

/// Gray used for letterbox padding
const PAD_VALUE: u8 = 114;

/// Mapping between original image pixels and the square model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl Letterbox {
    pub fn new(orig_width: u32, orig_height: u32, input_size: u32) -> Self {
        let scale = (input_size as f32 / orig_width as f32).min(input_size as f32 / orig_height as f32);
        let new_w = (orig_width as f32 * scale).round();
        let new_h = (orig_height as f32 * scale).round();
        Self {
            scale,
            pad_x: ((input_size as f32 - new_w) / 2.0).floor(),
            pad_y: ((input_size as f32 - new_h) / 2.0).floor(),
            orig_width,
            orig_height,
        }
    }

    pub fn scaled_size(&self) -> (u32, u32) {
        (
            ((self.orig_width as f32 * self.scale).round() as u32).max(1),
            ((self.orig_height as f32 * self.scale).round() as u32).max(1),
        )
    }

    /// Map an input-space point back into original image pixels
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        (
            ((x - self.pad_x) / self.scale).clamp(0.0, self.orig_width as f32),
            ((y - self.pad_y) / self.scale).clamp(0.0, self.orig_height as f32),
        )
    }
}

/// Resize preserving aspect ratio and pad to a square canvas
pub fn letterbox(img: &DynamicImage, input_size: u32) -> (RgbImage, Letterbox) {
    let rgb = img.to_rgb8();
    let lb = Letterbox::new(rgb.width(), rgb.height(), input_size);
    let (w, h) = lb.scaled_size();

    let resized = image::imageops::resize(&rgb, w, h, FilterType::Triangle);
    let mut canvas = RgbImage::from_pixel(input_size, input_size, Rgb([PAD_VALUE; 3]));
    image::imageops::overlay(&mut canvas, &resized, lb.pad_x as i64, lb.pad_y as i64);

    (canvas, lb)
}

/// Planar CHW floats in [0, 1]
pub fn to_chw(img: &RgbImage) -> Vec<f32> {
    let (w, h) = img.dimensions();
    let plane = (w * h) as usize;
    let mut data = vec![0f32; plane * 3];

    for (x, y, pixel) in img.enumerate_pixels() {
        let idx = (y * w + x) as usize;
        for c in 0..3 {
            data[c * plane + idx] = pixel[c] as f32 / 255.0;
        }
    }

    data
}
