use image::RgbImage;
use std::fmt;
use std::str::FromStr;

/// Axis-aligned box in pixel coordinates, inclusive corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        (self.width().max(0) as f32) * (self.height().max(0) as f32)
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let inter = ((ix2 - ix1).max(0) as f32) * ((iy2 - iy1).max(0) as f32);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }

    /// Clamp the box into a `width` x `height` canvas
    pub fn clamp_to(&self, width: u32, height: u32) -> BoundingBox {
        let max_x = (width as i32 - 1).max(0);
        let max_y = (height as i32 - 1).max(0);
        BoundingBox {
            x1: self.x1.clamp(0, max_x),
            y1: self.y1.clamp(0, max_y),
            x2: self.x2.clamp(0, max_x),
            y2: self.y2.clamp(0, max_y),
        }
    }
}

/// One predicted object instance
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub class_id: u32,
    pub confidence: f32,
}

/// Where a label is drawn relative to its box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPosition {
    #[default]
    Above,
    Below,
    Left,
    Right,
    Inside,
}

impl LabelPosition {
    pub const ALL: [LabelPosition; 5] = [
        LabelPosition::Above,
        LabelPosition::Below,
        LabelPosition::Left,
        LabelPosition::Right,
        LabelPosition::Inside,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelPosition::Above => "above",
            LabelPosition::Below => "below",
            LabelPosition::Left => "left",
            LabelPosition::Right => "right",
            LabelPosition::Inside => "inside",
        }
    }
}

impl fmt::Display for LabelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelPosition {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LabelPosition::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StyleError::UnknownPosition(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StyleError {
    #[error("confidence threshold {0} is outside 0.1..=1.0")]
    Threshold(f32),
    #[error("box thickness {0} is outside 1..=10")]
    Thickness(u32),
    #[error("font size {0} is outside 10..=50")]
    FontSize(u32),
    #[error("unknown label position: {0:?}")]
    UnknownPosition(String),
}

/// Per-request rendering options
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOptions {
    pub confidence_threshold: f32,
    pub show_confidence: bool,
    pub label_position: LabelPosition,
    pub box_thickness: u32,
    pub font_size: u32,
}

impl StyleOptions {
    pub const THRESHOLD_RANGE: (f32, f32) = (0.1, 1.0);
    pub const THICKNESS_RANGE: (u32, u32) = (1, 10);
    pub const FONT_SIZE_RANGE: (u32, u32) = (10, 50);

    /// Check every option against the ranges the form offers
    pub fn validate(&self) -> Result<(), StyleError> {
        let (lo, hi) = Self::THRESHOLD_RANGE;
        if !(lo..=hi).contains(&self.confidence_threshold) {
            return Err(StyleError::Threshold(self.confidence_threshold));
        }
        let (lo, hi) = Self::THICKNESS_RANGE;
        if !(lo..=hi).contains(&self.box_thickness) {
            return Err(StyleError::Thickness(self.box_thickness));
        }
        let (lo, hi) = Self::FONT_SIZE_RANGE;
        if !(lo..=hi).contains(&self.font_size) {
            return Err(StyleError::FontSize(self.font_size));
        }
        Ok(())
    }
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            show_confidence: true,
            label_position: LabelPosition::Above,
            box_thickness: 3,
            font_size: 20,
        }
    }
}

/// Label text and score of one drawn detection
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLabel {
    pub label: String,
    pub confidence: f32,
}

impl DetectedLabel {
    /// Line used in the textual summary
    pub fn summary_line(&self) -> String {
        format!("- {} (confidence: {:.2})", self.label, self.confidence)
    }
}

/// Rendered output for one image
#[derive(Debug, Clone)]
pub struct AnnotatedImage {
    pub image: RgbImage,
    pub labels: Vec<DetectedLabel>,
}

impl AnnotatedImage {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
