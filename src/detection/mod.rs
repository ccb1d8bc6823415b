pub mod preprocessing;
pub mod postprocess;

use anyhow::{Context, Result};
use image::DynamicImage;
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use std::path::Path;

use crate::models::Detection;
use postprocess::{OutputLayout, RawPredictions};

/// Anything that turns an image into detections
pub trait Detector: Send + Sync {
    /// Detect objects scoring at least `confidence_threshold`
    fn detect(&self, image: &DynamicImage, confidence_threshold: f32) -> Result<Vec<Detection>>;

    /// Human-readable name (used in logs)
    fn name(&self) -> &str;
}

/// Single-output YOLO detector running on rten
pub struct YoloDetector {
    model: Model,
    name: String,
    pub input_size: u32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl YoloDetector {
    pub const DEFAULT_INPUT_SIZE: u32 = 640;

    /// Load model weights once; missing or unreadable weights are fatal
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Detection model not found: {}", path.display());
        }

        let model = Model::load_file(path)
            .with_context(|| format!("Failed to load detection model {}", path.display()))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolo".to_string());

        tracing::info!(model = %path.display(), "detection model loaded");

        Ok(Self {
            model,
            name,
            input_size: Self::DEFAULT_INPUT_SIZE,
            iou_threshold: 0.7,
            max_detections: 300,
        })
    }

    pub fn with_input_size(mut self, input_size: u32) -> Self {
        self.input_size = input_size;
        self
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image: &DynamicImage, confidence_threshold: f32) -> Result<Vec<Detection>> {
        let (input_img, letterbox) = preprocessing::letterbox(image, self.input_size);
        let size = self.input_size as usize;
        let input = NdTensor::from_data([1, 3, size, size], preprocessing::to_chw(&input_img));

        let output: NdTensor<f32, 3> = self
            .model
            .run_one(input.view().into(), None)
            .context("Detection model inference failed")?
            .try_into()
            .map_err(|e| anyhow::anyhow!("Unexpected detection output: {:?}", e))?;

        let [_, dim1, dim2] = output.shape();
        let layout = OutputLayout::infer(dim1, dim2);
        let (num_features, num_anchors) = match layout {
            OutputLayout::FeaturesFirst => (dim1, dim2),
            OutputLayout::AnchorsFirst => (dim2, dim1),
        };
        if num_features < 5 {
            anyhow::bail!("Detection output has {} features per anchor, expected at least 5", num_features);
        }

        let data = output.to_vec();
        let raw = RawPredictions { data: &data, num_features, num_anchors, layout };
        let detections = postprocess::decode(
            &raw,
            &letterbox,
            confidence_threshold,
            self.iou_threshold,
            self.max_detections,
        );

        tracing::debug!(
            model = %self.name,
            anchors = num_anchors,
            classes = num_features - 4,
            detections = detections.len(),
            "inference complete"
        );

        Ok(detections)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
