use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::sync::Arc;

use crate::annotate::{self, LabelFont};
use crate::classes::ClassNameTable;
use crate::detection::Detector;
use crate::models::{AnnotatedImage, StyleOptions};

/// Most images accepted per request
pub const DEFAULT_MAX_FILES: usize = 10;

/// One uploaded file, still encoded
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    /// Decode a JPEG or PNG upload; other formats are rejected
    pub fn decode(&self) -> Result<DynamicImage> {
        let format = image::guess_format(&self.bytes)
            .with_context(|| format!("Unrecognised image format in {}", self.file_name))?;
        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
            anyhow::bail!("Unsupported image format {:?} in {}: only JPEG and PNG are accepted", format, self.file_name);
        }
        image::load_from_memory_with_format(&self.bytes, format)
            .with_context(|| format!("Failed to decode image {}", self.file_name))
    }
}

/// Uploads for one request, truncated to `max_files`
#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub images: Vec<UploadedImage>,
    pub warning: Option<String>,
}

impl UploadBatch {
    pub fn new(mut images: Vec<UploadedImage>, max_files: usize) -> Self {
        let warning = if images.len() > max_files {
            tracing::warn!(received = images.len(), max_files, "too many images uploaded, truncating");
            images.truncate(max_files);
            Some(format!("Please upload no more than {} images", max_files))
        } else {
            None
        };
        Self { images, warning }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Outcome for one image of a batch
#[derive(Debug, Clone)]
pub enum ImageOutcome {
    Annotated {
        original: RgbImage,
        result: AnnotatedImage,
    },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ImageReport {
    /// 1-based position in the batch
    pub index: usize,
    pub total: usize,
    pub file_name: String,
    pub outcome: ImageOutcome,
}

impl ImageReport {
    /// Warning shown when the image decoded but nothing was found
    pub fn warning(&self) -> Option<String> {
        match &self.outcome {
            ImageOutcome::Annotated { result, .. } if result.is_empty() => {
                Some(format!("No road signs detected in image {}", self.index))
            }
            _ => None,
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        match &self.outcome {
            ImageOutcome::Annotated { result, .. } => {
                result.labels.iter().map(|l| l.summary_line()).collect()
            }
            ImageOutcome::Failed(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub warning: Option<String>,
    pub images: Vec<ImageReport>,
}

/// Detector, class table and font shared by every request
#[derive(Clone)]
pub struct SignAnnotator {
    detector: Arc<dyn Detector>,
    classes: Arc<ClassNameTable>,
    font: Arc<LabelFont>,
}

impl SignAnnotator {
    pub fn new(detector: Arc<dyn Detector>, classes: Arc<ClassNameTable>, font: Arc<LabelFont>) -> Self {
        Self { detector, classes, font }
    }

    pub fn classes(&self) -> &ClassNameTable {
        &self.classes
    }

    /// Run inference and draw the results on one image
    pub fn annotate(&self, image: &DynamicImage, style: &StyleOptions) -> Result<AnnotatedImage> {
        let rgb = image.to_rgb8();
        let detections = self.detector.detect(image, style.confidence_threshold)?;

        tracing::debug!(
            detector = self.detector.name(),
            width = rgb.width(),
            height = rgb.height(),
            detections = detections.len(),
            "image analysed"
        );

        Ok(annotate::annotate(&rgb, &detections, &self.classes, &self.font, style))
    }

    /// Process a batch in order; a failing image does not stop the others
    pub fn process_batch(&self, batch: UploadBatch, style: &StyleOptions) -> BatchReport {
        let total = batch.images.len();
        let mut images = Vec::with_capacity(total);

        for (i, upload) in batch.images.into_iter().enumerate() {
            let index = i + 1;
            let outcome = match self.process_one(&upload, style) {
                Ok((original, result)) => ImageOutcome::Annotated { original, result },
                Err(err) => {
                    tracing::warn!(file = %upload.file_name, error = %format!("{:#}", err), "image failed");
                    ImageOutcome::Failed(format!("{:#}", err))
                }
            };
            images.push(ImageReport { index, total, file_name: upload.file_name, outcome });
        }

        BatchReport { warning: batch.warning, images }
    }

    fn process_one(&self, upload: &UploadedImage, style: &StyleOptions) -> Result<(RgbImage, AnnotatedImage)> {
        let image = upload.decode()?;
        let result = self.annotate(&image, style)?;
        Ok((image.to_rgb8(), result))
    }
}
