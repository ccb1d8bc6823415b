pub mod annotate;
pub mod classes;
pub mod config;
pub mod detection;
pub mod models;
pub mod pipeline;
pub mod web;

pub use annotate::LabelFont;
pub use classes::ClassNameTable;
pub use detection::{Detector, YoloDetector};
pub use models::{AnnotatedImage, BoundingBox, DetectedLabel, Detection, LabelPosition, StyleOptions};
pub use pipeline::{BatchReport, ImageOutcome, ImageReport, SignAnnotator, UploadBatch, UploadedImage};
