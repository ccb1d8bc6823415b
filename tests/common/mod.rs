mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from signview for tests
pub use signview::{
    AnnotatedImage, BoundingBox, ClassNameTable, Detection, Detector, LabelFont, LabelPosition,
    SignAnnotator, StyleOptions, UploadBatch, UploadedImage,
};
