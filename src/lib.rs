pub mod assets;
pub mod config;
pub mod session;
pub mod signals;

// Re-export vision types for convenience
pub use emojify_vision::{
    classify, expression, face, overlay, pipeline, Emojified, ExpressionCategory, FaceDetector,
    FaceSignal, HeightScaling, OverlayLookup, Pipeline, VisionError,
};
