pub mod error;
pub mod expression;
pub mod face;
pub mod overlay;
pub mod pipeline;

// Re-export commonly used types
pub use error::VisionError;
pub use expression::{classify, ExpressionCategory};
pub use face::{FaceDetector, FaceSignal, Point, StaticDetector};
pub use overlay::{composite, HeightScaling};
pub use pipeline::{Emojified, OverlayLookup, Pipeline};
