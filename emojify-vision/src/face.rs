use anyhow::Result;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// A point in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Per-face attributes reported by a face detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceSignal {
    pub smiling_probability: f32,
    pub left_eye_open_probability: f32,
    pub right_eye_open_probability: f32,
    /// Top-left corner of the bounding box
    pub position: Point,
    pub width: f32,
    pub height: f32,
}

impl FaceSignal {
    /// Center of the bounding box.
    pub fn center(&self) -> Point {
        Point {
            x: self.position.x + self.width / 2.0,
            y: self.position.y + self.height / 2.0,
        }
    }

    /// Bounding box has no usable area.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Pluggable face detection backend.
///
/// The core never finds faces itself: any vision library that can report
/// smile / eye-open probabilities and a bounding box can sit behind this trait.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in `image`. Order of the returned faces is irrelevant.
    fn detect(&self, image: &RgbaImage) -> Result<Vec<FaceSignal>>;
}

/// Detector that reports a fixed set of faces for every image.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector(pub Vec<FaceSignal>);

impl FaceDetector for StaticDetector {
    fn detect(&self, _image: &RgbaImage) -> Result<Vec<FaceSignal>> {
        Ok(self.0.clone())
    }
}
