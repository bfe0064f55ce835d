use std::collections::HashMap;

use image::RgbaImage;
use log::{debug, warn};

use crate::error::VisionError;
use crate::expression::{self, ExpressionCategory};
use crate::face::{FaceDetector, FaceSignal};
use crate::overlay::{self, HeightScaling};

/// Source of the graphic drawn for each expression.
pub trait OverlayLookup {
    fn overlay(&self, category: ExpressionCategory) -> Option<&RgbaImage>;
}

impl OverlayLookup for HashMap<ExpressionCategory, RgbaImage> {
    fn overlay(&self, category: ExpressionCategory) -> Option<&RgbaImage> {
        self.get(&category)
    }
}

/// What happened to a single detected face.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceStatus {
    Applied,
    /// Face could not be drawn on; the rest of the image was still processed.
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceOutcome {
    pub signal: FaceSignal,
    pub category: ExpressionCategory,
    pub status: FaceStatus,
}

/// Result of running the pipeline over one photo.
#[derive(Debug, Clone)]
pub struct Emojified {
    pub image: RgbaImage,
    pub faces: Vec<FaceOutcome>,
}

impl Emojified {
    pub fn applied(&self) -> usize {
        self.faces
            .iter()
            .filter(|f| f.status == FaceStatus::Applied)
            .count()
    }
}

/// Full pipeline: detect faces → classify → composite
pub struct Pipeline {
    pub detector: Box<dyn FaceDetector>,
    pub scaling: HeightScaling,
}

impl Pipeline {
    pub fn new(detector: impl FaceDetector + 'static) -> Self {
        Self {
            detector: Box::new(detector),
            scaling: HeightScaling::default(),
        }
    }

    pub fn with_scaling(mut self, scaling: HeightScaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// Draw a matching overlay on every face found in `img`.
    ///
    /// Faces with degenerate geometry are skipped before their overlay is
    /// looked up. A category with no overlay aborts the whole run since the
    /// asset table is expected to be complete.
    pub fn process_image(
        &self,
        img: &RgbaImage,
        overlays: &impl OverlayLookup,
    ) -> Result<Emojified, VisionError> {
        let signals = self.detector.detect(img).map_err(VisionError::Detection)?;
        debug!("num faces: {}", signals.len());
        self.apply(img, &signals, overlays)
    }

    /// Classify and composite already detected faces, in the given order.
    pub fn apply(
        &self,
        img: &RgbaImage,
        signals: &[FaceSignal],
        overlays: &impl OverlayLookup,
    ) -> Result<Emojified, VisionError> {
        let mut working = img.clone();
        let mut faces = Vec::with_capacity(signals.len());

        for signal in signals {
            let category = expression::classify(signal);

            let drawn = match overlay::check_face(signal) {
                Ok(()) => {
                    let graphic = overlays
                        .overlay(category)
                        .ok_or(VisionError::MissingOverlay(category))?;
                    overlay::composite_with(&working, graphic, signal, self.scaling)
                }
                Err(e) => Err(e),
            };

            let status = match drawn {
                Ok(next) => {
                    working = next;
                    FaceStatus::Applied
                }
                Err(e @ VisionError::DegenerateGeometry(_)) => {
                    warn!("Skipping face at ({}, {}): {}", signal.position.x, signal.position.y, e);
                    FaceStatus::Skipped(e.to_string())
                }
                Err(e) => return Err(e),
            };

            faces.push(FaceOutcome {
                signal: *signal,
                category,
                status,
            });
        }

        Ok(Emojified {
            image: working,
            faces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::{Point, StaticDetector};
    use image::Rgba;

    fn overlays() -> HashMap<ExpressionCategory, RgbaImage> {
        ExpressionCategory::ALL
            .iter()
            .map(|c| (*c, RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))))
            .collect()
    }

    #[test]
    fn test_no_faces_is_identity() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 255]));
        let pipeline = Pipeline::new(StaticDetector::default());
        let out = pipeline.process_image(&img, &overlays()).unwrap();
        assert_eq!(out.image, img);
        assert!(out.faces.is_empty());
    }

    #[test]
    fn test_detector_error() {
        struct Broken;
        impl FaceDetector for Broken {
            fn detect(&self, _image: &RgbaImage) -> anyhow::Result<Vec<FaceSignal>> {
                anyhow::bail!("backend unavailable")
            }
        }

        let img = RgbaImage::new(4, 4);
        let result = Pipeline::new(Broken).process_image(&img, &overlays());
        assert!(matches!(result, Err(VisionError::Detection(_))));
    }

    #[test]
    fn test_degenerate_face_skipped_before_overlay_lookup() {
        let flat = FaceSignal {
            smiling_probability: 0.9,
            left_eye_open_probability: 0.9,
            right_eye_open_probability: 0.9,
            position: Point { x: 0.0, y: 0.0 },
            width: 0.0,
            height: 10.0,
        };
        let mut table = overlays();
        table.remove(&ExpressionCategory::Smile);

        let img = RgbaImage::from_pixel(16, 16, Rgba([9, 9, 9, 255]));
        let out = Pipeline::new(StaticDetector(vec![flat]))
            .process_image(&img, &table)
            .unwrap();
        assert_eq!(out.faces.len(), 1);
        assert_eq!(out.faces[0].category, ExpressionCategory::Smile);
        assert!(matches!(out.faces[0].status, FaceStatus::Skipped(_)));
        assert_eq!(out.image, img);
    }

    #[test]
    fn test_missing_overlay() {
        let face = FaceSignal {
            smiling_probability: 0.9,
            left_eye_open_probability: 0.9,
            right_eye_open_probability: 0.9,
            position: Point { x: 0.0, y: 0.0 },
            width: 10.0,
            height: 10.0,
        };
        let mut table = overlays();
        table.remove(&ExpressionCategory::Smile);

        let img = RgbaImage::new(16, 16);
        let result = Pipeline::new(StaticDetector(vec![face])).process_image(&img, &table);
        assert!(matches!(
            result,
            Err(VisionError::MissingOverlay(ExpressionCategory::Smile))
        ));
    }
}
