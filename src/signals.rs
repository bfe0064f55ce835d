use anyhow::{Context, Result};
use emojify_vision::{FaceDetector, FaceSignal};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Face detector backed by a JSON file of precomputed face signals.
///
/// Stands in for an external vision service: whatever produced the file ran
/// the actual detection, this just hands its results to the pipeline.
#[derive(Debug, Clone)]
pub struct SignalFile {
    path: PathBuf,
}

impl SignalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sidecar next to the photo: `photo.jpg` → `photo.faces.json`.
    pub fn sidecar(image: &Path) -> Self {
        Self::new(image.with_extension("faces.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<FaceSignal>> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading face signals at {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing face signals {}", self.path.display()))
    }
}

impl FaceDetector for SignalFile {
    fn detect(&self, _image: &RgbaImage) -> Result<Vec<FaceSignal>> {
        self.read()
    }
}
