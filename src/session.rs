use emojify_vision::{Emojified, OverlayLookup, Pipeline, VisionError};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no photo has been captured")]
    NothingCaptured,

    #[error("photo has not been processed yet")]
    NotProcessed,

    #[error("failed to load photo {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write photo {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Where a captured photo came from.
#[derive(Debug, Clone)]
pub enum Capture {
    /// A user's file; never deleted by the session.
    File(PathBuf),
    /// A scratch file the session owns and removes on save or clear.
    Temporary(PathBuf),
}

impl Capture {
    fn path(&self) -> &Path {
        match self {
            Capture::File(p) | Capture::Temporary(p) => p,
        }
    }
}

#[derive(Debug, Default)]
enum Stage {
    #[default]
    Empty,
    Captured(RgbaImage),
    Processed(Emojified),
}

/// State carried through capture → process → save → clear.
///
/// Each step hands ownership forward: capturing stores the photo, processing
/// replaces it with the composited result, saving only reads the result.
#[derive(Debug, Default)]
pub struct PhotoSession {
    stage: Stage,
    temp: Option<PathBuf>,
    saved: Option<PathBuf>,
}

impl PhotoSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a photo, scaling it down so neither side exceeds `max_dimension`
    /// (0 disables scaling). Replaces whatever the session held before.
    pub fn capture(&mut self, source: Capture, max_dimension: u32) -> Result<(), SessionError> {
        self.clear()?;

        let path = source.path().to_path_buf();
        // owned before decoding so a bad scratch file is still removed on clear
        if let Capture::Temporary(p) = source {
            self.temp = Some(p);
        }

        let img = image::open(&path).map_err(|e| SessionError::Load {
            path: path.clone(),
            source: e,
        })?;
        let img = resample(img, max_dimension);
        info!(
            "Captured {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );

        self.stage = Stage::Captured(img);
        Ok(())
    }

    /// Start from an in-memory photo.
    pub fn capture_image(&mut self, img: RgbaImage) -> Result<(), SessionError> {
        self.clear()?;
        self.stage = Stage::Captured(img);
        Ok(())
    }

    /// Run the pipeline over the captured photo.
    ///
    /// On failure the captured photo is kept so the caller may retry.
    pub fn process(
        &mut self,
        pipeline: &Pipeline,
        overlays: &impl OverlayLookup,
    ) -> Result<&Emojified, SessionError> {
        let result = match &self.stage {
            Stage::Empty => return Err(SessionError::NothingCaptured),
            Stage::Captured(img) => Some(pipeline.process_image(img, overlays)?),
            Stage::Processed(_) => None,
        };

        match result {
            Some(result) => {
                info!(
                    "Applied {} of {} overlay(s)",
                    result.applied(),
                    result.faces.len()
                );
                self.stage = Stage::Processed(result);
            }
            None => debug!("Photo already processed"),
        }
        self.result().ok_or(SessionError::NotProcessed)
    }

    pub fn result(&self) -> Option<&Emojified> {
        match &self.stage {
            Stage::Processed(done) => Some(done),
            _ => None,
        }
    }

    /// Path of the last saved result.
    pub fn saved_path(&self) -> Option<&Path> {
        self.saved.as_deref()
    }

    /// Write the result as `Emojify_<id>.jpg` into `dir` and return its path.
    pub fn save(&mut self, dir: &Path) -> Result<PathBuf, SessionError> {
        let done = match &self.stage {
            Stage::Processed(done) => done,
            Stage::Captured(_) => return Err(SessionError::NotProcessed),
            Stage::Empty => return Err(SessionError::NothingCaptured),
        };

        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("Emojify_{}.jpg", uuid::Uuid::new_v4().simple()));
        write_rgb(&done.image, &path)?;
        info!("Saved result to {}", path.display());

        self.remove_temp();
        self.saved = Some(path.clone());
        Ok(path)
    }

    /// Write the result to an explicit path; the format follows the extension.
    pub fn save_as(&mut self, path: &Path) -> Result<(), SessionError> {
        let done = self.result().ok_or(SessionError::NotProcessed)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_rgb(&done.image, path)?;
        info!("Saved result to {}", path.display());

        self.remove_temp();
        self.saved = Some(path.to_path_buf());
        Ok(())
    }

    /// Drop the photo and delete any scratch file the session owns.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.stage = Stage::Empty;
        self.saved = None;
        if let Some(temp) = self.temp.take() {
            if temp.exists() {
                std::fs::remove_file(&temp)?;
                debug!("Removed {}", temp.display());
            }
        }
        Ok(())
    }

    fn remove_temp(&mut self) {
        if let Some(temp) = self.temp.take() {
            if let Err(e) = std::fs::remove_file(&temp) {
                warn!("Could not remove {}: {}", temp.display(), e);
            }
        }
    }
}

fn resample(img: DynamicImage, max_dimension: u32) -> RgbaImage {
    if max_dimension == 0 || (img.width() <= max_dimension && img.height() <= max_dimension) {
        return img.to_rgba8();
    }
    img.resize(max_dimension, max_dimension, FilterType::Triangle)
        .to_rgba8()
}

// alpha is dropped so the same path works for JPEG output
fn write_rgb(img: &RgbaImage, path: &Path) -> Result<(), SessionError> {
    DynamicImage::ImageRgba8(img.clone())
        .to_rgb8()
        .save(path)
        .map_err(|source| SessionError::Save {
            path: path.to_path_buf(),
            source,
        })
}
