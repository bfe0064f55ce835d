use anyhow::{Context, Result};
use emojify_vision::{ExpressionCategory, OverlayLookup};
use image::RgbaImage;
use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Overlay graphics keyed by expression, loaded from an asset directory.
#[derive(Debug, Default)]
pub struct OverlaySet {
    overlays: HashMap<ExpressionCategory, RgbaImage>,
}

pub fn asset_path(dir: &Path, category: ExpressionCategory) -> PathBuf {
    dir.join(format!("{}.png", category.asset_name()))
}

impl OverlaySet {
    /// Load every `<asset_name>.png` found in `dir`.
    ///
    /// Absent files are only logged; the pipeline reports them if a face
    /// actually needs one. Files that exist but fail to decode are errors.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("asset directory {} does not exist", dir.display());
        }

        let mut overlays = HashMap::new();
        for category in ExpressionCategory::ALL {
            let file = asset_path(dir, category);
            if !file.exists() {
                warn!("No overlay for {} at {}", category, file.display());
                continue;
            }
            let img = image::open(&file)
                .with_context(|| format!("decoding {}", file.display()))?
                .to_rgba8();
            overlays.insert(category, img);
        }

        info!("Loaded {} overlay(s) from {}", overlays.len(), dir.display());
        Ok(Self { overlays })
    }

    /// Expressions with no overlay loaded.
    pub fn missing(&self) -> Vec<ExpressionCategory> {
        ExpressionCategory::ALL
            .into_iter()
            .filter(|c| !self.overlays.contains_key(c))
            .collect()
    }
}

impl OverlayLookup for OverlaySet {
    fn overlay(&self, category: ExpressionCategory) -> Option<&RgbaImage> {
        self.overlays.get(&category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_load_partial_set() {
        let dir = std::env::temp_dir().join(format!("emojify-assets-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]))
            .save(asset_path(&dir, ExpressionCategory::Smile))
            .unwrap();
        RgbaImage::from_pixel(6, 4, Rgba([0, 255, 0, 255]))
            .save(asset_path(&dir, ExpressionCategory::Sad))
            .unwrap();

        let set = OverlaySet::load(&dir).unwrap();
        assert_eq!(
            set.overlay(ExpressionCategory::Sad).map(|i| i.dimensions()),
            Some((6, 4))
        );
        assert!(set.overlay(ExpressionCategory::Neutral).is_none());
        assert_eq!(set.missing().len(), 5);
        assert!(!set.missing().contains(&ExpressionCategory::Smile));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_corrupt_asset() {
        let dir = std::env::temp_dir().join(format!("emojify-assets-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(asset_path(&dir, ExpressionCategory::LeftWink), b"not a png").unwrap();

        assert!(OverlaySet::load(&dir).is_err());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_dir() {
        assert!(OverlaySet::load(Path::new("/definitely/not/here")).is_err());
    }

    #[test]
    fn test_asset_path() {
        assert_eq!(
            asset_path(Path::new("a"), ExpressionCategory::ClosedEyesSmiling),
            Path::new("a").join("closed_smile.png")
        );
    }
}
