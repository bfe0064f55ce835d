use image::{Pixel, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::VisionError;
use crate::face::FaceSignal;

/// Overlay is drawn slightly narrower than the face so it sits inside it.
pub const SCALE_FACTOR: f32 = 0.9;

/// How the overlay height is derived from its scaled width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightScaling {
    /// Aspect-preserving height, then scaled by [`SCALE_FACTOR`] a second time.
    /// Overlays come out flatter than their source.
    #[default]
    Inherited,
    /// Aspect-preserving height only.
    Proportional,
}

/// Size and top-left position of a scaled overlay in background pixels.
///
/// Sizes are not bounded by the background; only the visible part is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPlacement {
    pub width: u64,
    pub height: u64,
    pub x: i64,
    pub y: i64,
}

/// Reject faces whose bounding box has no usable area.
pub fn check_face(face: &FaceSignal) -> Result<(), VisionError> {
    if face.is_degenerate() {
        return Err(VisionError::DegenerateGeometry(format!(
            "face {}x{}",
            face.width, face.height
        )));
    }
    Ok(())
}

/// Compute where an `overlay_width` x `overlay_height` graphic lands on `face`.
///
/// Horizontally centered on the face; vertically the face center sits a third
/// of the way down the overlay, which lifts it toward eye level.
pub fn placement(
    overlay_width: u32,
    overlay_height: u32,
    face: &FaceSignal,
    scaling: HeightScaling,
) -> Result<OverlayPlacement, VisionError> {
    check_face(face)?;
    if overlay_width == 0 || overlay_height == 0 {
        return Err(VisionError::DegenerateGeometry(format!(
            "overlay {}x{}",
            overlay_width, overlay_height
        )));
    }

    let width = (face.width * SCALE_FACTOR) as u64;
    // integer division, matching how the fitted height was always computed
    let fitted = (overlay_height as u128 * width as u128 / overlay_width as u128) as f64;
    let height = match scaling {
        HeightScaling::Inherited => (fitted * SCALE_FACTOR as f64) as u64,
        HeightScaling::Proportional => fitted as u64,
    };

    if width == 0 || height == 0 {
        return Err(VisionError::DegenerateGeometry(format!(
            "overlay {}x{} scales to {}x{} on face {}x{}",
            overlay_width, overlay_height, width, height, face.width, face.height
        )));
    }

    let center = face.center();
    let x = (center.x as f64 - (width / 2) as f64).round() as i64;
    let y = (center.y as f64 - (height / 3) as f64).round() as i64;

    Ok(OverlayPlacement {
        width,
        height,
        x,
        y,
    })
}

/// Stamp `overlay` onto a copy of `background` over `face`.
pub fn composite(
    background: &RgbaImage,
    overlay: &RgbaImage,
    face: &FaceSignal,
) -> Result<RgbaImage, VisionError> {
    composite_with(background, overlay, face, HeightScaling::default())
}

/// Like [`composite`] with an explicit height policy.
///
/// The result always has the background's dimensions. Only the part of the
/// scaled overlay inside the background is sampled (nearest neighbour) and
/// blended, so an overlay far larger than the image costs no more than the
/// image itself.
pub fn composite_with(
    background: &RgbaImage,
    overlay: &RgbaImage,
    face: &FaceSignal,
    scaling: HeightScaling,
) -> Result<RgbaImage, VisionError> {
    let target = placement(overlay.width(), overlay.height(), face, scaling)?;
    let mut result = background.clone();

    let (x, y) = (target.x as i128, target.y as i128);
    let (w, h) = (target.width as i128, target.height as i128);
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(background.width() as i128);
    let y1 = (y + h).min(background.height() as i128);

    let (ow, oh) = (overlay.width() as i128, overlay.height() as i128);
    for py in y0..y1 {
        let sy = ((py - y) * oh / h) as u32;
        for px in x0..x1 {
            let sx = ((px - x) * ow / w) as u32;
            let src = overlay.get_pixel(sx, sy);
            result.get_pixel_mut(px as u32, py as u32).blend(src);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Point;
    use image::Rgba;

    fn face(x: f32, y: f32, w: f32, h: f32) -> FaceSignal {
        FaceSignal {
            smiling_probability: 0.9,
            left_eye_open_probability: 0.9,
            right_eye_open_probability: 0.9,
            position: Point { x, y },
            width: w,
            height: h,
        }
    }

    #[test]
    fn test_placement_inherited() {
        let p = placement(50, 50, &face(100.0, 100.0, 200.0, 200.0), HeightScaling::Inherited)
            .unwrap();
        assert_eq!(p.width, 180);
        assert_eq!(p.height, 162);
        assert_eq!(p.x, 110);
        assert_eq!(p.y, 146);
    }

    #[test]
    fn test_placement_proportional() {
        let p = placement(
            50,
            50,
            &face(100.0, 100.0, 200.0, 200.0),
            HeightScaling::Proportional,
        )
        .unwrap();
        assert_eq!(p.width, 180);
        assert_eq!(p.height, 180);
        assert_eq!(p.x, 110);
        assert_eq!(p.y, 140);
    }

    #[test]
    fn test_placement_non_square_overlay() {
        // 50 * 90 / 100 = 45, 45 * 0.9 = 40.5 -> 40
        let p = placement(100, 50, &face(0.0, 0.0, 100.0, 100.0), HeightScaling::Inherited)
            .unwrap();
        assert_eq!((p.width, p.height), (90, 40));
        assert_eq!((p.x, p.y), (5, 37));
    }

    #[test]
    fn test_degenerate_overlay() {
        let f = face(0.0, 0.0, 100.0, 100.0);
        assert!(matches!(
            placement(0, 10, &f, HeightScaling::Inherited),
            Err(VisionError::DegenerateGeometry(_))
        ));
        assert!(matches!(
            placement(10, 0, &f, HeightScaling::Inherited),
            Err(VisionError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_degenerate_face() {
        for f in [
            face(0.0, 0.0, 0.0, 100.0),
            face(0.0, 0.0, 100.0, 0.0),
            // scales down to zero pixels
            face(0.0, 0.0, 1.0, 1.0),
        ] {
            assert!(matches!(
                placement(10, 10, &f, HeightScaling::Inherited),
                Err(VisionError::DegenerateGeometry(_))
            ));
        }
    }

    #[test]
    fn test_composite_keeps_background() {
        let background = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 255, 255]));
        let overlay = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let result = composite(&background, &overlay, &face(10.0, 10.0, 20.0, 20.0)).unwrap();

        assert_eq!(result.dimensions(), background.dimensions());
        assert_eq!(background.get_pixel(20, 20), &Rgba([0, 0, 255, 255]));
        assert_eq!(result.get_pixel(20, 20), &Rgba([255, 0, 0, 255]));
        assert_eq!(result.get_pixel(63, 63), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_composite_clips_out_of_frame() {
        let background = RgbaImage::from_pixel(32, 32, Rgba([0, 0, 0, 255]));
        let overlay = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        // overhangs the top-left corner
        let result = composite(&background, &overlay, &face(-20.0, -20.0, 40.0, 40.0)).unwrap();
        assert_eq!(result.dimensions(), (32, 32));
        assert_eq!(result.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(result.get_pixel(31, 31), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_face_far_larger_than_image() {
        let background = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255]));
        let overlay = RgbaImage::from_pixel(50, 50, Rgba([0, 255, 0, 255]));
        let huge = face(-5.0e11, -5.0e11, 1.0e12, 1.0e12);

        let p = placement(50, 50, &huge, HeightScaling::Inherited).unwrap();
        assert!(p.width > u32::MAX as u64 / 2);
        assert!(p.x < 0 && p.y < 0);

        let result = composite(&background, &overlay, &huge).unwrap();
        assert_eq!(result.dimensions(), (64, 64));
        assert!(result.pixels().all(|px| *px == Rgba([0, 255, 0, 255])));

        // entirely off-frame: nothing drawn
        let away = face(1.0e12, 1.0e12, 1.0e12, 1.0e12);
        assert_eq!(composite(&background, &overlay, &away).unwrap(), background);
    }
}
