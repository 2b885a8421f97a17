//! Image resolution variant generation.
//!
//! Each stored image keeps its original plus up to four downscaled
//! variants. Widths scale in fixed steps; heights follow the source aspect
//! ratio. Variants that would upscale the source are never generated, but
//! a Low variant always exists as a fallback for old browsers, even if it
//! is just a duplicate of a tiny original.

use image::DynamicImage;
use image::imageops::FilterType;

use scribe_common::{AppError, AppResult};
use scribe_db::entities::image::Resolution;

/// Target widths per derived resolution, in ascending order.
pub const RESOLUTION_WIDTHS: &[(Resolution, u32)] = &[
    (Resolution::Low, 320),
    (Resolution::Medium, 640),
    (Resolution::Large, 960),
    (Resolution::High, 1280),
];

/// One generated resolution variant of a source image.
pub struct ImageVariant {
    /// Resolution step this variant belongs to.
    pub resolution: Resolution,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Decoded pixel data.
    pub image: DynamicImage,
}

/// Generate the ordered variant set for a source image.
///
/// The result always starts with `Original` (a duplicate of the input).
/// Derived variants are generated in ascending width order and stop at the
/// first step wider than the source; if the source is narrower than even
/// the Low step, Low receives a duplicate of the original instead.
pub fn generate_variants(bytes: &[u8]) -> AppResult<Vec<ImageVariant>> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| AppError::UnreadableImage(e.to_string()))?;

    let (width, height) = (decoded.width(), decoded.height());
    let mut variants = vec![ImageVariant {
        resolution: Resolution::Original,
        width,
        height,
        image: decoded.clone(),
    }];

    for &(resolution, target_width) in RESOLUTION_WIDTHS {
        if target_width > width {
            if resolution == Resolution::Low {
                variants.push(ImageVariant {
                    resolution,
                    width,
                    height,
                    image: decoded.clone(),
                });
            }
            break;
        }

        let target_height =
            (f64::from(height) * f64::from(target_width) / f64::from(width)).round() as u32;
        let resized = decoded.resize_exact(target_width, target_height, FilterType::Lanczos3);
        variants.push(ImageVariant {
            resolution,
            width: target_width,
            height: target_height,
            image: resized,
        });
    }

    Ok(variants)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_undecodable_bytes_are_rejected() {
        let result = generate_variants(b"definitely not an image");
        assert!(matches!(result, Err(AppError::UnreadableImage(_))));
    }

    #[test]
    fn test_full_ladder_for_wide_source() {
        let variants = generate_variants(&png_bytes(2560, 1440)).unwrap();

        let resolutions: Vec<Resolution> = variants.iter().map(|v| v.resolution).collect();
        assert_eq!(
            resolutions,
            vec![
                Resolution::Original,
                Resolution::Low,
                Resolution::Medium,
                Resolution::Large,
                Resolution::High,
            ]
        );
        assert_eq!(variants[0].width, 2560);
        assert_eq!(variants[1].width, 320);
        assert_eq!(variants[4].width, 1280);
        // Aspect ratio preserved: 2560x1440 -> 320x180
        assert_eq!(variants[1].height, 180);
    }

    #[test]
    fn test_ladder_stops_at_source_width() {
        let variants = generate_variants(&png_bytes(800, 600)).unwrap();

        let resolutions: Vec<Resolution> = variants.iter().map(|v| v.resolution).collect();
        assert_eq!(
            resolutions,
            vec![Resolution::Original, Resolution::Low, Resolution::Medium]
        );
    }

    #[test]
    fn test_tiny_source_still_gets_low_fallback() {
        let variants = generate_variants(&png_bytes(200, 100)).unwrap();

        let resolutions: Vec<Resolution> = variants.iter().map(|v| v.resolution).collect();
        assert_eq!(resolutions, vec![Resolution::Original, Resolution::Low]);
        // Fallback is a duplicate, not an upscale
        assert_eq!(variants[1].width, 200);
        assert_eq!(variants[1].height, 100);
    }

    #[test]
    fn test_exact_step_width_is_generated() {
        let variants = generate_variants(&png_bytes(640, 480)).unwrap();

        let resolutions: Vec<Resolution> = variants.iter().map(|v| v.resolution).collect();
        assert_eq!(
            resolutions,
            vec![Resolution::Original, Resolution::Low, Resolution::Medium]
        );
        assert_eq!(variants[2].width, 640);
        assert_eq!(variants[2].height, 480);
    }
}
